use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use archon_canon::{canonical_json, digest32, sha256_hex};
use archon_db::ArchonStore;
use archon_gateway::GatewayClient;
use archon_schemas::{
    BindReceipt, BindingCounts, BindingType, CreatePollPayload, GovernanceTier, IdentityRow,
    IdentitySource, OutboxOperation, PollCreateReceipt, PollHeader, PollRow, PollStatus,
    PollStatusReport, ProvisionPayload, ProvisionReceipt, PruneReport, SignatureReceipt,
    StatusReport, SubmitVotePayload, UpgradeReceipt, VoteReceipt, VoterHistoryReport,
};
use archon_validate::{is_valid_cln_pubkey, is_valid_did, is_valid_nostr_pubkey};

use crate::clock::Clock;
use crate::error::{truncated, ServiceError};
use crate::ports::NodePort;

pub const MAX_TOTAL_POLLS: i64 = 5_000;
pub const MAX_TOTAL_VOTES: i64 = 50_000;
pub const MAX_SIGN_MESSAGE_LEN: usize = 10_240;
pub const MAX_METADATA_BYTES: usize = 8_192;
pub const DEFAULT_MAX_RETRIES: i64 = 5;

const MAX_LABEL_LEN: usize = 120;
const MAX_REASON_LEN: usize = 500;
const MAX_POLL_TYPE_LEN: usize = 32;
const MAX_TITLE_LEN: usize = 200;
const MAX_OPTION_LEN: usize = 64;
const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 10;
const LOCAL_DID_SUFFIX_LEN: usize = 48;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub gateway_url: String,
    pub network_enabled: bool,
    pub min_governance_bond_sats: u64,
    pub gateway_auth_token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            network_enabled: false,
            min_governance_bond_sats: 50_000,
            gateway_auth_token: None,
        }
    }
}

/// The stateful identity/governance service. Holds no mutable in-memory
/// caches: the store is the single source of truth, and the identity row is
/// the consistency anchor for every binding and poll operation.
pub struct ArchonService {
    pub(crate) store: ArchonStore,
    pub(crate) node: Arc<dyn NodePort>,
    pub(crate) gateway: Option<GatewayClient>,
    pub(crate) gateway_url: String,
    pub(crate) network_enabled: bool,
    pub(crate) min_bond_sats: u64,
    pub(crate) clock: Clock,
}

impl ArchonService {
    /// Build the service and initialize the store schema. When networking is
    /// requested but the gateway URL fails validation, the service downgrades
    /// itself to local-only rather than refusing to start.
    pub async fn new(
        store: ArchonStore,
        node: Arc<dyn NodePort>,
        config: ServiceConfig,
        clock: Clock,
    ) -> anyhow::Result<Self> {
        store.init_schema().await?;

        let gateway_url = config.gateway_url.trim().to_string();
        let mut network_enabled = config.network_enabled;

        let gateway = if gateway_url.is_empty() {
            if network_enabled {
                warn!("network enabled but no gateway url configured; running local-only");
                network_enabled = false;
            }
            None
        } else {
            match GatewayClient::new(&gateway_url, config.gateway_auth_token.clone()) {
                Ok(client) => Some(client),
                Err(err) => {
                    if network_enabled {
                        warn!(gateway = %gateway_url, error = %err,
                              "invalid gateway url; running local-only");
                        network_enabled = false;
                    }
                    None
                }
            }
        };

        Ok(Self {
            store,
            node,
            gateway,
            gateway_url,
            network_enabled,
            min_bond_sats: config.min_governance_bond_sats.max(1),
            clock,
        })
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now()
    }

    /// The gateway client, but only when remote calls are actually enabled.
    pub(crate) fn remote(&self) -> Option<&GatewayClient> {
        if self.network_enabled {
            self.gateway.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn internal(err: anyhow::Error) -> ServiceError {
        ServiceError::Internal(truncated(&format!("{:#}", err)))
    }

    /// The node's own pubkey, or an empty string when the RPC fails or the
    /// value is malformed. Callers that cannot proceed without it check for
    /// empty.
    pub(crate) async fn our_node_pubkey(&self) -> String {
        match self.node.node_pubkey().await {
            Ok(pubkey) if is_valid_cln_pubkey(&pubkey) => pubkey,
            Ok(other) => {
                warn!(pubkey = %other, "node returned malformed pubkey");
                String::new()
            }
            Err(err) => {
                warn!(error = %err, "getinfo failed");
                String::new()
            }
        }
    }

    /// Sign `payload` via the node; an RPC failure or an empty signature is
    /// fatal for the calling path.
    async fn require_signature(&self, payload: &str) -> Result<String, ServiceError> {
        match self.node.sign_message(payload).await {
            Ok(sig) if !sig.is_empty() => Ok(sig),
            Ok(_) => Err(ServiceError::Signing("empty signature returned".to_string())),
            Err(err) => Err(ServiceError::Signing(truncated(&format!("{:#}", err)))),
        }
    }

    async fn require_governance(&self) -> Result<IdentityRow, ServiceError> {
        let identity = self
            .store
            .get_identity()
            .await
            .map_err(Self::internal)?
            .ok_or(ServiceError::NotProvisioned)?;
        if identity.governance_tier != GovernanceTier::Governance {
            return Err(ServiceError::GovernanceRequired);
        }
        Ok(identity)
    }

    /// An `active` poll past its deadline is completed on read; callers get
    /// the refreshed row.
    pub(crate) async fn refresh_poll_state(&self, poll: PollRow) -> Result<PollRow, ServiceError> {
        if poll.status == PollStatus::Active && poll.deadline <= self.now() {
            let now = self.now();
            self.store
                .set_poll_status(&poll.poll_id, PollStatus::Completed, now)
                .await
                .map_err(Self::internal)?;
            let refreshed = self
                .store
                .get_poll(&poll.poll_id)
                .await
                .map_err(Self::internal)?;
            return Ok(refreshed.unwrap_or(poll));
        }
        Ok(poll)
    }

    // -----------------------------------------------------------------------
    // provision
    // -----------------------------------------------------------------------

    pub async fn provision(
        &self,
        force: bool,
        label: &str,
    ) -> Result<ProvisionReceipt, ServiceError> {
        if label.len() > MAX_LABEL_LEN {
            return Err(ServiceError::Validation(
                "invalid label (max 120 chars)".to_string(),
            ));
        }

        let existing = self.store.get_identity().await.map_err(Self::internal)?;
        if let Some(identity) = &existing {
            if !force {
                return Ok(ProvisionReceipt {
                    ok: true,
                    already_provisioned: Some(true),
                    did: identity.did.clone(),
                    source: identity.source,
                    governance_tier: identity.governance_tier,
                    gateway_url: identity.gateway_url.clone(),
                });
            }
        }

        let node_pubkey = self.our_node_pubkey().await;
        let mut source = IdentitySource::LocalFallback;
        let mut did: Option<String> = None;

        if let Some(gateway) = self.remote() {
            match gateway
                .provision_identity(&node_pubkey, label, self.now())
                .await
            {
                Ok(Some(remote_did)) => {
                    source = IdentitySource::ArchonGateway;
                    did = Some(remote_did);
                }
                Ok(None) => {
                    warn!("gateway returned no usable did; using local fallback");
                }
                Err(err) => {
                    warn!(error = %err, "gateway provisioning failed; queueing for retry");
                    self.queue_outbox(
                        OutboxOperation::Provision,
                        &ProvisionPayload {
                            node_pubkey: node_pubkey.clone(),
                            label: label.to_string(),
                        },
                    )
                    .await?;
                }
            }
        }

        let did = match did {
            Some(d) => d,
            None => self.generate_local_did(&node_pubkey, label),
        };

        // A forced re-provision that mints a new DID orphans the old DID's
        // bindings; purge them so invariant "binding.did == identity.did"
        // holds.
        let governance_tier = match &existing {
            Some(identity) => {
                if identity.did != did {
                    self.store
                        .delete_bindings_for_did(&identity.did)
                        .await
                        .map_err(Self::internal)?;
                }
                identity.governance_tier
            }
            None => GovernanceTier::Basic,
        };

        let gateway_url = (source == IdentitySource::ArchonGateway)
            .then(|| self.gateway_url.clone());

        self.store
            .upsert_identity(
                &did,
                governance_tier,
                "active",
                source,
                gateway_url.as_deref(),
                self.now(),
            )
            .await
            .map_err(Self::internal)?;

        info!(did = %did, source = source.as_str(), "identity provisioned");
        Ok(ProvisionReceipt {
            ok: true,
            already_provisioned: None,
            did,
            source,
            governance_tier,
            gateway_url,
        })
    }

    fn generate_local_did(&self, node_pubkey: &str, label: &str) -> String {
        let material = format!(
            "{}:{}:{}:{}",
            node_pubkey,
            label,
            self.now(),
            Uuid::new_v4()
        );
        let digest = sha256_hex(material.as_bytes());
        format!("did:cid:{}", &digest[..LOCAL_DID_SUFFIX_LEN])
    }

    // -----------------------------------------------------------------------
    // bindings
    // -----------------------------------------------------------------------

    pub async fn bind_nostr(
        &self,
        nostr_pubkey: &str,
        did: &str,
    ) -> Result<BindReceipt, ServiceError> {
        if !is_valid_nostr_pubkey(nostr_pubkey) {
            return Err(ServiceError::Validation(
                "invalid nostr_pubkey (expected 64 hex chars)".to_string(),
            ));
        }
        self.bind(BindingType::Nostr, nostr_pubkey.to_string(), did)
            .await
    }

    pub async fn bind_cln(&self, cln_pubkey: &str, did: &str) -> Result<BindReceipt, ServiceError> {
        let subject = if cln_pubkey.is_empty() {
            self.our_node_pubkey().await
        } else {
            cln_pubkey.to_string()
        };
        if !is_valid_cln_pubkey(&subject) {
            return Err(ServiceError::Validation(
                "invalid cln_pubkey (expected 66-char compressed secp256k1 pubkey)".to_string(),
            ));
        }
        self.bind(BindingType::Cln, subject, did).await
    }

    async fn bind(
        &self,
        binding_type: BindingType,
        subject: String,
        explicit_did: &str,
    ) -> Result<BindReceipt, ServiceError> {
        if !explicit_did.is_empty() && !is_valid_did(explicit_did) {
            return Err(ServiceError::Validation(
                "invalid did (expected did:cid:<suffix>)".to_string(),
            ));
        }

        let identity = self
            .store
            .get_identity()
            .await
            .map_err(Self::internal)?
            .ok_or(ServiceError::NotProvisioned)?;

        let did = if explicit_did.is_empty() {
            identity.did.clone()
        } else {
            explicit_did.to_string()
        };
        if did != identity.did {
            return Err(ServiceError::ForeignDid);
        }

        let node_pubkey = self.our_node_pubkey().await;
        let timestamp = self.now();
        let attestation = serde_json::json!({
            "binding_type": binding_type,
            "did": did,
            "subject": subject,
            "node_pubkey": node_pubkey,
            "timestamp": timestamp,
        });
        let canonical = canonical_json(&attestation);
        let signature = self.require_signature(&canonical).await?;

        let binding_id = digest32(&format!("{}:{}:{}", did, binding_type.as_str(), subject));
        self.store
            .upsert_binding(
                &binding_id,
                &did,
                binding_type,
                &subject,
                &canonical,
                &signature,
                timestamp,
            )
            .await
            .map_err(Self::internal)?;

        Ok(BindReceipt {
            ok: true,
            binding_id,
            did,
            binding_type,
            subject,
        })
    }

    // -----------------------------------------------------------------------
    // upgrade
    // -----------------------------------------------------------------------

    pub async fn upgrade(
        &self,
        target_tier: &str,
        bond_sats: u64,
    ) -> Result<UpgradeReceipt, ServiceError> {
        let tier = GovernanceTier::parse(target_tier).map_err(|_| ServiceError::InvalidTier)?;

        let identity = self
            .store
            .get_identity()
            .await
            .map_err(Self::internal)?
            .ok_or(ServiceError::NotProvisioned)?;

        if tier == GovernanceTier::Governance {
            if bond_sats < self.min_bond_sats {
                return Err(ServiceError::InsufficientBond {
                    required_bond_sats: self.min_bond_sats,
                });
            }

            // The claimed bond must be covered by actual outgoing channel
            // capacity; an unreadable balance counts as zero.
            let balance = match self.node.channel_balance_sats().await {
                Ok(sats) => sats,
                Err(err) => {
                    warn!(error = %err, "listfunds failed during bond verification");
                    0
                }
            };
            if balance < bond_sats {
                return Err(ServiceError::BondVerification {
                    local_balance_sats: balance,
                });
            }
        }

        self.store
            .update_governance_tier(tier, self.now())
            .await
            .map_err(Self::internal)?;

        info!(did = %identity.did, tier = tier.as_str(), "governance tier updated");
        Ok(UpgradeReceipt {
            ok: true,
            did: identity.did,
            governance_tier: tier,
        })
    }

    // -----------------------------------------------------------------------
    // polls
    // -----------------------------------------------------------------------

    fn normalize_poll_options(options: &Value) -> Option<Vec<String>> {
        let items = options.as_array()?;
        let mut cleaned: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            let value = item.as_str()?.trim().to_string();
            if value.is_empty() || value.len() > MAX_OPTION_LEN {
                return None;
            }
            if cleaned.contains(&value) {
                return None;
            }
            cleaned.push(value);
        }
        if cleaned.len() < MIN_OPTIONS || cleaned.len() > MAX_OPTIONS {
            return None;
        }
        Some(cleaned)
    }

    fn valid_poll_type(poll_type: &str) -> bool {
        !poll_type.is_empty()
            && poll_type.len() <= MAX_POLL_TYPE_LEN
            && poll_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    }

    pub async fn poll_create(
        &self,
        poll_type: &str,
        title: &str,
        options: &Value,
        deadline: i64,
        metadata: &Value,
    ) -> Result<PollCreateReceipt, ServiceError> {
        let identity = self.require_governance().await?;

        let total = self.store.count_polls().await.map_err(Self::internal)?;
        if total >= MAX_TOTAL_POLLS {
            return Err(ServiceError::PollCapacity);
        }

        if !Self::valid_poll_type(poll_type) {
            return Err(ServiceError::Validation(
                "invalid poll_type (1-32 chars of [A-Za-z0-9_-])".to_string(),
            ));
        }

        let title = title.trim();
        if title.is_empty() || title.len() > MAX_TITLE_LEN {
            return Err(ServiceError::Validation(
                "invalid title (1-200 chars)".to_string(),
            ));
        }

        if deadline <= self.now() {
            return Err(ServiceError::Validation(
                "invalid deadline (must be a future unix timestamp)".to_string(),
            ));
        }

        let cleaned_options = Self::normalize_poll_options(options).ok_or_else(|| {
            ServiceError::Validation(
                "invalid options (expected 2-10 unique non-empty strings)".to_string(),
            )
        })?;

        if !metadata.is_object() {
            return Err(ServiceError::Validation(
                "metadata must be an object".to_string(),
            ));
        }
        let metadata_json = canonical_json(metadata);
        if metadata_json.len() > MAX_METADATA_BYTES {
            return Err(ServiceError::Validation(
                "metadata too large (max 8192 bytes)".to_string(),
            ));
        }

        let created_by = if !identity.did.is_empty() {
            identity.did.clone()
        } else {
            let pubkey = self.our_node_pubkey().await;
            if pubkey.is_empty() {
                "local-node".to_string()
            } else {
                pubkey
            }
        };

        let poll_id = Uuid::new_v4().to_string();
        let metadata_value: Value =
            serde_json::from_str(&metadata_json).map_err(|e| Self::internal(e.into()))?;
        let mut remote_poll_id: Option<String> = None;

        if let Some(gateway) = self.remote() {
            match gateway
                .create_poll(
                    poll_type,
                    title,
                    &cleaned_options,
                    deadline,
                    &metadata_value,
                    &created_by,
                )
                .await
            {
                Ok(Some(remote_id)) => remote_poll_id = Some(remote_id),
                Ok(None) => {
                    warn!(poll_id = %poll_id, "gateway returned no poll id; keeping local poll only");
                }
                Err(err) => {
                    warn!(poll_id = %poll_id, error = %err,
                          "remote poll creation failed; queueing for retry");
                    self.queue_outbox(
                        OutboxOperation::CreatePoll,
                        &CreatePollPayload {
                            poll_id: poll_id.clone(),
                            poll_type: poll_type.to_string(),
                            title: title.to_string(),
                            options: cleaned_options.clone(),
                            deadline,
                            metadata: metadata_value.clone(),
                            creator: created_by.clone(),
                        },
                    )
                    .await?;
                }
            }
        }

        let options_json = canonical_json(&Value::Array(
            cleaned_options.iter().cloned().map(Value::String).collect(),
        ));
        self.store
            .create_poll(
                &poll_id,
                remote_poll_id.as_deref(),
                poll_type,
                title,
                &options_json,
                &metadata_json,
                &created_by,
                deadline,
                self.now(),
            )
            .await
            .map_err(Self::internal)?;

        Ok(PollCreateReceipt {
            ok: true,
            poll_id,
            remote_poll_id,
            status: PollStatus::Active,
            deadline,
        })
    }

    pub async fn poll_status(&self, poll_id: &str) -> Result<PollStatusReport, ServiceError> {
        if poll_id.is_empty() {
            return Err(ServiceError::Validation("poll_id is required".to_string()));
        }

        let poll = self
            .store
            .get_poll(poll_id)
            .await
            .map_err(Self::internal)?
            .ok_or(ServiceError::PollNotFound)?;
        let poll = self.refresh_poll_state(poll).await?;

        let options = poll_options(&poll);
        let votes = self
            .store
            .list_votes_for_poll(poll_id)
            .await
            .map_err(Self::internal)?;

        let mut tally: std::collections::BTreeMap<String, i64> =
            options.iter().map(|opt| (opt.clone(), 0)).collect();
        for vote in &votes {
            *tally.entry(vote.choice.clone()).or_insert(0) += 1;
        }

        Ok(PollStatusReport {
            ok: true,
            poll: PollHeader {
                poll_id: poll.poll_id.clone(),
                remote_poll_id: poll.remote_poll_id.clone(),
                poll_type: poll.poll_type.clone(),
                title: poll.title.clone(),
                created_by: poll.created_by.clone(),
                deadline: poll.deadline,
                status: poll.status,
            },
            vote_count: votes.len() as i64,
            voters: votes.into_iter().map(|v| v.voter_id).collect(),
            tally,
        })
    }

    // -----------------------------------------------------------------------
    // voting
    // -----------------------------------------------------------------------

    pub async fn vote(
        &self,
        poll_id: &str,
        choice: &str,
        reason: &str,
    ) -> Result<VoteReceipt, ServiceError> {
        self.require_governance().await?;

        let total = self.store.count_votes().await.map_err(Self::internal)?;
        if total >= MAX_TOTAL_VOTES {
            return Err(ServiceError::VoteCapacity);
        }

        if poll_id.is_empty() {
            return Err(ServiceError::Validation("poll_id is required".to_string()));
        }
        let choice = choice.trim();
        if choice.is_empty() {
            return Err(ServiceError::Validation("choice is required".to_string()));
        }
        if reason.len() > MAX_REASON_LEN {
            return Err(ServiceError::Validation(
                "reason too long (max 500 chars)".to_string(),
            ));
        }

        let poll = self
            .store
            .get_poll(poll_id)
            .await
            .map_err(Self::internal)?
            .ok_or(ServiceError::PollNotFound)?;
        let poll = self.refresh_poll_state(poll).await?;
        if poll.status != PollStatus::Active {
            return Err(ServiceError::PollNotActive {
                status: poll.status,
            });
        }

        let options = poll_options(&poll);
        if !options.iter().any(|opt| opt == choice) {
            return Err(ServiceError::InvalidChoice {
                valid_choices: options,
            });
        }

        // The ballot is keyed to the node's pubkey, never the DID: identities
        // are cheap to re-mint, node keys are not, so a re-provisioned DID
        // cannot yield a second ballot.
        let voter_id = self.our_node_pubkey().await;
        if voter_id.is_empty() {
            return Err(ServiceError::Internal(
                "node pubkey unavailable; cannot record ballot".to_string(),
            ));
        }

        let voted_at = self.now();
        let ballot = serde_json::json!({
            "poll_id": poll_id,
            "voter_id": voter_id,
            "choice": choice,
            "reason": reason,
            "voted_at": voted_at,
        });
        let canonical = canonical_json(&ballot);
        let signature = self.require_signature(&canonical).await?;

        let vote_id = digest32(&format!("{}:{}:{}:{}", poll_id, voter_id, choice, voted_at));
        let inserted = self
            .store
            .add_vote(
                &vote_id, poll_id, &voter_id, choice, reason, voted_at, &signature,
            )
            .await
            .map_err(Self::internal)?;
        if !inserted {
            return Err(ServiceError::DuplicateVote);
        }

        let mut remote_vote_sent = false;
        let remote_poll_id = poll.remote_poll_id.clone().unwrap_or_default();
        if !remote_poll_id.is_empty() {
            if let Some(gateway) = self.remote() {
                // The gateway wants the option's index, recomputed from the
                // canonical list the poll was stored with.
                let vote_index = options
                    .iter()
                    .position(|opt| opt == choice)
                    .unwrap_or_default();
                match gateway
                    .submit_vote(&remote_poll_id, vote_index, &voter_id)
                    .await
                {
                    Ok(true) => remote_vote_sent = true,
                    Ok(false) => {
                        warn!(poll_id = %poll_id, "gateway did not acknowledge ballot; queueing for retry");
                        self.queue_submit_vote(poll_id, choice, &voter_id).await?;
                    }
                    Err(err) => {
                        warn!(poll_id = %poll_id, error = %err,
                              "remote vote submit failed (local vote preserved)");
                        self.queue_submit_vote(poll_id, choice, &voter_id).await?;
                    }
                }
            }
        }

        Ok(VoteReceipt {
            ok: true,
            vote_id,
            poll_id: poll_id.to_string(),
            voter_id,
            choice: choice.to_string(),
            remote_vote_sent,
        })
    }

    async fn queue_submit_vote(
        &self,
        poll_id: &str,
        choice: &str,
        voter_id: &str,
    ) -> Result<(), ServiceError> {
        self.queue_outbox(
            OutboxOperation::SubmitVote,
            &SubmitVotePayload {
                poll_id: poll_id.to_string(),
                choice: choice.to_string(),
                voter_id: voter_id.to_string(),
            },
        )
        .await
    }

    pub async fn my_votes(&self, limit: i64) -> Result<VoterHistoryReport, ServiceError> {
        if limit < 1 {
            return Err(ServiceError::Validation(
                "limit must be positive".to_string(),
            ));
        }
        let limit = limit.min(500);

        let voter_id = self.our_node_pubkey().await;
        let votes = self
            .store
            .list_votes_for_voter(&voter_id, limit)
            .await
            .map_err(Self::internal)?;

        Ok(VoterHistoryReport {
            ok: true,
            voter_id,
            count: votes.len() as i64,
            votes,
        })
    }

    // -----------------------------------------------------------------------
    // status / signing / prune
    // -----------------------------------------------------------------------

    pub async fn status(&self) -> Result<StatusReport, ServiceError> {
        let identity = self.store.get_identity().await.map_err(Self::internal)?;
        let bindings = self.store.list_bindings().await.map_err(Self::internal)?;

        let mut counts = BindingCounts::default();
        for binding in &bindings {
            match binding.binding_type {
                BindingType::Nostr => counts.nostr += 1,
                BindingType::Cln => counts.cln += 1,
            }
        }

        Ok(StatusReport {
            ok: true,
            identity,
            bindings: counts,
            active_polls: self
                .store
                .count_polls_by_status(PollStatus::Active)
                .await
                .map_err(Self::internal)?,
            completed_polls: self
                .store
                .count_polls_by_status(PollStatus::Completed)
                .await
                .map_err(Self::internal)?,
            total_polls: self.store.count_polls().await.map_err(Self::internal)?,
            total_votes: self.store.count_votes().await.map_err(Self::internal)?,
            network_enabled: self.network_enabled,
            gateway_url: self.gateway_url.clone(),
            min_governance_bond_sats: self.min_bond_sats,
        })
    }

    /// Bounded facade over the node's message signing.
    pub async fn sign_message(&self, message: &str) -> Result<SignatureReceipt, ServiceError> {
        if message.is_empty() {
            return Err(ServiceError::Validation("message is required".to_string()));
        }
        if message.len() > MAX_SIGN_MESSAGE_LEN {
            return Err(ServiceError::Validation(
                "message too long (max 10240 bytes)".to_string(),
            ));
        }
        let signature = self.require_signature(message).await?;
        Ok(SignatureReceipt {
            ok: true,
            signature,
        })
    }

    /// Complete expired polls, then drop completed polls (and their votes)
    /// plus terminal outbox entries older than the retention window.
    pub async fn prune(&self, retention_days: i64) -> Result<PruneReport, ServiceError> {
        if retention_days < 1 {
            return Err(ServiceError::Validation(
                "retention_days must be >= 1".to_string(),
            ));
        }

        let now = self.now();
        let polls_completed = self
            .store
            .complete_expired_polls(now)
            .await
            .map_err(Self::internal)?;

        let cutoff = now - retention_days * 86_400;
        let polls_removed = self
            .store
            .prune_completed_polls(cutoff)
            .await
            .map_err(Self::internal)?;
        let outbox_removed = self
            .store
            .outbox_prune(cutoff)
            .await
            .map_err(Self::internal)?;

        info!(
            polls_completed,
            polls_removed, outbox_removed, "prune finished"
        );
        Ok(PruneReport {
            ok: true,
            polls_completed,
            polls_removed,
            outbox_removed,
            retention_days,
        })
    }
}

/// The poll's canonical option list; a poll with an unreadable blob has no
/// valid choices.
pub(crate) fn poll_options(poll: &PollRow) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(&poll.options_json).unwrap_or_default()
}
