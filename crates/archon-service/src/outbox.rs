//! Store-and-forward drain: replay queued remote operations against the
//! gateway with exponential backoff until success or exhaustion.

use tracing::{info, warn};

use archon_canon::{canonical_string, digest32};
use archon_schemas::{
    CreatePollPayload, IdentitySource, OutboxOperation, OutboxReport, OutboxRow, ProvisionPayload,
    SubmitVotePayload,
};
use serde::Serialize;

use crate::error::{truncated, ServiceError};
use crate::service::{poll_options, ArchonService, DEFAULT_MAX_RETRIES};

const RETRY_BASE_SECS: i64 = 30;
const RETRY_CAP_SECS: i64 = 600;

fn backoff_secs(retry_count: i64) -> i64 {
    let shift = retry_count.clamp(0, 16) as u32;
    RETRY_CAP_SECS.min(RETRY_BASE_SECS.saturating_mul(1_i64 << shift))
}

impl ArchonService {
    /// Persist a failed remote operation for later replay. The entry id is a
    /// digest of operation, payload, and timestamp, so re-queueing the same
    /// failure in the same second is a no-op.
    pub(crate) async fn queue_outbox<T: Serialize>(
        &self,
        operation: OutboxOperation,
        payload: &T,
    ) -> Result<(), ServiceError> {
        let payload_json = canonical_string(payload).map_err(Self::internal)?;
        let now = self.now();
        let entry_id = digest32(&format!("{}:{}:{}", operation.as_str(), payload_json, now));
        self.store
            .outbox_add(&entry_id, operation, &payload_json, now, DEFAULT_MAX_RETRIES)
            .await
            .map_err(Self::internal)
    }

    /// Visit up to `max_entries` due pending entries, oldest first. Success
    /// marks the entry `succeeded`; failure backs off exponentially
    /// (30·2^retries seconds, capped at 600) until the retry budget flips the
    /// entry to `exhausted`.
    pub async fn process_outbox(&self, max_entries: i64) -> Result<OutboxReport, ServiceError> {
        let max_entries = max_entries.max(1);
        let now = self.now();
        let entries = self
            .store
            .outbox_list_pending(now, max_entries)
            .await
            .map_err(Self::internal)?;

        let mut report = OutboxReport::default();
        for entry in entries {
            report.processed += 1;
            match self.dispatch_entry(&entry).await {
                Ok(()) => {
                    self.store
                        .outbox_mark_success(&entry.entry_id, self.now())
                        .await
                        .map_err(Self::internal)?;
                    report.succeeded += 1;
                    info!(entry_id = %entry.entry_id, operation = entry.operation.as_str(),
                          "outbox entry delivered");
                }
                Err(message) => {
                    let next_retry_at = self.now() + backoff_secs(entry.retry_count);
                    self.store
                        .outbox_mark_failed(
                            &entry.entry_id,
                            &truncated(&message),
                            next_retry_at,
                            self.now(),
                        )
                        .await
                        .map_err(Self::internal)?;
                    report.failed += 1;
                    warn!(entry_id = %entry.entry_id, operation = entry.operation.as_str(),
                          retry_count = entry.retry_count + 1, error = %message,
                          "outbox entry failed");
                }
            }
        }
        Ok(report)
    }

    /// Replay one entry against the gateway. The error string becomes the
    /// entry's `last_error`.
    async fn dispatch_entry(&self, entry: &OutboxRow) -> Result<(), String> {
        let gateway = self.remote().ok_or("gateway not configured")?;

        match entry.operation {
            OutboxOperation::Provision => {
                let payload: ProvisionPayload = serde_json::from_str(&entry.payload_json)
                    .map_err(|e| format!("payload decode failed: {}", e))?;
                let did = gateway
                    .provision_identity(&payload.node_pubkey, &payload.label, self.now())
                    .await
                    .map_err(|e| e.to_string())?
                    .ok_or("gateway returned no usable did")?;
                self.adopt_gateway_did(&did)
                    .await
                    .map_err(|e| e.to_string())
            }
            OutboxOperation::CreatePoll => {
                let payload: CreatePollPayload = serde_json::from_str(&entry.payload_json)
                    .map_err(|e| format!("payload decode failed: {}", e))?;
                if self
                    .store
                    .get_poll(&payload.poll_id)
                    .await
                    .map_err(|e| e.to_string())?
                    .is_none()
                {
                    return Err("local poll no longer exists".to_string());
                }
                let remote_id = gateway
                    .create_poll(
                        &payload.poll_type,
                        &payload.title,
                        &payload.options,
                        payload.deadline,
                        &payload.metadata,
                        &payload.creator,
                    )
                    .await
                    .map_err(|e| e.to_string())?
                    .ok_or("gateway returned no poll id")?;
                self.store
                    .set_remote_poll_id(&payload.poll_id, &remote_id, self.now())
                    .await
                    .map_err(|e| e.to_string())
            }
            OutboxOperation::SubmitVote => {
                let payload: SubmitVotePayload = serde_json::from_str(&entry.payload_json)
                    .map_err(|e| format!("payload decode failed: {}", e))?;
                let poll = self
                    .store
                    .get_poll(&payload.poll_id)
                    .await
                    .map_err(|e| e.to_string())?
                    .ok_or("local poll no longer exists")?;
                let remote_poll_id = poll
                    .remote_poll_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .ok_or("poll has no remote id")?;
                // Recompute the index from the stored canonical options; if
                // the option list has drifted, fail the remote leg.
                let vote_index = poll_options(&poll)
                    .iter()
                    .position(|opt| opt == &payload.choice)
                    .ok_or("choice no longer present in poll options")?;
                let acked = gateway
                    .submit_vote(&remote_poll_id, vote_index, &payload.voter_id)
                    .await
                    .map_err(|e| e.to_string())?;
                if acked {
                    Ok(())
                } else {
                    Err("gateway did not return a ballot did".to_string())
                }
            }
        }
    }

    /// A drained provisioning success promotes a still-local identity to the
    /// gateway DID, preserving tier and `created_at` and purging bindings of
    /// the replaced DID (the same rule as a forced re-provision).
    async fn adopt_gateway_did(&self, did: &str) -> anyhow::Result<()> {
        let Some(identity) = self.store.get_identity().await? else {
            return Ok(());
        };
        if identity.source != IdentitySource::LocalFallback || identity.did == did {
            return Ok(());
        }

        self.store.delete_bindings_for_did(&identity.did).await?;
        self.store
            .upsert_identity(
                did,
                identity.governance_tier,
                "active",
                IdentitySource::ArchonGateway,
                Some(&self.gateway_url),
                self.now(),
            )
            .await?;
        info!(old_did = %identity.did, did = %did, "adopted gateway identity");
        Ok(())
    }
}
