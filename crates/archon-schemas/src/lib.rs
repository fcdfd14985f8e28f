//! Shared row shapes, enums, and command receipts for the archon subsystem.
//!
//! Everything here is plain data: the store maps SQL rows into these structs
//! by hand, the service fills the receipt types, and the command facade
//! serializes them verbatim.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovernanceTier {
    Basic,
    Governance,
}

impl GovernanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            GovernanceTier::Basic => "basic",
            GovernanceTier::Governance => "governance",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(GovernanceTier::Basic),
            "governance" => Ok(GovernanceTier::Governance),
            other => Err(anyhow!("invalid governance tier: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentitySource {
    LocalFallback,
    ArchonGateway,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::LocalFallback => "local-fallback",
            IdentitySource::ArchonGateway => "archon-gateway",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "local-fallback" => Ok(IdentitySource::LocalFallback),
            "archon-gateway" => Ok(IdentitySource::ArchonGateway),
            other => Err(anyhow!("invalid identity source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Completed,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Active => "active",
            PollStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(PollStatus::Active),
            "completed" => Ok(PollStatus::Completed),
            other => Err(anyhow!("invalid poll status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingType {
    Nostr,
    Cln,
}

impl BindingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingType::Nostr => "nostr",
            BindingType::Cln => "cln",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "nostr" => Ok(BindingType::Nostr),
            "cln" => Ok(BindingType::Cln),
            other => Err(anyhow!("invalid binding type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Succeeded,
    Exhausted,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Succeeded => "succeeded",
            OutboxStatus::Exhausted => "exhausted",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OutboxStatus::Pending),
            "succeeded" => Ok(OutboxStatus::Succeeded),
            "exhausted" => Ok(OutboxStatus::Exhausted),
            other => Err(anyhow!("invalid outbox status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxOperation {
    Provision,
    CreatePoll,
    SubmitVote,
}

impl OutboxOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxOperation::Provision => "provision",
            OutboxOperation::CreatePoll => "create_poll",
            OutboxOperation::SubmitVote => "submit_vote",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "provision" => Ok(OutboxOperation::Provision),
            "create_poll" => Ok(OutboxOperation::CreatePoll),
            "submit_vote" => Ok(OutboxOperation::SubmitVote),
            other => Err(anyhow!("invalid outbox operation: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Store rows
// ---------------------------------------------------------------------------

/// The identity singleton. `gateway_url` is present only when the identity
/// came from the remote gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRow {
    pub did: String,
    pub governance_tier: GovernanceTier,
    pub status: String,
    pub source: IdentitySource,
    pub gateway_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingRow {
    pub binding_id: String,
    pub did: String,
    pub binding_type: BindingType,
    pub subject: String,
    pub attestation_json: String,
    pub signature: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRow {
    pub poll_id: String,
    pub remote_poll_id: Option<String>,
    pub poll_type: String,
    pub title: String,
    pub options_json: String,
    pub metadata_json: String,
    pub created_by: String,
    pub deadline: i64,
    pub status: PollStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRow {
    pub vote_id: String,
    pub poll_id: String,
    pub voter_id: String,
    pub choice: String,
    pub reason: String,
    pub voted_at: i64,
    pub signature: String,
}

/// A vote joined with the header of the poll it was cast in, as returned by
/// `list_votes_for_voter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterHistoryRow {
    pub vote_id: String,
    pub poll_id: String,
    pub choice: String,
    pub reason: String,
    pub voted_at: i64,
    pub title: String,
    pub poll_type: String,
    pub poll_status: PollStatus,
    pub deadline: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRow {
    pub entry_id: String,
    pub operation: OutboxOperation,
    pub payload_json: String,
    pub status: OutboxStatus,
    pub retry_count: i64,
    pub max_retries: i64,
    pub next_retry_at: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ---------------------------------------------------------------------------
// Outbox payloads
// ---------------------------------------------------------------------------

/// Request body captured when a remote provisioning attempt fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionPayload {
    pub node_pubkey: String,
    pub label: String,
}

/// Request body captured when a remote poll creation fails. Carries the local
/// `poll_id` so a later drain can backfill `remote_poll_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollPayload {
    pub poll_id: String,
    pub poll_type: String,
    pub title: String,
    pub options: Vec<String>,
    pub deadline: i64,
    pub metadata: Value,
    pub creator: String,
}

/// Request body captured when a remote ballot submission fails. The vote
/// index is recomputed from the poll's canonical options at drain time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVotePayload {
    pub poll_id: String,
    pub choice: String,
    pub voter_id: String,
}

// ---------------------------------------------------------------------------
// Command receipts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReceipt {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_provisioned: Option<bool>,
    pub did: String,
    pub source: IdentitySource,
    pub governance_tier: GovernanceTier,
    pub gateway_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindReceipt {
    pub ok: bool,
    pub binding_id: String,
    pub did: String,
    pub binding_type: BindingType,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeReceipt {
    pub ok: bool,
    pub did: String,
    pub governance_tier: GovernanceTier,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingCounts {
    pub nostr: i64,
    pub cln: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub ok: bool,
    pub identity: Option<IdentityRow>,
    pub bindings: BindingCounts,
    pub active_polls: i64,
    pub completed_polls: i64,
    pub total_polls: i64,
    pub total_votes: i64,
    pub network_enabled: bool,
    pub gateway_url: String,
    pub min_governance_bond_sats: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollCreateReceipt {
    pub ok: bool,
    pub poll_id: String,
    pub remote_poll_id: Option<String>,
    pub status: PollStatus,
    pub deadline: i64,
}

/// Poll header as reported by `poll-status` (no JSON blobs).
#[derive(Debug, Clone, Serialize)]
pub struct PollHeader {
    pub poll_id: String,
    pub remote_poll_id: Option<String>,
    pub poll_type: String,
    pub title: String,
    pub created_by: String,
    pub deadline: i64,
    pub status: PollStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollStatusReport {
    pub ok: bool,
    pub poll: PollHeader,
    pub tally: BTreeMap<String, i64>,
    pub vote_count: i64,
    pub voters: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteReceipt {
    pub ok: bool,
    pub vote_id: String,
    pub poll_id: String,
    pub voter_id: String,
    pub choice: String,
    pub remote_vote_sent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoterHistoryReport {
    pub ok: bool,
    pub voter_id: String,
    pub count: i64,
    pub votes: Vec<VoterHistoryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureReceipt {
    pub ok: bool,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
    pub ok: bool,
    pub polls_completed: u64,
    pub polls_removed: u64,
    pub outbox_removed: u64,
    pub retention_days: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutboxReport {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_round_trips() {
        for s in ["basic", "governance"] {
            assert_eq!(GovernanceTier::parse(s).unwrap().as_str(), s);
        }
        for s in ["local-fallback", "archon-gateway"] {
            assert_eq!(IdentitySource::parse(s).unwrap().as_str(), s);
        }
        for s in ["active", "completed"] {
            assert_eq!(PollStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["pending", "succeeded", "exhausted"] {
            assert_eq!(OutboxStatus::parse(s).unwrap().as_str(), s);
        }
        for s in ["provision", "create_poll", "submit_vote"] {
            assert_eq!(OutboxOperation::parse(s).unwrap().as_str(), s);
        }
        assert!(GovernanceTier::parse("admin").is_err());
    }

    #[test]
    fn serde_names_match_wire_values() {
        let v = serde_json::to_value(IdentitySource::ArchonGateway).unwrap();
        assert_eq!(v, serde_json::json!("archon-gateway"));
        let v = serde_json::to_value(OutboxOperation::CreatePoll).unwrap();
        assert_eq!(v, serde_json::json!("create_poll"));
        let v = serde_json::to_value(GovernanceTier::Governance).unwrap();
        assert_eq!(v, serde_json::json!("governance"));
    }
}
