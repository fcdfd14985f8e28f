use std::fmt;

use serde_json::{json, Value};

use archon_schemas::PollStatus;

/// Maximum length of an error message forwarded to callers or persisted in
/// the outbox.
pub(crate) const MAX_ERROR_LEN: usize = 200;

/// Why a service operation was refused.
///
/// Every variant renders to the structured `{error, hint?, …context}` shape
/// the command surface reports; no stack-unwinding error leaves the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed input. The message names the field and the expected shape.
    Validation(String),
    /// `target_tier` outside the known set.
    InvalidTier,
    /// No identity row yet.
    NotProvisioned,
    /// Operation requires the governance tier.
    GovernanceRequired,
    /// An explicit DID was supplied that this node does not own.
    ForeignDid,
    PollNotFound,
    PollNotActive { status: PollStatus },
    /// The choice is not one of the poll's options.
    InvalidChoice { valid_choices: Vec<String> },
    /// One ballot per node per poll.
    DuplicateVote,
    PollCapacity,
    VoteCapacity,
    /// Claimed bond below the configured minimum.
    InsufficientBond { required_bond_sats: u64 },
    /// Claimed bond exceeds the node's actual outgoing channel balance.
    BondVerification { local_balance_sats: u64 },
    /// The node refused or failed to sign; fatal for attestation and ballot
    /// paths.
    Signing(String),
    /// Store or node-RPC failure, message already truncated.
    Internal(String),
}

impl ServiceError {
    /// The `{error, …}` object the command facade forwards verbatim.
    pub fn to_value(&self) -> Value {
        match self {
            ServiceError::Validation(message) => json!({"error": message}),
            ServiceError::InvalidTier => json!({
                "error": "invalid target_tier",
                "valid_tiers": ["basic", "governance"],
            }),
            ServiceError::NotProvisioned => json!({
                "error": "identity not provisioned",
                "hint": "run archon provision first",
            }),
            ServiceError::GovernanceRequired => json!({
                "error": "governance tier required",
                "hint": "run archon upgrade --target-tier governance --bond-sats 50000",
            }),
            ServiceError::ForeignDid => json!({
                "error": "cannot bind to a DID not owned by this node",
            }),
            ServiceError::PollNotFound => json!({"error": "poll not found"}),
            ServiceError::PollNotActive { status } => json!({
                "error": "poll is not active",
                "status": status,
            }),
            ServiceError::InvalidChoice { valid_choices } => json!({
                "error": "invalid choice",
                "valid_choices": valid_choices,
            }),
            ServiceError::DuplicateVote => json!({
                "error": "vote already exists for this voter and poll",
            }),
            ServiceError::PollCapacity => json!({"error": "poll capacity reached"}),
            ServiceError::VoteCapacity => json!({"error": "vote capacity reached"}),
            ServiceError::InsufficientBond { required_bond_sats } => json!({
                "error": "insufficient bond for governance tier",
                "required_bond_sats": required_bond_sats,
            }),
            ServiceError::BondVerification { local_balance_sats } => json!({
                "error": "bond verification failed",
                "local_balance_sats": local_balance_sats,
            }),
            ServiceError::Signing(detail) => json!({
                "error": format!("message signing failed: {}", detail),
            }),
            ServiceError::Internal(message) => json!({"error": message}),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(m) => write!(f, "{}", m),
            ServiceError::InvalidTier => write!(f, "invalid target_tier"),
            ServiceError::NotProvisioned => write!(f, "identity not provisioned"),
            ServiceError::GovernanceRequired => write!(f, "governance tier required"),
            ServiceError::ForeignDid => {
                write!(f, "cannot bind to a DID not owned by this node")
            }
            ServiceError::PollNotFound => write!(f, "poll not found"),
            ServiceError::PollNotActive { status } => {
                write!(f, "poll is not active (status: {})", status.as_str())
            }
            ServiceError::InvalidChoice { .. } => write!(f, "invalid choice"),
            ServiceError::DuplicateVote => {
                write!(f, "vote already exists for this voter and poll")
            }
            ServiceError::PollCapacity => write!(f, "poll capacity reached"),
            ServiceError::VoteCapacity => write!(f, "vote capacity reached"),
            ServiceError::InsufficientBond { .. } => {
                write!(f, "insufficient bond for governance tier")
            }
            ServiceError::BondVerification { .. } => write!(f, "bond verification failed"),
            ServiceError::Signing(m) => write!(f, "message signing failed: {}", m),
            ServiceError::Internal(m) => write!(f, "{}", m),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Clip an error message to the reporting bound.
pub(crate) fn truncated(message: &str) -> String {
    if message.len() <= MAX_ERROR_LEN {
        return message.to_string();
    }
    let mut end = MAX_ERROR_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_values_carry_context() {
        let v = ServiceError::BondVerification {
            local_balance_sats: 10_000,
        }
        .to_value();
        assert_eq!(v["error"], "bond verification failed");
        assert_eq!(v["local_balance_sats"], 10_000);

        let v = ServiceError::PollNotActive {
            status: PollStatus::Completed,
        }
        .to_value();
        assert_eq!(v["status"], "completed");

        let v = ServiceError::InvalidChoice {
            valid_choices: vec!["yes".into(), "no".into()],
        }
        .to_value();
        assert_eq!(v["valid_choices"][0], "yes");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(150); // 300 bytes
        let t = truncated(&long);
        assert!(t.len() <= MAX_ERROR_LEN);
        assert!(t.chars().all(|c| c == 'é'));
        assert_eq!(truncated("short"), "short");
    }
}
