use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface to the host Lightning node.
///
/// Implementations wrap the node's RPC surface (`getinfo`, `signmessage`,
/// `listfunds`). All three operations are fallible; hardware-signer failures
/// must surface as errors, never as fabricated output. The service treats a
/// missing signature as fatal for attestation and ballot paths.
#[async_trait]
pub trait NodePort: Send + Sync {
    /// The node's own compressed secp256k1 public key (66 hex chars).
    async fn node_pubkey(&self) -> Result<String>;

    /// Sign `message` with the node's message-signing key. Must return a
    /// non-empty signature on success.
    async fn sign_message(&self, message: &str) -> Result<String>;

    /// Sum of outgoing channel capacity in satoshis (`msat / 1000`,
    /// truncated). Used only by the governance-tier bond check.
    async fn channel_balance_sats(&self) -> Result<u64>;
}
