//! Test doubles and builders for service scenario tests: a scripted node
//! port, a settable clock, and in-memory service construction.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use archon_db::ArchonStore;
use archon_service::{ArchonService, Clock, NodePort, ServiceConfig};

/// A node pubkey shared by most scenarios.
pub const TEST_NODE_PUBKEY: &str =
    "02abababababababababababababababababababababababababababababababab";

/// Scripted [`NodePort`]: fixed pubkey, deterministic signatures, fixed
/// channel balance. Each failure mode is switchable per scenario.
pub struct StubNode {
    pub pubkey: Option<String>,
    pub signer_available: bool,
    pub balance_sats: u64,
}

impl StubNode {
    pub fn new() -> Self {
        Self {
            pubkey: Some(TEST_NODE_PUBKEY.to_string()),
            signer_available: true,
            balance_sats: 500_000_000,
        }
    }

    pub fn with_balance(balance_sats: u64) -> Self {
        Self {
            balance_sats,
            ..Self::new()
        }
    }

    pub fn without_signer() -> Self {
        Self {
            signer_available: false,
            ..Self::new()
        }
    }

    pub fn without_pubkey() -> Self {
        Self {
            pubkey: None,
            ..Self::new()
        }
    }
}

impl Default for StubNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodePort for StubNode {
    async fn node_pubkey(&self) -> Result<String> {
        self.pubkey
            .clone()
            .ok_or_else(|| anyhow!("getinfo unavailable"))
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        if !self.signer_available {
            return Err(anyhow!("signer unavailable"));
        }
        // Deterministic: the same message always yields the same signature.
        Ok(format!("zbase1{}", archon_canon::digest32(message)))
    }

    async fn channel_balance_sats(&self) -> Result<u64> {
        Ok(self.balance_sats)
    }
}

/// A clock that only moves when a scenario advances it.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn at(ts: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(ts)),
        }
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, ts: i64) {
        self.now.store(ts, Ordering::SeqCst);
    }

    pub fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn clock(&self) -> Clock {
        let shared = Arc::clone(&self.now);
        Clock::from_fn(move || shared.load(Ordering::SeqCst))
    }
}

/// Service plus handles the scenario keeps for inspection and time travel.
pub struct Harness {
    pub service: ArchonService,
    pub store: ArchonStore,
    pub clock: FixedClock,
}

/// In-memory, local-only service with default stubs.
pub async fn mem_service() -> Harness {
    mem_service_with(StubNode::new(), ServiceConfig::default()).await
}

/// In-memory service with a custom node and config.
pub async fn mem_service_with(node: StubNode, config: ServiceConfig) -> Harness {
    let store = ArchonStore::open_in_memory()
        .await
        .expect("open in-memory store");
    let clock = FixedClock::at(1_700_000_000);
    let service = ArchonService::new(store.clone(), Arc::new(node), config, clock.clock())
        .await
        .expect("build service");
    Harness {
        service,
        store,
        clock,
    }
}
