//! Orchestration core for the archon identity/governance subsystem.
//!
//! The service coordinates the store, the host-node port, and the optional
//! gateway client. Every operation is a short transaction against the store;
//! every remote leg degrades to local-only with an outbox entry; every error
//! is a structured [`ServiceError`]; nothing unwinds out of this crate.

mod clock;
mod error;
mod outbox;
mod ports;
mod service;

pub use clock::Clock;
pub use error::ServiceError;
pub use ports::NodePort;
pub use service::{
    ArchonService, ServiceConfig, DEFAULT_MAX_RETRIES, MAX_METADATA_BYTES, MAX_SIGN_MESSAGE_LEN,
    MAX_TOTAL_POLLS, MAX_TOTAL_VOTES,
};
