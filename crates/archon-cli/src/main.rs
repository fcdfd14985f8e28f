//! `archon`: command facade over the identity/governance service.
//!
//! This binary is intentionally thin: it parses arguments, builds the store
//! and service, forwards one command, and prints the structured result as
//! JSON. Every error (validation, precondition, remote) comes back as an
//! `{"error": ...}` object; nothing unwinds to the terminal.

mod node;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use archon_db::ArchonStore;
use archon_service::{ArchonService, Clock, ServiceConfig, ServiceError};

use crate::node::LightningCli;

const GATEWAY_TOKEN_ENV: &str = "ARCHON_GATEWAY_TOKEN";

#[derive(Parser)]
#[command(name = "archon")]
#[command(about = "Archon identity and governance for a Lightning node", long_about = None)]
struct Cli {
    /// SQLite path; a relative path resolves under the lightning directory.
    #[arg(long, default_value = "~/.lightning/cl_hive_archon.db")]
    db_path: String,

    /// Node base directory, forwarded to lightning-cli.
    #[arg(long)]
    lightning_dir: Option<String>,

    /// Archon gateway base URL.
    #[arg(long, default_value = "https://archon.technology")]
    gateway: String,

    /// Enable gateway HTTP calls (dark-launch default: off).
    #[arg(long)]
    network_enabled: bool,

    /// Minimum bond (sats) required for the governance tier.
    #[arg(long, default_value_t = 50_000)]
    governance_min_bond: u64,

    /// Bearer token for the gateway; falls back to $ARCHON_GATEWAY_TOKEN.
    #[arg(long)]
    gateway_auth_token: Option<String>,

    /// lightning-cli executable.
    #[arg(long, default_value = "lightning-cli")]
    lightning_cli: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision (or return) this node's decentralized identity.
    Provision {
        #[arg(long)]
        force: bool,
        #[arg(long, default_value = "")]
        label: String,
    },

    /// Bind a Nostr public key to the node's DID.
    BindNostr {
        nostr_pubkey: String,
        #[arg(long, default_value = "")]
        did: String,
    },

    /// Bind a CLN node pubkey (defaults to this node's own) to the DID.
    BindCln {
        #[arg(long, default_value = "")]
        cln_pubkey: String,
        #[arg(long, default_value = "")]
        did: String,
    },

    /// Identity, binding, poll, and network summary.
    Status,

    /// Change governance tier; `governance` requires a verified bond.
    Upgrade {
        #[arg(long, default_value = "governance")]
        target_tier: String,
        #[arg(long, default_value_t = 0)]
        bond_sats: u64,
    },

    /// Create a governance poll.
    PollCreate {
        #[arg(long)]
        poll_type: String,
        #[arg(long)]
        title: String,
        /// JSON array of option strings.
        #[arg(long)]
        options: String,
        /// Unix timestamp, strictly in the future.
        #[arg(long)]
        deadline: i64,
        /// JSON object.
        #[arg(long, default_value = "{}")]
        metadata: String,
    },

    /// Poll header, tally, and voter list.
    PollStatus { poll_id: String },

    /// Cast this node's ballot.
    Vote {
        poll_id: String,
        choice: String,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// This node's ballots, newest first.
    MyVotes {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },

    /// Sign an arbitrary message with the node key.
    SignMessage { message: String },

    /// Complete expired polls and drop old completed ones.
    Prune {
        #[arg(long, default_value_t = 90)]
        retention_days: i64,
    },

    /// Retry queued remote operations.
    ProcessOutbox {
        #[arg(long, default_value_t = 10)]
        max_entries: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let service = build_service(&cli).await?;

    let result = run_command(&service, cli.cmd).await;
    let (value, ok) = match result {
        Ok(value) => (value, true),
        Err(err) => (err.to_value(), false),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn build_service(cli: &Cli) -> Result<ArchonService> {
    let db_path = resolve_db_path(&cli.db_path, cli.lightning_dir.as_deref());
    let store = ArchonStore::open(&db_path)
        .await
        .with_context(|| format!("open store at {:?}", db_path))?;

    let node = LightningCli::new(cli.lightning_cli.clone(), cli.lightning_dir.clone());
    let auth_token = cli
        .gateway_auth_token
        .clone()
        .or_else(|| std::env::var(GATEWAY_TOKEN_ENV).ok().filter(|t| !t.is_empty()));

    ArchonService::new(
        store,
        Arc::new(node),
        ServiceConfig {
            gateway_url: cli.gateway.clone(),
            network_enabled: cli.network_enabled,
            min_governance_bond_sats: cli.governance_min_bond,
            gateway_auth_token: auth_token,
        },
        Clock::system(),
    )
    .await
}

/// `~` expands against $HOME; a relative path lands under the lightning
/// directory (itself `~/.lightning` by default).
fn resolve_db_path(db_path: &str, lightning_dir: Option<&str>) -> PathBuf {
    let expanded = expand_home(db_path);
    if expanded.is_absolute() {
        return expanded;
    }
    let base = lightning_dir
        .map(expand_home)
        .unwrap_or_else(|| expand_home("~/.lightning"));
    base.join(expanded)
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

async fn run_command(service: &ArchonService, cmd: Commands) -> Result<Value, ServiceError> {
    match cmd {
        Commands::Provision { force, label } => {
            to_value(service.provision(force, &label).await?)
        }
        Commands::BindNostr { nostr_pubkey, did } => {
            to_value(service.bind_nostr(&nostr_pubkey, &did).await?)
        }
        Commands::BindCln { cln_pubkey, did } => {
            to_value(service.bind_cln(&cln_pubkey, &did).await?)
        }
        Commands::Status => to_value(service.status().await?),
        Commands::Upgrade {
            target_tier,
            bond_sats,
        } => to_value(service.upgrade(&target_tier, bond_sats).await?),
        Commands::PollCreate {
            poll_type,
            title,
            options,
            deadline,
            metadata,
        } => {
            let options: Value = serde_json::from_str(&options)
                .map_err(|_| ServiceError::Validation("invalid options_json".to_string()))?;
            let metadata: Value = serde_json::from_str(&metadata)
                .map_err(|_| ServiceError::Validation("invalid metadata_json".to_string()))?;
            if !metadata.is_object() {
                return Err(ServiceError::Validation(
                    "metadata_json must decode to an object".to_string(),
                ));
            }
            to_value(
                service
                    .poll_create(&poll_type, &title, &options, deadline, &metadata)
                    .await?,
            )
        }
        Commands::PollStatus { poll_id } => to_value(service.poll_status(&poll_id).await?),
        Commands::Vote {
            poll_id,
            choice,
            reason,
        } => to_value(service.vote(&poll_id, &choice, &reason).await?),
        Commands::MyVotes { limit } => to_value(service.my_votes(limit).await?),
        Commands::SignMessage { message } => to_value(service.sign_message(&message).await?),
        Commands::Prune { retention_days } => to_value(service.prune(retention_days).await?),
        Commands::ProcessOutbox { max_entries } => {
            to_value(service.process_outbox(max_entries).await?)
        }
    }
}

fn to_value<T: serde::Serialize>(receipt: T) -> Result<Value, ServiceError> {
    serde_json::to_value(receipt)
        .map_err(|e| ServiceError::Internal(format!("serialize result failed: {}", e)))
}
