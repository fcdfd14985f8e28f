//! [`NodePort`] adapter that shells out to `lightning-cli`.
//!
//! The subsystem consumes `getinfo`, `signmessage`, and `listfunds` only;
//! everything else about the node stays behind the CLI boundary.

use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use archon_service::NodePort;

pub struct LightningCli {
    bin: String,
    lightning_dir: Option<String>,
}

impl LightningCli {
    pub fn new(bin: String, lightning_dir: Option<String>) -> Self {
        Self { bin, lightning_dir }
    }

    fn invoke(&self, args: &[&str]) -> Result<Value> {
        let mut cmd = Command::new(&self.bin);
        if let Some(dir) = &self.lightning_dir {
            cmd.arg(format!("--lightning-dir={}", dir));
        }
        cmd.args(args);

        let output = cmd
            .output()
            .with_context(|| format!("spawn {} failed", self.bin))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} {} failed: {}", self.bin, args[0], stderr.trim());
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("{} {} returned non-json output", self.bin, args[0]))
    }
}

/// CLN reports channel amounts either as a bare msat integer or as a
/// `"<n>msat"` string depending on version.
fn msat_value(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    v.as_str()?.strip_suffix("msat")?.parse().ok()
}

#[async_trait]
impl NodePort for LightningCli {
    async fn node_pubkey(&self) -> Result<String> {
        let info = self.invoke(&["getinfo"])?;
        info.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("getinfo response has no id"))
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let result = self.invoke(&["signmessage", message])?;
        let zbase = result
            .get("zbase")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if zbase.is_empty() {
            bail!("signmessage returned no zbase signature");
        }
        Ok(zbase.to_string())
    }

    async fn channel_balance_sats(&self) -> Result<u64> {
        let funds = self.invoke(&["listfunds"])?;
        let channels = funds
            .get("channels")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("listfunds response has no channels"))?;

        let mut total_msat: u64 = 0;
        for channel in channels {
            let msat = channel
                .get("our_amount_msat")
                .and_then(msat_value)
                .unwrap_or(0);
            total_msat = total_msat.saturating_add(msat);
        }
        Ok(total_msat / 1_000)
    }
}
