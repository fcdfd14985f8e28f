//! HTTP client for the remote Archon gateway.
//!
//! The client is stateless beyond its base URL, bearer token, and reqwest
//! handle. Construction validates the URL policy; every request then
//! re-validates it AND re-resolves the host, rejecting any address in a
//! loopback, link-local, private, unique-local, or multicast range. Running
//! the address check per request (not just at construction) defeats DNS
//! rebinding.
//!
//! Hosts that are literally `localhost` or `127.0.0.1` are exempt from the
//! address check: they are the only hosts for which plain `http` is accepted
//! at all, and an operator pointing the gateway at their own machine is an
//! intentional configuration, not a forged DNS answer.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Why a gateway operation failed. No raw I/O error ever leaves this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The URL or its resolved addresses violate the outbound policy; the
    /// request was never sent.
    Blocked(String),
    /// DNS, connect, TLS, or timeout failure.
    Transport(String),
    /// The gateway answered with a non-2xx status.
    Status(u16),
    /// The response body was not the JSON we expected.
    Decode(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Blocked(reason) => write!(f, "request blocked: {}", reason),
            GatewayError::Transport(reason) => write!(f, "transport failure: {}", reason),
            GatewayError::Status(code) => write!(f, "gateway returned status {}", code),
            GatewayError::Decode(reason) => write!(f, "response decode failed: {}", reason),
        }
    }
}

impl std::error::Error for GatewayError {}

// ---------------------------------------------------------------------------
// URL policy
// ---------------------------------------------------------------------------

/// True when `s` passes the base-URL policy (`http`/`https` scheme, non-empty
/// host, `http` only for the local host).
pub fn is_valid_gateway_url(s: &str) -> bool {
    validate_base_url(s).is_ok()
}

fn host_is_literal_local(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1"
}

fn validate_base_url(s: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(s.trim())
        .map_err(|e| GatewayError::Blocked(format!("invalid url: {}", e)))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(GatewayError::Blocked(format!(
            "scheme '{}' not allowed (http/https only)",
            scheme
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| GatewayError::Blocked("url has no host".to_string()))?;
    if host.is_empty() {
        return Err(GatewayError::Blocked("url has no host".to_string()));
    }

    if scheme == "http" && !host_is_literal_local(host) {
        return Err(GatewayError::Blocked(format!(
            "plain http only allowed for localhost, got '{}'",
            host
        )));
    }

    Ok(url)
}

/// An address the client must never connect to: loopback, link-local,
/// RFC1918 private, unique-local, multicast, or unspecified.
fn is_forbidden_addr(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_link_local()
                || v4.is_private()
                || v4.is_multicast()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            let seg0 = v6.segments()[0];
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                // unique-local fc00::/7
                || (seg0 & 0xfe00) == 0xfc00
                // link-local fe80::/10
                || (seg0 & 0xffc0) == 0xfe80
        }
    }
}

/// Resolve the URL's host and reject the request if any address is in a
/// forbidden range. Runs before every request.
async fn check_resolved_addrs(url: &Url) -> Result<(), GatewayError> {
    let host = url
        .host_str()
        .ok_or_else(|| GatewayError::Blocked("url has no host".to_string()))?;
    if host_is_literal_local(host) {
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(443);
    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| GatewayError::Transport(format!("dns lookup for '{}' failed: {}", host, e)))?
        .collect();

    if addrs.is_empty() {
        return Err(GatewayError::Transport(format!(
            "dns lookup for '{}' returned no addresses",
            host
        )));
    }

    for addr in addrs {
        if is_forbidden_addr(addr.ip()) {
            return Err(GatewayError::Blocked(format!(
                "host '{}' resolves to forbidden address {}",
                host,
                addr.ip()
            )));
        }
    }
    Ok(())
}

fn iso8601(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// GatewayClient
// ---------------------------------------------------------------------------

pub struct GatewayClient {
    base: Url,
    auth_token: Option<String>,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Validate the base URL and build the client. The 10-second timeout
    /// applies to every request.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, GatewayError> {
        let base = validate_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(format!("http client build failed: {}", e)))?;
        Ok(Self {
            base,
            auth_token,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, GatewayError> {
        // Append to the base, keeping any path component it carries.
        let joined = format!("{}{}", self.base.as_str().trim_end_matches('/'), path);

        // Re-validate and re-resolve on every request (DNS rebinding guard).
        let url = validate_base_url(&joined)?;
        check_resolved_addrs(&url).await?;

        let body = archon_canon::canonical_json(payload);
        debug!(url = %url, "gateway POST");

        let mut req = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Transport("request timed out".to_string())
            } else {
                GatewayError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Ask the gateway to mint a DID for this node. Returns `Some(did)` only
    /// when the response carries a well-formed `did:cid:` string.
    pub async fn provision_identity(
        &self,
        node_pubkey: &str,
        label: &str,
        created_ts: i64,
    ) -> Result<Option<String>, GatewayError> {
        let payload = json!({
            "type": "create",
            "created": iso8601(created_ts),
            "registration": {"version": 1, "type": "agent"},
            "data": {"node_pubkey": node_pubkey, "label": label},
        });
        let data = self.post_json("/api/v1/did", &payload).await?;

        match data.get("did").and_then(Value::as_str) {
            Some(did) if archon_validate::is_valid_did(did) => Ok(Some(did.to_string())),
            _ => Ok(None),
        }
    }

    /// Mirror a local poll to the gateway. Returns the remote poll id when
    /// the response carries one.
    pub async fn create_poll(
        &self,
        poll_type: &str,
        title: &str,
        options: &[String],
        deadline: i64,
        metadata: &Value,
        creator: &str,
    ) -> Result<Option<String>, GatewayError> {
        let payload = json!({
            "poll": {
                "version": 2,
                "name": title,
                "options": options,
                "deadline": iso8601(deadline),
                "metadata": metadata,
                "creator": creator,
            },
            "poll_type": poll_type,
        });
        let data = self.post_json("/api/v1/polls", &payload).await?;

        match data.get("poll_id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(Some(id.to_string())),
            _ => Ok(None),
        }
    }

    /// Submit a ballot to a remote poll. `vote_index` is the zero-based index
    /// of the chosen option in the poll's canonical option list. True iff the
    /// response carries a ballot DID.
    pub async fn submit_vote(
        &self,
        remote_poll_id: &str,
        vote_index: usize,
        voter_id: &str,
    ) -> Result<bool, GatewayError> {
        let payload = json!({
            "vote": vote_index,
            "voter_id": voter_id,
        });
        let path = format!("/api/v1/polls/{}/vote", remote_poll_id);
        let data = self.post_json(&path, &payload).await?;

        Ok(matches!(
            data.get("ballot_did").and_then(Value::as_str),
            Some(did) if archon_validate::is_valid_did(did)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn url_policy_allows_https_anywhere_http_only_local() {
        assert!(is_valid_gateway_url("https://archon.technology"));
        assert!(is_valid_gateway_url("https://gateway.example.com:8443/base"));
        assert!(is_valid_gateway_url("http://localhost:9999"));
        assert!(is_valid_gateway_url("http://127.0.0.1:3000"));

        assert!(!is_valid_gateway_url("http://archon.technology"));
        assert!(!is_valid_gateway_url("http://169.254.169.254/latest"));
        assert!(!is_valid_gateway_url("ftp://archon.technology"));
        assert!(!is_valid_gateway_url("archon.technology"));
        assert!(!is_valid_gateway_url(""));
    }

    #[test]
    fn forbidden_ranges() {
        let forbidden = [
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)),
            IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)),
            IpAddr::V4(Ipv4Addr::new(169, 254, 169, 254)),
            IpAddr::V4(Ipv4Addr::new(224, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            "fc00::1".parse().unwrap(),
            "fe80::1".parse().unwrap(),
            "ff02::1".parse().unwrap(),
        ];
        for ip in forbidden {
            assert!(is_forbidden_addr(ip), "{} should be forbidden", ip);
        }

        let allowed = [
            IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
            IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            "2606:4700::1111".parse().unwrap(),
        ];
        for ip in allowed {
            assert!(!is_forbidden_addr(ip), "{} should be allowed", ip);
        }
    }

    #[tokio::test]
    async fn ip_literal_in_forbidden_range_is_blocked_before_sending() {
        // https so the URL policy passes; the address check must reject it.
        let client = GatewayClient::new("https://169.254.169.254", None).unwrap();
        let err = client
            .provision_identity("02ab", "test", 1_700_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Blocked(_)), "got {:?}", err);
    }

    #[test]
    fn iso8601_renders_utc_seconds() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00Z");
        assert_eq!(iso8601(1_700_000_000), "2023-11-14T22:13:20Z");
    }
}
