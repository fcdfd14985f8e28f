//! Canonical JSON and digest helpers.
//!
//! Every signed payload and every persisted JSON blob in the subsystem uses
//! one serialization: object keys sorted lexicographically, no insignificant
//! whitespace. Re-serializing a stored blob must yield the byte-identical
//! string, so signing and storage both go through this module.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonicalize a JSON value: sort all object keys recursively, emit compact
/// JSON.
pub fn canonical_json(v: &Value) -> String {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).expect("json serialization must not fail")
}

/// Canonicalize any serializable value by round-tripping through
/// `serde_json::Value`.
pub fn canonical_string<T: Serialize>(v: &T) -> Result<String> {
    let raw = serde_json::to_value(v).context("serialize for canonical form failed")?;
    Ok(canonical_json(&raw))
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

/// SHA-256 of `bytes`, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// First 32 hex chars of the SHA-256 of `material`. Used for binding, vote,
/// and outbox entry ids.
pub fn digest32(material: &str) -> String {
    sha256_hex(material.as_bytes())[..32].to_string()
}
