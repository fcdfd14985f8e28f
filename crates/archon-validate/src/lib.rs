//! Pure input predicates shared by the service and the gateway client.
//!
//! These never allocate and never touch I/O; callers decide how a rejection
//! is reported.

/// True when `value` is exactly `expected_len` ASCII hex characters.
pub fn is_hex(value: &str, expected_len: usize) -> bool {
    value.len() == expected_len && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Nostr public keys are 32 bytes, hex encoded.
pub fn is_valid_nostr_pubkey(value: &str) -> bool {
    is_hex(value, 64)
}

/// CLN node ids are compressed secp256k1 points: 33 bytes hex encoded with an
/// `02` or `03` prefix. The hex check runs first so the prefix slice only
/// ever sees ASCII.
pub fn is_valid_cln_pubkey(value: &str) -> bool {
    is_hex(value, 66) && matches!(&value[..2], "02" | "03")
}

const DID_PREFIX: &str = "did:cid:";

/// DID strings are treated as opaque beyond this shape check: the `did:cid:`
/// prefix followed by a 1-120 char suffix of `[A-Za-z0-9._:-]`.
pub fn is_valid_did(value: &str) -> bool {
    if !value.starts_with(DID_PREFIX) {
        return false;
    }
    if value.len() < 12 || value.len() > 128 {
        return false;
    }
    let suffix = &value[DID_PREFIX.len()..];
    !suffix.is_empty()
        && suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '-'))
}
