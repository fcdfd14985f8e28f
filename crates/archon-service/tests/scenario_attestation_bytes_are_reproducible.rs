//! Same inputs, same clock, same signer: the attestation canonical bytes and
//! the signature over them must be identical across independent stores.

use archon_schemas::{GovernanceTier, IdentitySource};
use archon_testkit::{mem_service, Harness};

const DID: &str = "did:cid:fixedfixedfixedfixedfixedfixedfixedfixedfixed001";

async fn seeded() -> Harness {
    let h = mem_service().await;
    h.store
        .upsert_identity(
            DID,
            GovernanceTier::Basic,
            "active",
            IdentitySource::LocalFallback,
            None,
            h.clock.now(),
        )
        .await
        .unwrap();
    h
}

#[tokio::test]
async fn two_runs_produce_identical_attestation_bytes() {
    let a = seeded().await;
    let b = seeded().await;
    let subject = "ab".repeat(32);

    a.service.bind_nostr(&subject, "").await.unwrap();
    b.service.bind_nostr(&subject, "").await.unwrap();

    let row_a = &a.store.list_bindings().await.unwrap()[0];
    let row_b = &b.store.list_bindings().await.unwrap()[0];

    assert_eq!(row_a.attestation_json, row_b.attestation_json);
    assert!(!row_a.signature.is_empty());
    assert_eq!(row_a.signature, row_b.signature);

    // Canonical form: sorted keys, no whitespace, and it is exactly what was
    // signed.
    let expected = format!(
        "{{\"binding_type\":\"nostr\",\"did\":\"{}\",\"node_pubkey\":\"{}\",\"subject\":\"{}\",\"timestamp\":{}}}",
        DID,
        archon_testkit::TEST_NODE_PUBKEY,
        subject,
        a.clock.now(),
    );
    assert_eq!(row_a.attestation_json, expected);
}

#[tokio::test]
async fn stored_blobs_reserialize_byte_identically() {
    let h = seeded().await;
    h.service.upgrade("governance", 100_000).await.unwrap();

    let deadline = h.clock.now() + 3_600;
    let poll = h
        .service
        .poll_create(
            "config",
            "t",
            &serde_json::json!(["b", "a"]),
            deadline,
            &serde_json::json!({"zz": 1, "aa": {"k": [1, 2]}}),
        )
        .await
        .unwrap();

    let row = h.store.get_poll(&poll.poll_id).await.unwrap().unwrap();
    for blob in [&row.options_json, &row.metadata_json] {
        let parsed: serde_json::Value = serde_json::from_str(blob).unwrap();
        assert_eq!(&archon_canon::canonical_json(&parsed), blob);
    }
    // Option order is preserved (it is a sequence, not a set).
    assert_eq!(row.options_json, r#"["b","a"]"#);
    assert_eq!(row.metadata_json, r#"{"aa":{"k":[1,2]},"zz":1}"#);
}
