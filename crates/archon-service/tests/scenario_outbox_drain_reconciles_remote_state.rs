//! A gateway that is down when the operation runs and up when the outbox
//! drains: the drain must reconcile local state with the remote side.

use httpmock::prelude::*;
use serde_json::json;

use archon_schemas::IdentitySource;
use archon_service::ServiceConfig;
use archon_testkit::{mem_service_with, Harness, StubNode, TEST_NODE_PUBKEY};

async fn service_against(server: &MockServer) -> Harness {
    mem_service_with(
        StubNode::new(),
        ServiceConfig {
            gateway_url: server.base_url(),
            network_enabled: true,
            ..ServiceConfig::default()
        },
    )
    .await
}

#[tokio::test]
async fn drained_provision_adopts_gateway_did() {
    let server = MockServer::start();
    let h = service_against(&server).await;

    let mut down = server.mock(|when, then| {
        when.method(POST).path("/api/v1/did");
        then.status(503);
    });
    let receipt = h.service.provision(false, "alpha").await.unwrap();
    assert_eq!(receipt.source, IdentitySource::LocalFallback);
    down.assert();
    down.delete();

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/did");
        then.status(200).json_body(json!({"did": "did:cid:remote001"}));
    });

    let report = h.service.process_outbox(10).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.succeeded, 1);

    let identity = h.store.get_identity().await.unwrap().unwrap();
    assert_eq!(identity.did, "did:cid:remote001");
    assert_eq!(identity.source, IdentitySource::ArchonGateway);
    // Original provisioning time survives the adoption.
    assert_eq!(identity.created_at, 1_700_000_000);

    // Terminal entry: nothing pending afterwards.
    let report = h.service.process_outbox(10).await.unwrap();
    assert_eq!(report.processed, 0);
}

#[tokio::test]
async fn drained_create_poll_backfills_remote_id_and_vote_follows() {
    let server = MockServer::start();
    let h = service_against(&server).await;

    // Provision succeeds remotely so the identity is gateway-born.
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/did");
        then.status(200).json_body(json!({"did": "did:cid:remote001"}));
    });
    h.service.provision(false, "").await.unwrap();
    h.service.upgrade("governance", 100_000).await.unwrap();

    // Poll creation hits a dead endpoint and stays local.
    let mut polls_down = server.mock(|when, then| {
        when.method(POST).path("/api/v1/polls");
        then.status(502);
    });
    let deadline = h.clock.now() + 3_600;
    let poll = h
        .service
        .poll_create("config", "t", &json!(["yes", "no"]), deadline, &json!({}))
        .await
        .unwrap();
    assert!(poll.remote_poll_id.is_none());
    polls_down.assert();
    polls_down.delete();

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/polls");
        then.status(200).json_body(json!({"poll_id": "rp-42"}));
    });
    let report = h.service.process_outbox(10).await.unwrap();
    assert_eq!(report.succeeded, 1);

    let row = h.store.get_poll(&poll.poll_id).await.unwrap().unwrap();
    assert_eq!(row.remote_poll_id.as_deref(), Some("rp-42"));

    // With the remote id in place, a vote goes out immediately. Index 1 is
    // "no" in the canonical option order.
    let vote_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/polls/rp-42/vote")
            .json_body(json!({"vote": 1, "voter_id": TEST_NODE_PUBKEY}));
        then.status(200)
            .json_body(json!({"ballot_did": "did:cid:ballot01"}));
    });
    let vote = h.service.vote(&poll.poll_id, "no", "").await.unwrap();
    assert!(vote.remote_vote_sent);
    vote_mock.assert();
}

#[tokio::test]
async fn failed_remote_vote_queues_and_drains_with_recomputed_index() {
    let server = MockServer::start();
    let h = service_against(&server).await;

    server.mock(|when, then| {
        when.method(POST).path("/api/v1/did");
        then.status(200).json_body(json!({"did": "did:cid:remote001"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/polls");
        then.status(200).json_body(json!({"poll_id": "rp-43"}));
    });
    h.service.provision(false, "").await.unwrap();
    h.service.upgrade("governance", 100_000).await.unwrap();

    let deadline = h.clock.now() + 3_600;
    let poll = h
        .service
        .poll_create("config", "t", &json!(["yes", "no"]), deadline, &json!({}))
        .await
        .unwrap();
    assert_eq!(poll.remote_poll_id.as_deref(), Some("rp-43"));

    // Ballot endpoint down at vote time: local ballot is preserved and the
    // remote leg is queued.
    let mut vote_down = server.mock(|when, then| {
        when.method(POST).path("/api/v1/polls/rp-43/vote");
        then.status(500);
    });
    let vote = h.service.vote(&poll.poll_id, "yes", "reason").await.unwrap();
    assert!(vote.ok);
    assert!(!vote.remote_vote_sent);
    vote_down.assert();
    vote_down.delete();

    let vote_up = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/polls/rp-43/vote")
            .json_body(json!({"vote": 0, "voter_id": TEST_NODE_PUBKEY}));
        then.status(200)
            .json_body(json!({"ballot_did": "did:cid:ballot02"}));
    });
    let report = h.service.process_outbox(10).await.unwrap();
    assert_eq!(report.succeeded, 1);
    vote_up.assert();
}
