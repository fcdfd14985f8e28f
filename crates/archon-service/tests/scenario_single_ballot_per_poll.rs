use serde_json::json;

use archon_service::ServiceError;
use archon_testkit::{mem_service, Harness, TEST_NODE_PUBKEY};

async fn governed() -> Harness {
    let h = mem_service().await;
    h.service.provision(false, "").await.unwrap();
    h.service.upgrade("governance", 100_000).await.unwrap();
    h
}

#[tokio::test]
async fn one_ballot_per_node_per_poll() {
    let h = governed().await;
    let deadline = h.clock.now() + 3_600;
    let poll = h
        .service
        .poll_create(
            "config",
            "Adjust fee floor",
            &json!(["yes", "no"]),
            deadline,
            &json!({"change": "fee_floor"}),
        )
        .await
        .unwrap();

    let vote = h.service.vote(&poll.poll_id, "yes", "needed").await.unwrap();
    assert!(vote.ok);
    // Ballots are keyed to the node pubkey, never the DID.
    assert_eq!(vote.voter_id, TEST_NODE_PUBKEY);
    assert!(!vote.remote_vote_sent);

    let dup = h.service.vote(&poll.poll_id, "yes", "").await.unwrap_err();
    assert_eq!(dup, ServiceError::DuplicateVote);
    assert!(dup.to_string().contains("already exists"));

    let status = h.service.poll_status(&poll.poll_id).await.unwrap();
    assert_eq!(status.tally["yes"], 1);
    assert_eq!(status.tally["no"], 0);
    assert_eq!(status.vote_count, 1);
    assert_eq!(status.voters, vec![TEST_NODE_PUBKEY.to_string()]);
}

#[tokio::test]
async fn reprovisioned_did_cannot_vote_twice() {
    let h = governed().await;
    let deadline = h.clock.now() + 3_600;
    let poll = h
        .service
        .poll_create("config", "t", &json!(["yes", "no"]), deadline, &json!({}))
        .await
        .unwrap();

    h.service.vote(&poll.poll_id, "yes", "").await.unwrap();

    // A fresh DID on the same node still maps to the same voter_id.
    h.clock.advance(1);
    h.service.provision(true, "rotated").await.unwrap();
    let err = h.service.vote(&poll.poll_id, "no", "").await.unwrap_err();
    assert_eq!(err, ServiceError::DuplicateVote);
}

#[tokio::test]
async fn choice_must_be_a_poll_option() {
    let h = governed().await;
    let deadline = h.clock.now() + 3_600;
    let poll = h
        .service
        .poll_create("config", "t", &json!(["yes", "no"]), deadline, &json!({}))
        .await
        .unwrap();

    let err = h.service.vote(&poll.poll_id, "maybe", "").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::InvalidChoice {
            valid_choices: vec!["yes".to_string(), "no".to_string()],
        }
    );
}

#[tokio::test]
async fn vote_requires_governance_and_existing_poll() {
    let h = mem_service().await;
    h.service.provision(false, "").await.unwrap();

    let err = h.service.vote("nope", "yes", "").await.unwrap_err();
    assert_eq!(err, ServiceError::GovernanceRequired);

    h.service.upgrade("governance", 100_000).await.unwrap();
    let err = h.service.vote("nope", "yes", "").await.unwrap_err();
    assert_eq!(err, ServiceError::PollNotFound);
}
