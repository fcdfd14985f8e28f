use archon_db::ArchonStore;
use archon_schemas::{
    BindingType, GovernanceTier, IdentitySource, OutboxOperation, OutboxStatus, PollStatus,
};

async fn store() -> ArchonStore {
    let store = ArchonStore::open_in_memory().await.unwrap();
    store.init_schema().await.unwrap();
    store
}

#[tokio::test]
async fn identity_singleton_preserves_created_at() {
    let store = store().await;

    store
        .upsert_identity(
            "did:cid:first111",
            GovernanceTier::Basic,
            "active",
            IdentitySource::LocalFallback,
            None,
            1_000,
        )
        .await
        .unwrap();

    store
        .upsert_identity(
            "did:cid:second22",
            GovernanceTier::Governance,
            "active",
            IdentitySource::ArchonGateway,
            Some("https://archon.technology"),
            2_000,
        )
        .await
        .unwrap();

    let id = store.get_identity().await.unwrap().unwrap();
    assert_eq!(id.did, "did:cid:second22");
    assert_eq!(id.created_at, 1_000);
    assert_eq!(id.updated_at, 2_000);
    assert_eq!(id.governance_tier, GovernanceTier::Governance);
    assert_eq!(id.gateway_url.as_deref(), Some("https://archon.technology"));
}

#[tokio::test]
async fn binding_upsert_overwrites_on_subject_conflict() {
    let store = store().await;
    let subject = "ab".repeat(32);

    store
        .upsert_binding(
            "bind-one",
            "did:cid:first111",
            BindingType::Nostr,
            &subject,
            r#"{"v":1}"#,
            "sig-one",
            1_000,
        )
        .await
        .unwrap();

    store
        .upsert_binding(
            "bind-two",
            "did:cid:second22",
            BindingType::Nostr,
            &subject,
            r#"{"v":2}"#,
            "sig-two",
            2_000,
        )
        .await
        .unwrap();

    let bindings = store.list_bindings().await.unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].binding_id, "bind-two");
    assert_eq!(bindings[0].signature, "sig-two");
    assert_eq!(bindings[0].created_at, 1_000);
    assert_eq!(bindings[0].updated_at, 2_000);

    let removed = store
        .delete_bindings_for_did("did:cid:second22")
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn duplicate_vote_is_ignored_not_raised() {
    let store = store().await;
    store
        .create_poll(
            "poll-1",
            None,
            "config",
            "Adjust fee floor",
            r#"["no","yes"]"#,
            "{}",
            "did:cid:creator1",
            5_000,
            1_000,
        )
        .await
        .unwrap();

    let first = store
        .add_vote("vote-1", "poll-1", "02aa", "yes", "", 1_100, "sig")
        .await
        .unwrap();
    assert!(first);

    let second = store
        .add_vote("vote-2", "poll-1", "02aa", "no", "", 1_200, "sig")
        .await
        .unwrap();
    assert!(!second);

    let votes = store.list_votes_for_poll("poll-1").await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].choice, "yes");
}

#[tokio::test]
async fn expired_polls_complete_in_bulk() {
    let store = store().await;
    for (id, deadline) in [("p1", 1_500), ("p2", 2_500), ("p3", 9_000)] {
        store
            .create_poll(
                id,
                None,
                "config",
                "t",
                r#"["a","b"]"#,
                "{}",
                "creator",
                deadline,
                1_000,
            )
            .await
            .unwrap();
    }

    let completed = store.complete_expired_polls(3_000).await.unwrap();
    assert_eq!(completed, 2);
    assert_eq!(
        store
            .count_polls_by_status(PollStatus::Active)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        store
            .count_polls_by_status(PollStatus::Completed)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn prune_removes_completed_polls_and_their_votes() {
    let store = store().await;
    store
        .create_poll(
            "poll-old",
            None,
            "ban",
            "Ban peer A",
            r#"["ban","no-ban"]"#,
            "{}",
            "creator",
            2_000,
            1_000,
        )
        .await
        .unwrap();
    store
        .add_vote("v1", "poll-old", "02aa", "ban", "", 1_100, "sig")
        .await
        .unwrap();
    store.complete_expired_polls(3_000).await.unwrap();

    let removed = store.prune_completed_polls(10_000).await.unwrap();
    assert_eq!(removed, 1);
    assert!(store.get_poll("poll-old").await.unwrap().is_none());
    assert_eq!(store.count_votes().await.unwrap(), 0);
}

#[tokio::test]
async fn outbox_retry_budget_flips_to_exhausted() {
    let store = store().await;
    store
        .outbox_add("entry-1", OutboxOperation::Provision, "{}", 1_000, 3)
        .await
        .unwrap();

    // Not due yet with a future next_retry_at after a failure.
    store
        .outbox_mark_failed("entry-1", "connect refused", 1_030, 1_000)
        .await
        .unwrap();
    assert!(store
        .outbox_list_pending(1_010, 10)
        .await
        .unwrap()
        .is_empty());

    let due = store.outbox_list_pending(1_030, 10).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].retry_count, 1);
    assert_eq!(due[0].last_error.as_deref(), Some("connect refused"));

    store
        .outbox_mark_failed("entry-1", "connect refused", 1_090, 1_030)
        .await
        .unwrap();
    store
        .outbox_mark_failed("entry-1", "connect refused", 1_210, 1_090)
        .await
        .unwrap();

    // Third failure spent the budget of 3: no longer pending.
    assert!(store
        .outbox_list_pending(9_999, 10)
        .await
        .unwrap()
        .is_empty());

    // Terminal entries are prunable.
    let removed = store.outbox_prune(9_999).await.unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn outbox_add_is_idempotent_on_entry_id() {
    let store = store().await;
    store
        .outbox_add("entry-1", OutboxOperation::SubmitVote, r#"{"a":1}"#, 1_000, 5)
        .await
        .unwrap();
    store
        .outbox_add("entry-1", OutboxOperation::SubmitVote, r#"{"a":1}"#, 1_000, 5)
        .await
        .unwrap();

    let due = store.outbox_list_pending(1_000, 10).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].status, OutboxStatus::Pending);
    assert_eq!(due[0].operation, OutboxOperation::SubmitVote);
}

#[tokio::test]
async fn remote_poll_id_backfill() {
    let store = store().await;
    store
        .create_poll(
            "poll-1",
            None,
            "config",
            "t",
            r#"["a","b"]"#,
            "{}",
            "creator",
            5_000,
            1_000,
        )
        .await
        .unwrap();

    store
        .set_remote_poll_id("poll-1", "remote-77", 1_500)
        .await
        .unwrap();
    let poll = store.get_poll("poll-1").await.unwrap().unwrap();
    assert_eq!(poll.remote_poll_id.as_deref(), Some("remote-77"));
    assert_eq!(poll.updated_at, 1_500);
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archon.db");

    {
        let store = ArchonStore::open(&path).await.unwrap();
        store.init_schema().await.unwrap();
        store
            .upsert_identity(
                "did:cid:persist1",
                GovernanceTier::Basic,
                "active",
                IdentitySource::LocalFallback,
                None,
                1_000,
            )
            .await
            .unwrap();
    }

    let store = ArchonStore::open(&path).await.unwrap();
    store.init_schema().await.unwrap();
    let id = store.get_identity().await.unwrap().unwrap();
    assert_eq!(id.did, "did:cid:persist1");
}
