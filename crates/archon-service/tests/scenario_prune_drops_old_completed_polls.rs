use serde_json::json;

use archon_service::ServiceError;
use archon_testkit::mem_service;

#[tokio::test]
async fn prune_completes_expired_polls_then_drops_old_ones_with_votes() {
    let h = mem_service().await;
    h.service.provision(false, "").await.unwrap();
    h.service.upgrade("governance", 100_000).await.unwrap();

    let old_deadline = h.clock.now() + 10;
    let old = h
        .service
        .poll_create("ban", "Ban peer A", &json!(["ban", "no-ban"]), old_deadline, &json!({}))
        .await
        .unwrap();
    h.service.vote(&old.poll_id, "ban", "evidence").await.unwrap();

    // A hundred days later, a fresh poll exists alongside the stale one.
    h.clock.advance(100 * 86_400);
    let fresh = h
        .service
        .poll_create(
            "config",
            "Adjust fee floor",
            &json!(["yes", "no"]),
            h.clock.now() + 3_600,
            &json!({}),
        )
        .await
        .unwrap();

    let report = h.service.prune(90).await.unwrap();
    assert!(report.ok);
    assert_eq!(report.polls_completed, 1);
    assert_eq!(report.polls_removed, 1);
    assert_eq!(report.retention_days, 90);

    // The stale poll and its ballot are gone; the fresh poll is untouched.
    let err = h.service.poll_status(&old.poll_id).await.unwrap_err();
    assert_eq!(err, ServiceError::PollNotFound);
    assert_eq!(h.store.count_votes().await.unwrap(), 0);
    assert!(h.service.poll_status(&fresh.poll_id).await.is_ok());
}

#[tokio::test]
async fn recently_completed_polls_survive_the_window() {
    let h = mem_service().await;
    h.service.provision(false, "").await.unwrap();
    h.service.upgrade("governance", 100_000).await.unwrap();

    let poll = h
        .service
        .poll_create("config", "t", &json!(["a", "b"]), h.clock.now() + 10, &json!({}))
        .await
        .unwrap();

    h.clock.advance(86_400);
    let report = h.service.prune(90).await.unwrap();
    assert_eq!(report.polls_completed, 1);
    assert_eq!(report.polls_removed, 0);
    assert!(h.service.poll_status(&poll.poll_id).await.is_ok());
}

#[tokio::test]
async fn retention_below_one_day_is_rejected() {
    let h = mem_service().await;
    let err = h.service.prune(0).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}
