//! Integration tests for the time-based rules: future dates, service
//! windows and the advance-notice deadline.

mod helpers;

use chrono::{Duration, NaiveDate};

use helpers::{ALICE, TestEngine, dec1, dinner, hm};
use tablebook_core::config::ReservationConfig;
use tablebook_service::{ReservationError, ReservationRequest};

#[tokio::test]
async fn test_delete_inside_notice_window_fails() {
    let engine = TestEngine::new().await;
    let r = engine.book(ALICE, dinner(4, "indoor")).await;

    engine
        .clock
        .set(r.date_time() - Duration::hours(23) - Duration::minutes(59));
    let err = engine.service.delete_reservation(r.id).await.unwrap_err();
    assert!(matches!(err, ReservationError::LateCancellation { .. }));
    assert!(engine.service.get_reservation(r.id).await.is_ok());

    engine
        .clock
        .set(r.date_time() - Duration::hours(24) - Duration::minutes(1));
    engine.service.delete_reservation(r.id).await.unwrap();
    assert!(matches!(
        engine.service.get_reservation(r.id).await,
        Err(ReservationError::ReservationNotFound(_))
    ));
}

#[tokio::test]
async fn test_update_is_judged_on_the_original_slot() {
    let engine = TestEngine::new().await;
    let r = engine.book(ALICE, dinner(4, "indoor")).await;

    engine.clock.set(r.date_time() - Duration::hours(2));
    let next_month = ReservationRequest::new(
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        hm(20, 0),
        4,
        "indoor",
    );
    let err = engine
        .service
        .update_reservation(r.id, next_month)
        .await
        .unwrap_err();
    match err {
        ReservationError::LateChange { deadline } => {
            assert_eq!(deadline, r.date_time() - Duration::hours(24));
        }
        other => panic!("expected LateChange, got {other:?}"),
    }
    assert_eq!(engine.service.get_reservation(r.id).await.unwrap(), r);
}

#[tokio::test]
async fn test_change_allowed_exactly_at_deadline() {
    let engine = TestEngine::new().await;
    let r = engine.book(ALICE, dinner(4, "indoor")).await;

    engine.clock.set(r.date_time() - Duration::hours(24));
    let updated = engine
        .service
        .update_reservation(r.id, dinner(6, "indoor"))
        .await
        .unwrap();
    assert_eq!(updated.party_size, 6);
}

#[tokio::test]
async fn test_configured_notice_period() {
    let config = ReservationConfig {
        advance_notice_hours: 48,
        ..ReservationConfig::default()
    };
    let engine = TestEngine::with_config(config).await;
    let r = engine.book(ALICE, dinner(4, "indoor")).await;

    engine.clock.set(r.date_time() - Duration::hours(30));
    assert!(matches!(
        engine.service.delete_reservation(r.id).await,
        Err(ReservationError::LateCancellation { .. })
    ));
}

#[tokio::test]
async fn test_creation_must_be_strictly_in_the_future() {
    let engine = TestEngine::new().await;
    engine.clock.set(dec1().and_time(hm(20, 0)));

    let err = engine
        .service
        .create_reservation(ALICE, dinner(2, "indoor"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidDate { .. }));

    let yesterday = ReservationRequest::new(dec1() - Duration::days(1), hm(20, 0), 2, "indoor");
    let err = engine
        .service
        .create_reservation(ALICE, yesterday)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidDate { .. }));

    let later_tonight = ReservationRequest::new(dec1(), hm(20, 1), 2, "indoor");
    engine.book(ALICE, later_tonight).await;
}

#[tokio::test]
async fn test_service_window_boundaries() {
    let engine = TestEngine::new().await;

    let err = engine
        .service
        .create_reservation(ALICE, ReservationRequest::new(dec1(), hm(15, 0), 2, "indoor"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidTime { .. }));

    for time in [hm(12, 0), hm(14, 59), hm(19, 0), hm(23, 0)] {
        engine
            .book(ALICE, ReservationRequest::new(dec1(), time, 2, "indoor"))
            .await;
    }

    for time in [hm(11, 59), hm(18, 59), hm(23, 1)] {
        let err = engine
            .service
            .create_reservation(ALICE, ReservationRequest::new(dec1(), time, 2, "indoor"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::InvalidTime { .. }));
    }
}
