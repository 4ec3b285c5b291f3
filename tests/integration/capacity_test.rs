//! Integration tests for per-area capacity enforcement.

mod helpers;

use chrono::NaiveDate;

use helpers::{ADMIN, ALICE, BOB, TestEngine, dec1, dinner, hm};
use tablebook_core::config::ReservationConfig;
use tablebook_core::error::{AppError, ErrorKind};
use tablebook_core::types::UserId;
use tablebook_entity::reservation::Area;
use tablebook_entity::user::UserRole;
use tablebook_service::{RequestContext, ReservationError, ReservationRequest};

#[tokio::test]
async fn test_exact_fit_boundary() {
    let engine = TestEngine::new().await;
    for party in [20, 20, 18] {
        engine.book(ALICE, dinner(party, "INDOOR")).await;
    }
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 58);

    engine.book(BOB, dinner(2, "indoor")).await;
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 60);

    let err = engine
        .service
        .create_reservation(BOB, dinner(1, "indoor"))
        .await
        .unwrap_err();
    match err {
        ReservationError::CapacityExceeded {
            area,
            date,
            capacity,
        } => {
            assert_eq!(area, Area::Indoor);
            assert_eq!(date, dec1());
            assert_eq!(capacity, 60);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 60);
}

#[tokio::test]
async fn test_buckets_are_independent() {
    let engine = TestEngine::new().await;
    for _ in 0..3 {
        engine.book(ALICE, dinner(20, "indoor")).await;
    }
    for _ in 0..2 {
        engine.book(ALICE, dinner(20, "outdoor")).await;
    }

    let next_day = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
    engine
        .book(BOB, ReservationRequest::new(next_day, hm(12, 0), 20, "indoor"))
        .await;

    // Lunch and dinner share the same daily bucket.
    let err = engine
        .service
        .create_reservation(BOB, ReservationRequest::new(dec1(), hm(12, 0), 1, "indoor"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::CapacityExceeded { .. }));

    let report = engine.service.availability(dec1()).await.unwrap();
    assert!(report.iter().all(|o| o.remaining == 0));
    let report = engine.service.availability(next_day).await.unwrap();
    assert_eq!(report[0].remaining, 40);
    assert_eq!(report[1].remaining, 40);
}

#[tokio::test]
async fn test_update_delta_correctness() {
    // Allow larger parties so the ceiling, not the party limit, decides.
    let mut config = ReservationConfig::default();
    config.party_size.max = 30;
    let engine = TestEngine::with_config(config).await;

    engine.book(ALICE, dinner(20, "indoor")).await;
    engine.book(ALICE, dinner(20, "indoor")).await;
    let target = engine.book(BOB, dinner(10, "indoor")).await;
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 50);

    let updated = engine
        .service
        .update_reservation(target.id, dinner(15, "indoor"))
        .await
        .unwrap();
    assert_eq!(updated.party_size, 15);
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 55);

    engine
        .service
        .update_reservation(target.id, dinner(10, "indoor"))
        .await
        .unwrap();

    let err = engine
        .service
        .update_reservation(target.id, dinner(25, "indoor"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::CapacityExceeded { .. }));

    let unchanged = engine.service.get_reservation(target.id).await.unwrap();
    assert_eq!(unchanged.party_size, 10);
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 50);
}

#[tokio::test]
async fn test_moving_between_areas_frees_old_bucket() {
    let engine = TestEngine::new().await;
    engine.book(ALICE, dinner(20, "outdoor")).await;
    engine.book(ALICE, dinner(16, "outdoor")).await;
    let moving = engine.book(BOB, dinner(6, "indoor")).await;

    let err = engine
        .service
        .update_reservation(moving.id, dinner(6, "outdoor"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReservationError::CapacityExceeded {
            area: Area::Outdoor,
            capacity: 40,
            ..
        }
    ));
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 6);

    engine
        .service
        .update_reservation(moving.id, dinner(4, "outdoor"))
        .await
        .unwrap();
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 0);
    assert_eq!(engine.reserved(Area::Outdoor, dec1()).await, 40);
}

#[tokio::test]
async fn test_create_rejections_leave_no_trace() {
    let engine = TestEngine::new().await;

    let cases = [
        (dinner(0, "indoor"), ErrorKind::Validation),
        (dinner(4, "terrace"), ErrorKind::Validation),
        (
            ReservationRequest::new(dec1(), hm(16, 30), 4, "indoor"),
            ErrorKind::Validation,
        ),
    ];
    for (request, kind) in cases {
        let err = engine
            .service
            .create_reservation(ALICE, request)
            .await
            .unwrap_err();
        assert!(err.is_business_rule());
        assert_eq!(err.kind(), kind);
    }

    let err = engine
        .service
        .create_reservation(UserId(77), dinner(4, "indoor"))
        .await
        .unwrap_err();
    let app: AppError = err.into();
    assert_eq!(app.kind, ErrorKind::NotFound);

    assert!(engine.service.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_access_checks_before_engine() {
    let engine = TestEngine::new().await;
    let alices = engine.book(ALICE, dinner(4, "indoor")).await;

    let bob = RequestContext::new(BOB, UserRole::User);
    let admin = RequestContext::new(ADMIN, UserRole::Admin);

    assert!(matches!(
        engine.access.authorize(&bob, alices.id).await,
        Err(ReservationError::Forbidden { .. })
    ));
    assert!(engine.access.authorize(&admin, alices.id).await.is_ok());
    assert!(engine.access.authorize_owner_of(&admin, ALICE).is_ok());
}
