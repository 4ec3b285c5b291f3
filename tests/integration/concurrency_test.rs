//! Integration tests for concurrent writers and the conflict retry.

mod helpers;

use std::sync::Arc;

use futures::future::join_all;

use helpers::{ALICE, BOB, FlakyStore, TestEngine, dec1, dinner};
use tablebook_core::config::ReservationConfig;
use tablebook_core::error::ErrorKind;
use tablebook_entity::reservation::Area;
use tablebook_service::ReservationError;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_fill_bucket_exactly() {
    let engine = TestEngine::new().await;

    let handles = (0..20).map(|i| {
        let service = engine.service.clone();
        let user = if i % 2 == 0 { ALICE } else { BOB };
        tokio::spawn(async move { service.create_reservation(user, dinner(5, "indoor")).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 12);
    for rejected in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(rejected, ReservationError::CapacityExceeded { .. }));
    }
    assert_eq!(engine.reserved(Area::Indoor, dec1()).await, 60);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_and_creates_never_overbook() {
    let engine = TestEngine::new().await;
    let mut existing = Vec::new();
    for _ in 0..4 {
        existing.push(engine.book(ALICE, dinner(8, "outdoor")).await);
    }

    let mut handles = Vec::new();
    for r in &existing {
        let service = engine.service.clone();
        let id = r.id;
        handles.push(tokio::spawn(async move {
            service
                .update_reservation(id, dinner(14, "outdoor"))
                .await
                .map(|_| ())
        }));
    }
    for _ in 0..6 {
        let service = engine.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_reservation(BOB, dinner(3, "outdoor"))
                .await
                .map(|_| ())
        }));
    }

    for joined in join_all(handles).await {
        match joined.expect("task panicked") {
            Ok(()) | Err(ReservationError::CapacityExceeded { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let reserved = engine.reserved(Area::Outdoor, dec1()).await;
    assert!(reserved <= 40, "outdoor holds {reserved} seats");

    let listed: i64 = engine
        .service
        .list_by_date(dec1())
        .await
        .unwrap()
        .iter()
        .map(|r| i64::from(r.party_size))
        .sum();
    assert_eq!(listed, reserved);
}

#[tokio::test]
async fn test_conflict_is_retried_once() {
    let store = Arc::new(FlakyStore::new(1));
    let engine = TestEngine::with_store(store.clone(), ReservationConfig::default()).await;

    let created = engine
        .service
        .create_reservation(ALICE, dinner(4, "indoor"))
        .await
        .unwrap();

    assert_eq!(store.begins(), 2);
    assert_eq!(engine.service.list_all().await.unwrap(), vec![created]);
}

#[tokio::test]
async fn test_persistent_conflict_surfaces_as_store_error() {
    let store = Arc::new(FlakyStore::new(2));
    let engine = TestEngine::with_store(store.clone(), ReservationConfig::default()).await;

    let err = engine
        .service
        .create_reservation(ALICE, dinner(4, "indoor"))
        .await
        .unwrap_err();

    assert!(!err.is_business_rule());
    assert_eq!(err.kind(), ErrorKind::TransactionConflict);
    assert_eq!(store.begins(), 2);
    assert!(engine.service.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_business_failures_are_not_retried() {
    let store = Arc::new(FlakyStore::new(0));
    let engine = TestEngine::with_store(store.clone(), ReservationConfig::default()).await;
    for _ in 0..2 {
        engine.book(ALICE, dinner(20, "outdoor")).await;
    }
    let before = store.begins();

    let err = engine
        .service
        .create_reservation(BOB, dinner(1, "outdoor"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::CapacityExceeded { .. }));
    assert_eq!(store.begins(), before + 1);
}

#[tokio::test]
async fn test_owner_removed_during_create_is_user_not_found() {
    let store = Arc::new(FlakyStore::with_owners_gone());
    let engine = TestEngine::with_store(store.clone(), ReservationConfig::default()).await;

    let err = engine
        .service
        .create_reservation(ALICE, dinner(4, "indoor"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::UserNotFound(user) if user == ALICE));
    assert!(err.is_business_rule());
    assert_eq!(store.begins(), 1);
    assert!(engine.service.list_all().await.unwrap().is_empty());
}
