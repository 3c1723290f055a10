//! Registration workflow tests against the in-memory repository.

mod common;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;

use registration_service::domain::{Argon2Hasher, CredentialHasher, CredentialPolicy, RegistrationRequest};
use registration_service::config::PolicyConfig;
use registration_service::infra::{AccountRepository, InMemoryAccountStore};
use registration_service::services::{Registrar, RegistrationOutcome, RegistrationService};

use common::{registrar, StalledCreateRepository, REPOSITORY_TIMEOUT};

#[tokio::test]
async fn test_register_then_exists() {
    let store = InMemoryAccountStore::new();
    let service = registrar(Arc::new(store.clone()));

    let outcome = service
        .register(RegistrationRequest::new("alice", "Str0ngPass!"))
        .await;

    match outcome {
        RegistrationOutcome::Success(account) => assert_eq!(account.username, "alice"),
        other => panic!("expected success, got {:?}", other),
    }
    assert!(store.exists("alice").await.unwrap());
}

#[tokio::test]
async fn test_repeat_registration_conflicts_and_keeps_hash() {
    let store = InMemoryAccountStore::new();
    let service = registrar(Arc::new(store.clone()));
    let request = RegistrationRequest::new("alice", "Str0ngPass!");

    assert!(service.register(request.clone()).await.is_success());
    let original = store.find_by_username("alice").await.unwrap().unwrap();

    assert_eq!(service.register(request.clone()).await, RegistrationOutcome::Conflict);
    assert_eq!(
        service
            .register(RegistrationRequest::new("alice", "An0therPass!"))
            .await,
        RegistrationOutcome::Conflict
    );

    let stored = store.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored.password_hash, original.password_hash);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_invalid_input_creates_nothing() {
    let store = InMemoryAccountStore::new();
    let service = registrar(Arc::new(store.clone()));

    let outcome = service.register(RegistrationRequest::new("", "x")).await;

    assert!(matches!(outcome, RegistrationOutcome::BadRequest(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_policy_reasons_reach_the_caller() {
    let service = registrar(Arc::new(InMemoryAccountStore::new()));

    let outcome = service
        .register(RegistrationRequest::new("alice", "short"))
        .await;

    assert_eq!(
        outcome,
        RegistrationOutcome::BadRequest("Password must be at least 8 characters".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_yield_one_success() {
    const ATTEMPTS: usize = 16;

    let store = InMemoryAccountStore::new();
    let service = Arc::new(registrar(Arc::new(store.clone())));

    let handles = (0..ATTEMPTS).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .register(RegistrationRequest::new("alice", format!("Str0ngPass!{}", i)))
                .await
        })
    });

    let outcomes: Vec<RegistrationOutcome> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    let conflicts = outcomes
        .iter()
        .filter(|o| **o == RegistrationOutcome::Conflict)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, ATTEMPTS - 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_repository_timeout_is_internal_error() {
    let inner = InMemoryAccountStore::new();
    let service = registrar(Arc::new(StalledCreateRepository {
        inner: inner.clone(),
    }));

    let started = tokio::time::Instant::now();
    let outcome = service
        .register(RegistrationRequest::new("alice", "Str0ngPass!"))
        .await;

    assert_eq!(outcome, RegistrationOutcome::InternalError);
    assert!(started.elapsed() >= REPOSITORY_TIMEOUT);
    assert!(inner.is_empty().await);
}

#[tokio::test]
async fn test_stored_secret_verifies_with_argon2() {
    let store = InMemoryAccountStore::new();
    let hasher = Arc::new(Argon2Hasher::new());
    let service = Registrar::new(
        Arc::new(store.clone()),
        hasher.clone(),
        CredentialPolicy::new(PolicyConfig::default()).unwrap(),
        REPOSITORY_TIMEOUT,
    );

    assert!(service
        .register(RegistrationRequest::new("alice", "Str0ngPass!"))
        .await
        .is_success());

    let stored = store.find_by_username("alice").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "Str0ngPass!");
    assert!(hasher.verify("Str0ngPass!", &stored.password_hash));
    assert!(!hasher.verify("WrongPass!1", &stored.password_hash));
}

#[tokio::test(flavor = "current_thread")]
async fn test_hashing_does_not_block_other_tasks() {
    let service = Registrar::new(
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(Argon2Hasher::new()),
        CredentialPolicy::new(PolicyConfig::default()).unwrap(),
        REPOSITORY_TIMEOUT,
    );

    let ticks = Arc::new(AtomicU64::new(0));
    let finished = Arc::new(AtomicBool::new(false));
    let ticker = tokio::spawn({
        let ticks = ticks.clone();
        let finished = finished.clone();
        async move {
            while !finished.load(Ordering::SeqCst) {
                ticks.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        }
    });

    // Single worker thread: the ticker only runs if registration yields while hashing
    let outcome = service
        .register(RegistrationRequest::new("alice", "Str0ngPass!"))
        .await;
    finished.store(true, Ordering::SeqCst);
    ticker.await.unwrap();

    assert!(outcome.is_success());
    assert!(ticks.load(Ordering::SeqCst) > 0);
}
