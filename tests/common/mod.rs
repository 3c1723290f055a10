//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use registration_service::api::{create_router, AppState};
use registration_service::config::PolicyConfig;
use registration_service::domain::{Account, CredentialHasher, CredentialPolicy};
use registration_service::errors::AppResult;
use registration_service::infra::{AccountRepository, InMemoryAccountStore};
use registration_service::services::Registrar;

pub const REPOSITORY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cheap deterministic stand-in for Argon2 so tests stay fast.
/// Every call yields a distinct secret, like a salted hash.
#[derive(Default)]
pub struct CountingHasher {
    calls: AtomicU64,
}

impl CredentialHasher for CountingHasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("test-hash:{}:{}", n, plaintext.len()))
    }

    fn verify(&self, _plaintext: &str, _secret: &str) -> bool {
        false
    }
}

/// Repository whose `create` never returns in time.
///
/// `exists` answers from the wrapped store so the request reaches `create`.
pub struct StalledCreateRepository {
    pub inner: InMemoryAccountStore,
}

#[async_trait]
impl AccountRepository for StalledCreateRepository {
    async fn exists(&self, username: &str) -> AppResult<bool> {
        self.inner.exists(username).await
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<Account> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        self.inner.create(username, password_hash).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        self.inner.find_by_username(username).await
    }
}

pub fn registrar(accounts: Arc<dyn AccountRepository>) -> Registrar {
    Registrar::new(
        accounts,
        Arc::new(CountingHasher::default()),
        CredentialPolicy::new(PolicyConfig::default()).unwrap(),
        REPOSITORY_TIMEOUT,
    )
}

pub fn app(accounts: Arc<dyn AccountRepository>) -> Router {
    create_router(AppState::without_database(Arc::new(registrar(accounts))))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn post_json(router: &Router, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
