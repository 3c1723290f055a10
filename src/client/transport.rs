//! Transport used by the registration form to reach the endpoint.
//!
//! The only implementation here is [`RouterTransport`], which calls the
//! axum router in process; the crate carries no HTTP client. With it,
//! [`TransportError::Network`] only reports request-building or router
//! failures. A transport over a real socket would map connection errors
//! to the same variant.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde::Serialize;
use thiserror::Error;
use tower::ServiceExt;

use crate::config::USERS_PATH;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Failure to get any HTTP response at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
}

/// Wire payload. The confirmation field is deliberately absent.
#[derive(Debug, Serialize)]
struct RegistrationPayload<'a> {
    username: &'a str,
    password: &'a str,
}

/// Sends registration requests and reports the response status.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RegistrationTransport: Send + Sync {
    /// POST the credentials to the registration endpoint.
    async fn post_registration(
        &self,
        username: &str,
        password: &str,
    ) -> Result<StatusCode, TransportError>;
}

/// Transport that dispatches straight into an axum router.
#[derive(Clone)]
pub struct RouterTransport {
    router: Router,
}

impl RouterTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl RegistrationTransport for RouterTransport {
    async fn post_registration(
        &self,
        username: &str,
        password: &str,
    ) -> Result<StatusCode, TransportError> {
        let body = serde_json::to_vec(&RegistrationPayload { username, password })
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/register", USERS_PATH))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(response.status())
    }
}
