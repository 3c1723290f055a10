//! Registration service - creates accounts from untrusted input.
//!
//! Per request the workflow moves through `Received` (normalize and
//! validate), `Validated` (uniqueness fast path, hash, unique-create) and
//! `Created`. Each step can end the request with a terminal
//! [`RegistrationOutcome`]. The service holds no per-request state, so a
//! single instance is shared across all handlers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::config::{Config, CREATE_TIMEOUT_GRACE_MS};
use crate::domain::{
    Account, Argon2Hasher, CredentialHasher, CredentialPolicy, RegistrationRequest,
    ValidationResult,
};
use crate::errors::{AppError, AppResult};
use crate::infra::AccountRepository;

const CREATE_TIMEOUT_GRACE: Duration = Duration::from_millis(CREATE_TIMEOUT_GRACE_MS);

/// Terminal result of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Account created
    Success(Account),
    /// Input rejected by the credential policy
    BadRequest(String),
    /// Username already taken
    Conflict,
    /// Storage, hashing, or timeout failure
    InternalError,
}

impl RegistrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RegistrationOutcome::Success(_))
    }
}

impl From<AppResult<Account>> for RegistrationOutcome {
    fn from(result: AppResult<Account>) -> Self {
        match result {
            Ok(account) => RegistrationOutcome::Success(account),
            Err(AppError::Validation(reason)) | Err(AppError::BadRequest(reason)) => {
                tracing::debug!(%reason, "Registration rejected by policy");
                RegistrationOutcome::BadRequest(reason)
            }
            Err(AppError::Conflict(_)) => RegistrationOutcome::Conflict,
            Err(e) => {
                tracing::error!(error = ?e, "Registration failed");
                RegistrationOutcome::InternalError
            }
        }
    }
}

/// Registration service trait for dependency injection.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Register a new account
    async fn register(&self, request: RegistrationRequest) -> RegistrationOutcome;
}

/// Concrete implementation of RegistrationService.
pub struct Registrar {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn CredentialHasher>,
    policy: CredentialPolicy,
    repository_timeout: Duration,
}

impl Registrar {
    /// Create new registration service instance
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn CredentialHasher>,
        policy: CredentialPolicy,
        repository_timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            hasher,
            policy,
            repository_timeout,
        }
    }

    /// Build the service from configuration with the Argon2 hasher.
    pub fn from_config(accounts: Arc<dyn AccountRepository>, config: &Config) -> AppResult<Self> {
        let policy = CredentialPolicy::new(config.policy.clone())?;
        Ok(Self::new(
            accounts,
            Arc::new(Argon2Hasher::new()),
            policy,
            config.repository_timeout(),
        ))
    }

    async fn try_register(&self, request: RegistrationRequest) -> AppResult<Account> {
        let username = self.policy.normalize_username(&request.username);

        if let ValidationResult::Invalid(reason) = self.policy.validate(&username, &request.password)
        {
            return Err(AppError::validation(reason));
        }

        // Skip hashing for obvious duplicates; create stays authoritative
        if self.bounded(self.accounts.exists(&username)).await? {
            tracing::info!(%username, "Registration conflict");
            return Err(AppError::conflict("Username"));
        }

        let password_hash = self.hash_off_runtime(request.password).await?;

        // The store bounds the insert itself; this outer limit only catches a hung connection
        let account = self
            .bounded_by(
                self.repository_timeout + CREATE_TIMEOUT_GRACE,
                self.accounts.create(username, password_hash),
            )
            .await
            .map_err(|e| {
                if let AppError::Conflict(_) = e {
                    tracing::info!("Registration lost a concurrent create");
                }
                e
            })?;

        tracing::info!(username = %account.username, "Account registered");
        Ok(account)
    }

    /// Hash on the blocking pool so Argon2 never occupies a runtime worker.
    async fn hash_off_runtime(&self, password: String) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
    }

    /// Run a repository call under the configured timeout.
    async fn bounded<T, F>(&self, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.bounded_by(self.repository_timeout, call).await
    }

    async fn bounded_by<T, F>(&self, limit: Duration, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        timeout(limit, call)
            .await
            .map_err(|_| AppError::Timeout("Account repository call"))?
    }
}

#[async_trait]
impl RegistrationService for Registrar {
    async fn register(&self, request: RegistrationRequest) -> RegistrationOutcome {
        RegistrationOutcome::from(self.try_register(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::domain::MockCredentialHasher;
    use crate::infra::MockAccountRepository;

    fn registrar(repo: MockAccountRepository, hasher: MockCredentialHasher) -> Registrar {
        Registrar::new(
            Arc::new(repo),
            Arc::new(hasher),
            CredentialPolicy::new(PolicyConfig::default()).unwrap(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_invalid_input_never_hashes_or_touches_storage() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists().never();
        repo.expect_create().never();
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().never();

        let outcome = registrar(repo, hasher)
            .register(RegistrationRequest::new("", "x"))
            .await;

        assert_eq!(
            outcome,
            RegistrationOutcome::BadRequest("Username is required".to_string())
        );
    }

    #[tokio::test]
    async fn test_existing_username_skips_hashing() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_create().never();
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().never();

        let outcome = registrar(repo, hasher)
            .register(RegistrationRequest::new("alice", "Str0ngPass!"))
            .await;

        assert_eq!(outcome, RegistrationOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_stores_hash_not_plaintext() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|username, hash| username == "alice" && hash == "hashed-secret")
            .returning(|username, hash| Ok(Account::new(username, hash)));
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .withf(|plain| plain == "Str0ngPass!")
            .returning(|_| Ok("hashed-secret".to_string()));

        let outcome = registrar(repo, hasher)
            .register(RegistrationRequest::new("alice", "Str0ngPass!"))
            .await;

        match outcome {
            RegistrationOutcome::Success(account) => {
                assert_eq!(account.username, "alice");
                assert_eq!(account.password_hash, "hashed-secret");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hash_failure_is_internal_error() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create().never();
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(AppError::internal("Password hash failed")));

        let outcome = registrar(repo, hasher)
            .register(RegistrationRequest::new("alice", "Str0ngPass!"))
            .await;

        assert_eq!(outcome, RegistrationOutcome::InternalError);
    }

    #[tokio::test]
    async fn test_create_race_lost_is_conflict() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create()
            .returning(|_, _| Err(AppError::conflict("Username")));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().returning(|_| Ok("hash".to_string()));

        let outcome = registrar(repo, hasher)
            .register(RegistrationRequest::new("alice", "Str0ngPass!"))
            .await;

        assert_eq!(outcome, RegistrationOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_repository_error_is_internal_error() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists()
            .returning(|_| Err(AppError::Database(sea_orm::DbErr::Custom("down".into()))));
        let hasher = MockCredentialHasher::new();

        let outcome = registrar(repo, hasher)
            .register(RegistrationRequest::new("alice", "Str0ngPass!"))
            .await;

        assert_eq!(outcome, RegistrationOutcome::InternalError);
    }

    #[tokio::test]
    async fn test_case_insensitive_policy_normalizes_before_storage() {
        let mut repo = MockAccountRepository::new();
        repo.expect_exists()
            .withf(|username| username == "alice")
            .returning(|_| Ok(false));
        repo.expect_create()
            .withf(|username, _| username == "alice")
            .returning(|username, hash| Ok(Account::new(username, hash)));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().returning(|_| Ok("hash".to_string()));

        let policy = CredentialPolicy::new(PolicyConfig {
            username_case_insensitive: true,
            ..PolicyConfig::default()
        })
        .unwrap();
        let service = Registrar::new(
            Arc::new(repo),
            Arc::new(hasher),
            policy,
            Duration::from_secs(5),
        );

        let outcome = service
            .register(RegistrationRequest::new("ALICE", "Str0ngPass!"))
            .await;

        assert!(outcome.is_success());
    }
}
