//! Account repository - the unique-create capability.
//!
//! The registration workflow relies on one storage guarantee: `create`
//! is atomic with respect to the username uniqueness check. Concurrent
//! creates for the same username produce exactly one account, and every
//! other caller gets a conflict. Implementations must provide this from
//! the store itself, never from application-side locking.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    Set, SqlErr, Statement, TransactionTrait,
};

use super::entities::account::{ActiveModel, Entity as AccountEntity};
use crate::domain::Account;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Entity name reported on uniqueness conflicts
pub(crate) const ACCOUNT_CONFLICT_ENTITY: &str = "Username";

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Check whether an account with this username exists
    async fn exists(&self, username: &str) -> AppResult<bool>;

    /// Create an account.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if the username is taken, including
    /// when a concurrent create won the race.
    async fn create(&self, username: String, password_hash: String) -> AppResult<Account>;

    /// Find an account by username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;
}

/// SeaORM-backed account repository.
///
/// Uniqueness comes from the primary key on `accounts.username`.
///
/// Inserts run in their own transaction. With a statement timeout set,
/// Postgres cancels a slow insert and the transaction rolls back, so an
/// insert that outlives the bound never commits. SQLite has no
/// server-side statement timeout; there the bound is only the caller's.
pub struct AccountStore {
    db: DatabaseConnection,
    statement_timeout: Option<Duration>,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            statement_timeout: None,
        }
    }

    /// Bound every insert inside the database.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }
}

/// `SET LOCAL` for backends that support a per-transaction statement timeout.
pub(crate) fn statement_timeout(backend: DbBackend, timeout: Duration) -> Option<Statement> {
    match backend {
        DbBackend::Postgres => Some(Statement::from_string(
            backend,
            format!("SET LOCAL statement_timeout = {}", timeout.as_millis().max(1)),
        )),
        _ => None,
    }
}

fn map_insert_err(e: sea_orm::DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(ACCOUNT_CONFLICT_ENTITY),
        _ => AppError::from(e),
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn exists(&self, username: &str) -> AppResult<bool> {
        let count = AccountEntity::find_by_id(username.to_string())
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<Account> {
        let account = Account::new(username, password_hash);
        let active_model = ActiveModel {
            username: Set(account.username.clone()),
            password_hash: Set(account.password_hash.clone()),
            created_at: Set(account.created_at),
        };

        // Dropping the transaction before commit rolls the insert back
        let txn = self.db.begin().await?;
        if let Some(timeout) = self.statement_timeout {
            if let Some(stmt) = statement_timeout(txn.get_database_backend(), timeout) {
                txn.execute(stmt).await?;
            }
        }

        let model = active_model.insert(&txn).await.map_err(map_insert_err)?;
        txn.commit().await?;

        Ok(Account::from(model))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(username.to_string())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }
}
