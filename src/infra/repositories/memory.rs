//! In-memory account repository.
//!
//! Accounts live only as long as the process. Used by tests and by
//! `serve --ephemeral` for local runs without a database.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::account_repository::{AccountRepository, ACCOUNT_CONFLICT_ENTITY};
use crate::domain::Account;
use crate::errors::{AppError, AppResult};

/// Account repository backed by a map.
///
/// The uniqueness check and the insert happen under one write guard.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountStore {
    async fn exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.accounts.read().await.contains_key(username))
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        match accounts.entry(username) {
            Entry::Occupied(_) => Err(AppError::conflict(ACCOUNT_CONFLICT_ENTITY)),
            Entry::Vacant(slot) => {
                let account = Account::new(slot.key().clone(), password_hash);
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_exists() {
        let store = InMemoryAccountStore::new();
        assert!(!store.exists("alice").await.unwrap());

        let account = store
            .create("alice".to_string(), "hash".to_string())
            .await
            .unwrap();

        assert_eq!(account.username, "alice");
        assert!(store.exists("alice").await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts_and_keeps_original() {
        let store = InMemoryAccountStore::new();
        store
            .create("alice".to_string(), "first".to_string())
            .await
            .unwrap();

        let result = store.create("alice".to_string(), "second".to_string()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "first");
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let store = InMemoryAccountStore::new();
        store
            .create("alice".to_string(), "hash".to_string())
            .await
            .unwrap();

        assert!(!store.exists("Alice").await.unwrap());
        assert!(store
            .create("Alice".to_string(), "hash".to_string())
            .await
            .is_ok());
    }
}
