//! Infrastructure layer - External systems integration
//!
//! Database connection, migrations, and the account repositories.

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{AccountRepository, AccountStore, InMemoryAccountStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockAccountRepository;
