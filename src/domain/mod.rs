//! Domain layer - Core business entities and logic
//!
//! Accounts, the credential policy, and password hashing. Nothing here
//! knows about HTTP or storage.

pub mod account;
pub mod password;
pub mod policy;

pub use account::{Account, AccountResponse, RegistrationRequest};
pub use password::{Argon2Hasher, CredentialHasher};
pub use policy::{CredentialPolicy, ValidationResult};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockCredentialHasher;
