//! Registration Service - account sign-up over HTTP
//!
//! Accepts a username and password, enforces a configurable credential
//! policy, hashes the password with Argon2id, and stores the account
//! behind a repository whose create operation is atomic with respect to
//! username uniqueness.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Accounts, credential policy, password hashing
//! - **services**: The registration workflow
//! - **infra**: Database, migrations, account repositories
//! - **api**: HTTP handlers, extractors, and routes
//! - **client**: Registration form controller
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Start without a database
//! cargo run -- serve --ephemeral
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, CredentialPolicy, RegistrationRequest};
pub use errors::{AppError, AppResult};
pub use services::{Registrar, RegistrationOutcome, RegistrationService};
