//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::RegistrationService;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registration workflow
    pub registration_service: Arc<dyn RegistrationService>,
    /// Database connection, absent when running on the in-memory store
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state backed by a database.
    pub fn new(registration_service: Arc<dyn RegistrationService>, database: Arc<Database>) -> Self {
        Self {
            registration_service,
            database: Some(database),
        }
    }

    /// Create application state with no database behind it.
    pub fn without_database(registration_service: Arc<dyn RegistrationService>) -> Self {
        Self {
            registration_service,
            database: None,
        }
    }
}
