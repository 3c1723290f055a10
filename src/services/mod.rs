//! Service layer - Application use cases
//!
//! Services orchestrate domain logic and infrastructure behind traits
//! so handlers depend on capabilities, not implementations.

pub mod registration_service;

pub use registration_service::{Registrar, RegistrationOutcome, RegistrationService};
