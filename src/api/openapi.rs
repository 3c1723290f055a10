//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::account_handler;
use crate::domain::AccountResponse;

/// OpenAPI documentation for the registration service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registration Service",
        version = "0.1.0",
        description = "Account registration with credential policy enforcement and Argon2 hashing",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(account_handler::register),
    components(schemas(account_handler::RegisterRequest, AccountResponse)),
    tags(
        (name = "Accounts", description = "Account registration")
    )
)]
pub struct ApiDoc;
