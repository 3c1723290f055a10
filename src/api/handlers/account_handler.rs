//! Account registration handler.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::USERS_PATH;
use crate::domain::{AccountResponse, RegistrationRequest};
use crate::errors::error_response;
use crate::services::RegistrationOutcome;

/// Account registration request
///
/// Fields are optional at the serde level so a missing key surfaces as a
/// validation message rather than a deserialization error.
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Desired username
    #[validate(required(message = "Username is required"))]
    #[schema(example = "alice", value_type = String)]
    pub username: Option<String>,
    /// Plaintext password, hashed before storage
    #[validate(required(message = "Password is required"))]
    #[schema(example = "Str0ngPass!", value_type = String)]
    pub password: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(payload: RegisterRequest) -> Self {
        RegistrationRequest::new(
            payload.username.unwrap_or_default(),
            payload.password.unwrap_or_default(),
        )
    }
}

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse,
            headers(("Location" = String, description = "URI of the new account"))),
        (status = 400, description = "Malformed request or credential policy violation"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Storage or hashing failure")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> RegistrationOutcome {
    state.registration_service.register(payload.into()).await
}

impl IntoResponse for RegistrationOutcome {
    fn into_response(self) -> Response {
        match self {
            RegistrationOutcome::Success(account) => {
                let location = format!("{}/{}", USERS_PATH, account.username);
                let mut response =
                    (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response();
                if let Ok(value) = HeaderValue::try_from(location) {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                response
            }
            RegistrationOutcome::BadRequest(reason) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", reason)
            }
            RegistrationOutcome::Conflict => error_response(
                StatusCode::CONFLICT,
                "CONFLICT",
                "Username already exists",
            ),
            RegistrationOutcome::InternalError => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred",
            ),
        }
    }
}
