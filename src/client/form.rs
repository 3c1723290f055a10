//! Registration form controller.
//!
//! The form is an explicit state machine:
//!
//! ```text
//! Idle --begin--> Submitting --complete(201)--> Done
//!   ^                 |
//!   +--complete(*)----+
//! ```
//!
//! Only `Idle` accepts a submission, which gives one in-flight request per
//! form. Every exit from `Submitting` re-enables the submit control except
//! a successful registration, which holds the form until the redirect.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use super::transport::{RegistrationTransport, TransportError};
use crate::config::{LOGIN_PAGE_PATH, REDIRECT_DELAY_MS};

pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_CREATED: &str = "Account created successfully! Redirecting to login...";
pub const MSG_USERNAME_TAKEN: &str = "Username already exists. Please choose another.";
pub const MSG_INVALID_INPUT: &str = "Invalid input. Please check your username and password.";
pub const MSG_FAILED: &str = "Registration failed. Please try again.";
pub const MSG_NETWORK: &str = "Network error. Please check your connection and try again.";

pub const LABEL_IDLE: &str = "Create Account";
pub const LABEL_BUSY: &str = "Creating Account...";

/// Lifecycle of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Done,
}

/// Visual category of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Success,
}

/// The single message currently shown on the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub text: String,
    pub kind: MessageKind,
}

/// Pending navigation after a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub after: Duration,
}

/// Raw field values as entered by the user
#[derive(Clone, Default)]
pub struct FormInput {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Credentials cleared for sending
#[derive(Clone, PartialEq, Eq)]
pub struct Submission {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Why a submit attempt never reached the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Password and confirmation differ
    PasswordMismatch,
    /// A request is already in flight
    InFlight,
    /// The account was created; the form is waiting to redirect
    Completed,
}

/// Something that can move the user to another page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Client-side controller for the registration form.
pub struct RegistrationForm {
    transport: Arc<dyn RegistrationTransport>,
    state: FormState,
    message: Option<FormMessage>,
    redirect: Option<Redirect>,
}

impl RegistrationForm {
    pub fn new(transport: Arc<dyn RegistrationTransport>) -> Self {
        Self {
            transport,
            state: FormState::Idle,
            message: None,
            redirect: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// The message currently visible, if any
    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// Navigation scheduled by a successful registration
    pub fn redirect(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    pub fn submit_enabled(&self) -> bool {
        self.state == FormState::Idle
    }

    pub fn submit_label(&self) -> &'static str {
        match self.state {
            FormState::Idle => LABEL_IDLE,
            FormState::Submitting | FormState::Done => LABEL_BUSY,
        }
    }

    /// Leave `Idle` for `Submitting` if the input passes local checks.
    pub fn begin(&mut self, input: FormInput) -> Result<Submission, SubmitRejected> {
        match self.state {
            FormState::Submitting => return Err(SubmitRejected::InFlight),
            FormState::Done => return Err(SubmitRejected::Completed),
            FormState::Idle => {}
        }

        self.message = None;

        if input.password != input.confirm_password {
            self.show(MSG_PASSWORD_MISMATCH, MessageKind::Error);
            return Err(SubmitRejected::PasswordMismatch);
        }

        self.state = FormState::Submitting;
        Ok(Submission {
            username: input.username,
            password: input.password,
        })
    }

    /// Resolve the in-flight submission from the endpoint's answer.
    pub fn complete(&mut self, response: Result<StatusCode, TransportError>) {
        if self.state != FormState::Submitting {
            tracing::warn!(state = ?self.state, "Ignoring response with no submission in flight");
            return;
        }

        let status = match response {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = %e, "Registration request did not complete");
                return self.fail(MSG_NETWORK);
            }
        };

        match status {
            StatusCode::CREATED => {
                self.show(MSG_CREATED, MessageKind::Success);
                self.redirect = Some(Redirect {
                    location: LOGIN_PAGE_PATH.to_string(),
                    after: Duration::from_millis(REDIRECT_DELAY_MS),
                });
                self.state = FormState::Done;
            }
            StatusCode::CONFLICT => self.fail(MSG_USERNAME_TAKEN),
            StatusCode::BAD_REQUEST => self.fail(MSG_INVALID_INPUT),
            _ => self.fail(MSG_FAILED),
        }
    }

    /// Run a full submission: local checks, request, and resolution.
    pub async fn submit(&mut self, input: FormInput) -> Result<FormState, SubmitRejected> {
        let submission = self.begin(input)?;
        let response = self
            .transport
            .post_registration(&submission.username, &submission.password)
            .await;
        self.complete(response);
        Ok(self.state)
    }

    /// Wait out the redirect delay, then navigate. No-op unless `Done`.
    pub async fn follow_redirect(&self, navigator: &dyn Navigator) {
        if let Some(redirect) = &self.redirect {
            tokio::time::sleep(redirect.after).await;
            navigator.navigate(&redirect.location);
        }
    }

    fn fail(&mut self, text: &str) {
        self.show(text, MessageKind::Error);
        self.state = FormState::Idle;
    }

    fn show(&mut self, text: &str, kind: MessageKind) {
        self.message = Some(FormMessage {
            text: text.to_string(),
            kind,
        });
    }
}
