//! Client side of registration.
//!
//! The form controller that collects credentials, talks to the endpoint
//! through a [`RegistrationTransport`], and turns status codes into
//! user-facing messages.

pub mod form;
pub mod transport;

pub use form::{
    FormInput, FormMessage, FormState, MessageKind, Navigator, Redirect, RegistrationForm,
    SubmitRejected, Submission,
};
pub use transport::{RegistrationTransport, RouterTransport, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockRegistrationTransport;
