//! Jobservice Host HTTP
//!
//! HTTP client capability for jobs that call back into the control plane.
//! A [`TriggerClient`] pairs a transport policy (TLS verification, timeout)
//! with a [`Credential`] that is attached to every outgoing request.

mod client;
mod credential;
mod error;
mod transport;

pub use client::{MAX_ERROR_BODY, REPLICATIONS_PATH, TriggerClient, replication_target};
pub use credential::{CookieCredential, Credential, SECRET_COOKIE_NAME};
pub use error::HttpError;
pub use transport::TransportPolicy;
