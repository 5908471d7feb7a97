//! Transport policy for outbound calls.

use std::time::Duration;

use crate::error::HttpError;

/// How the HTTP transport reaches the control plane.
///
/// Proxy settings come from the environment (`HTTP_PROXY`, `HTTPS_PROXY`,
/// `NO_PROXY`), which reqwest reads by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportPolicy {
  /// Skip TLS certificate verification.
  pub insecure: bool,
  /// Overall request timeout. `None` leaves reqwest's default (no timeout).
  pub timeout: Option<Duration>,
}

impl TransportPolicy {
  pub fn new(insecure: bool) -> Self {
    Self {
      insecure,
      timeout: None,
    }
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  /// Whether the transport accepts certificates it cannot verify.
  pub fn accepts_invalid_certs(&self) -> bool {
    self.insecure
  }

  /// Build a reqwest client honouring this policy.
  pub fn build_client(&self) -> Result<reqwest::Client, HttpError> {
    let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(self.insecure);
    if let Some(timeout) = self.timeout {
      builder = builder.timeout(timeout);
    }
    builder.build().map_err(HttpError::Build)
  }
}
