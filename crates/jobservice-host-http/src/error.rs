//! HTTP capability errors.

/// Errors raised by [`crate::TriggerClient`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
  /// The underlying HTTP client could not be built.
  #[error("failed to build http client: {0}")]
  Build(#[source] reqwest::Error),

  /// The target URL is not an absolute http(s) URL.
  #[error("invalid url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  /// The request could not be sent or no response arrived.
  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The remote answered with a non-success status.
  #[error("http error: code {status}, message {message}")]
  Status { status: u16, message: String },
}

impl HttpError {
  pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidUrl {
      url: url.into(),
      message: message.into(),
    }
  }

  /// Status code returned by the remote, if the failure was a protocol one.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}
