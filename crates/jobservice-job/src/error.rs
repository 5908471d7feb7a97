//! Job error types.

use jobservice_host_http::HttpError;
use jobservice_host_secret::SecretError;

/// Errors a job run can end with.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
  /// The execution context was cancelled before any work started.
  #[error("job canceled")]
  Canceled,

  /// Job parameters are missing or of the wrong type.
  #[error("invalid job parameters: {message}")]
  InvalidParams { message: String },

  /// The trust secret could not be resolved.
  #[error("failed to resolve credential: {0}")]
  Secret(#[from] SecretError),

  /// The outbound call failed; passed through unchanged.
  #[error(transparent)]
  Trigger(#[from] HttpError),

  /// `run` was called on a job instance that already ran.
  #[error("job instance already started (state: {state})")]
  AlreadyStarted { state: String },

  /// No job is registered under this kind.
  #[error("unknown job kind '{kind}'")]
  UnknownKind { kind: String },
}

impl JobError {
  pub fn invalid_params(message: impl Into<String>) -> Self {
    Self::InvalidParams {
      message: message.into(),
    }
  }
}
