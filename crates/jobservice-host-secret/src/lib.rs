//! Jobservice Host Secret
//!
//! Source of the trust secret the job service presents to the control plane
//! when it calls in as an internal client. The secret may rotate, so callers
//! ask for the current value every time they build a credential.

use async_trait::async_trait;

/// Environment variable that holds the job service's trust secret.
pub const DEFAULT_SECRET_ENV: &str = "JOBSERVICE_SECRET";

/// Errors raised while reading the trust secret.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
  /// No secret is configured.
  #[error("trust secret is not configured ({source_name})")]
  Missing { source_name: String },

  /// The backing store failed.
  #[error("failed to read trust secret: {message}")]
  Provider { message: String },
}

/// Provides the current trust secret.
#[async_trait]
pub trait SecretProvider: Send + Sync {
  /// Return the secret as it is right now.
  async fn current_secret(&self) -> Result<String, SecretError>;
}

/// Reads the secret from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
  var: String,
}

impl EnvSecretProvider {
  pub fn new(var: impl Into<String>) -> Self {
    Self { var: var.into() }
  }

  pub fn var(&self) -> &str {
    &self.var
  }
}

impl Default for EnvSecretProvider {
  fn default() -> Self {
    Self::new(DEFAULT_SECRET_ENV)
  }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
  async fn current_secret(&self) -> Result<String, SecretError> {
    match std::env::var(&self.var) {
      Ok(value) if !value.is_empty() => Ok(value),
      Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretError::Missing {
        source_name: format!("env {}", self.var),
      }),
      Err(e) => Err(SecretError::Provider {
        message: format!("failed to read env var {}: {e}", self.var),
      }),
    }
  }
}

/// Fixed secret, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticSecretProvider {
  secret: String,
}

impl StaticSecretProvider {
  pub fn new(secret: impl Into<String>) -> Self {
    Self {
      secret: secret.into(),
    }
  }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
  async fn current_secret(&self) -> Result<String, SecretError> {
    if self.secret.is_empty() {
      return Err(SecretError::Missing {
        source_name: "static".to_string(),
      });
    }
    Ok(self.secret.clone())
  }
}
