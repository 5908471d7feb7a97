//! Request credentials.

use reqwest::RequestBuilder;
use reqwest::header::COOKIE;

/// Cookie name the control plane accepts as proof of an internal caller.
pub const SECRET_COOKIE_NAME: &str = "secret";

/// Something that can authenticate an outgoing request.
pub trait Credential: Send + Sync {
  /// Attach the credential to the request.
  fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Authenticates by sending a single cookie.
#[derive(Clone)]
pub struct CookieCredential {
  name: String,
  value: String,
}

impl CookieCredential {
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: value.into(),
    }
  }

  /// Credential carrying the job service's trust secret.
  pub fn secret(value: impl Into<String>) -> Self {
    Self::new(SECRET_COOKIE_NAME, value)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The `Cookie` header value, `name=value`.
  pub fn header_value(&self) -> String {
    format!("{}={}", self.name, self.value)
  }
}

// Keep the secret out of debug output.
impl std::fmt::Debug for CookieCredential {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CookieCredential")
      .field("name", &self.name)
      .field("value", &"<redacted>")
      .finish()
  }
}

impl Credential for CookieCredential {
  fn apply(&self, request: RequestBuilder) -> RequestBuilder {
    request.header(COOKIE, self.header_value())
  }
}
