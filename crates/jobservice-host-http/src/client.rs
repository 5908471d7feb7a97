//! Authenticated client for the control-plane API.

use std::sync::Arc;

use reqwest::{Client, Response};
use serde::Serialize;
use url::Url;

use crate::credential::Credential;
use crate::error::HttpError;
use crate::transport::TransportPolicy;

/// Path, relative to the control-plane base URL, that starts a replication.
pub const REPLICATIONS_PATH: &str = "/api/replications";

/// Most bytes of an error response body kept in [`HttpError::Status`].
pub const MAX_ERROR_BODY: usize = 4096;

/// Body of a replication-start request.
#[derive(Debug, Serialize)]
struct ReplicationRequest {
  policy_id: i64,
}

/// Resolve the replication endpoint for a control-plane base URL.
///
/// The path is appended to the base as-is (a trailing `/` on the base is
/// dropped), so a base that carries a path prefix keeps it.
pub fn replication_target(base_url: &str) -> Result<Url, HttpError> {
  let target = format!("{}{}", base_url.trim_end_matches('/'), REPLICATIONS_PATH);
  let url = Url::parse(&target).map_err(|e| HttpError::invalid_url(base_url, e.to_string()))?;

  match url.scheme() {
    "http" | "https" => Ok(url),
    other => Err(HttpError::invalid_url(
      base_url,
      format!("unsupported scheme '{}'", other),
    )),
  }
}

/// HTTP client that authenticates every request with a bound credential.
pub struct TriggerClient {
  http: Client,
  credential: Arc<dyn Credential>,
}

impl TriggerClient {
  /// Build a client for the given transport policy and credential.
  pub fn new(
    policy: TransportPolicy,
    credential: impl Credential + 'static,
  ) -> Result<Self, HttpError> {
    Ok(Self::with_client(
      policy.build_client()?,
      Arc::new(credential),
    ))
  }

  /// Wrap an existing (possibly shared) reqwest client.
  pub fn with_client(http: Client, credential: Arc<dyn Credential>) -> Self {
    Self { http, credential }
  }

  /// Ask the control plane at `base_url` to start replicating `policy_id`.
  ///
  /// Returns once the remote accepted the request. The response body is not
  /// read and completion is not awaited.
  pub async fn trigger_replication(&self, base_url: &str, policy_id: i64) -> Result<(), HttpError> {
    let target = replication_target(base_url)?;
    self.post(target, &ReplicationRequest { policy_id }).await
  }

  /// POST `body` as JSON. Any 2xx is success; any other status is an error
  /// carrying the start of the response text.
  pub async fn post<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<(), HttpError> {
    let request = self.credential.apply(self.http.post(url.clone()).json(body));

    let response = request.send().await.map_err(|source| HttpError::Request {
      url: url.to_string(),
      source,
    })?;

    let status = response.status();
    if status.is_success() {
      return Ok(());
    }

    Err(HttpError::Status {
      status: status.as_u16(),
      message: read_error_body(response).await,
    })
  }
}

/// Read at most [`MAX_ERROR_BODY`] bytes of the body, marking a cut with `...`.
/// A body that fails midway keeps what arrived.
async fn read_error_body(mut response: Response) -> String {
  let mut body = Vec::new();
  let mut truncated = false;

  while let Ok(Some(chunk)) = response.chunk().await {
    let room = MAX_ERROR_BODY - body.len();
    if chunk.len() > room {
      body.extend_from_slice(&chunk[..room]);
      truncated = true;
      break;
    }
    body.extend_from_slice(&chunk);
  }

  let mut message = String::from_utf8_lossy(&body).into_owned();
  if truncated {
    message.push_str("...");
  }
  message
}
