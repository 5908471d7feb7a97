use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
  pub method: Method,
  pub path: String,
  pub cookie: Option<String>,
  pub content_type: Option<String>,
  pub body: serde_json::Value,
}

struct StubState {
  status: StatusCode,
  message: String,
  requests: Mutex<Vec<RecordedRequest>>,
}

/// Records every request and answers with a fixed status and body.
pub struct StubControlPlane {
  pub base_url: String,
  state: Arc<StubState>,
  handle: tokio::task::JoinHandle<()>,
}

impl StubControlPlane {
  pub async fn spawn(status: StatusCode, message: impl Into<String>) -> Self {
    let state = Arc::new(StubState {
      status,
      message: message.into(),
      requests: Mutex::new(Vec::new()),
    });

    let app = Router::new().fallback(record).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has no local addr");
    let base_url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
      let _ = axum::serve(listener, app).await;
    });

    Self {
      base_url,
      state,
      handle,
    }
  }

  pub fn requests(&self) -> Vec<RecordedRequest> {
    match self.state.requests.lock() {
      Ok(requests) => requests.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }
}

impl Drop for StubControlPlane {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

async fn record(
  State(state): State<Arc<StubState>>,
  method: Method,
  uri: Uri,
  headers: HeaderMap,
  body: String,
) -> (StatusCode, String) {
  let header_str = |name: header::HeaderName| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string)
  };

  let recorded = RecordedRequest {
    method,
    path: uri.path().to_string(),
    cookie: header_str(header::COOKIE),
    content_type: header_str(header::CONTENT_TYPE),
    body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
  };
  match state.requests.lock() {
    Ok(mut requests) => requests.push(recorded),
    Err(poisoned) => poisoned.into_inner().push(recorded),
  }

  (state.status, state.message.clone())
}
