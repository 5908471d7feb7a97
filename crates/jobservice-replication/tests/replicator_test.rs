//! Integration tests for the replication job against a stub control plane.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::{Method, StatusCode};
use jobservice_host_http::HttpError;
use jobservice_host_log::{LogLevel, MemoryLogger};
use jobservice_host_secret::{EnvSecretProvider, StaticSecretProvider};
use jobservice_job::{
  CancellationToken, Job, JobContext, JobError, JobExecutor, JobParams, JobRegistry, JobState,
};
use jobservice_replication::{REPLICATION_KIND, Replicator, register};
use jobservice_test_stub::{StubControlPlane, TlsStubControlPlane};
use serde_json::json;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

const SECRET: &str = "internal-trust-token";

fn replicator() -> Replicator {
  Replicator::new(Arc::new(StaticSecretProvider::new(SECRET)))
}

fn params(policy_id: i64, url: &str, insecure: bool) -> JobParams {
  json!({"policy_id": policy_id, "url": url, "insecure": insecure})
    .as_object()
    .cloned()
    .unwrap()
}

fn context(cancel: CancellationToken) -> (JobContext, MemoryLogger) {
  let logger = MemoryLogger::new();
  let ctx = JobContext::new("job-1", REPLICATION_KIND, cancel).with_logger(Arc::new(logger.clone()));
  (ctx, logger)
}

fn count_containing(logger: &MemoryLogger, level: LogLevel, needle: &str) -> usize {
  logger
    .entries()
    .iter()
    .filter(|entry| entry.level == level && entry.message.contains(needle))
    .count()
}

#[tokio::test]
async fn test_successful_trigger() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let (ctx, logger) = context(CancellationToken::new());
  let mut job = replicator();

  job
    .run(&ctx, &params(42, &stub.base_url, false))
    .await
    .expect("run should succeed");

  let requests = stub.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].method, Method::POST);
  assert_eq!(requests[0].path, "/api/replications");
  assert_eq!(requests[0].body, json!({"policy_id": 42}));
  assert_eq!(
    requests[0].cookie.as_deref(),
    Some("secret=internal-trust-token")
  );

  assert_eq!(job.state(), JobState::Succeeded);
  assert_eq!(count_containing(&logger, LogLevel::Info, "sent to"), 1);
  assert_eq!(count_containing(&logger, LogLevel::Info, "initialized"), 1);
  assert_eq!(logger.count(LogLevel::Error), 0);
}

#[tokio::test]
async fn test_server_error_fails_without_retry() {
  let stub = StubControlPlane::spawn(StatusCode::INTERNAL_SERVER_ERROR, "replication busy").await;
  let (ctx, logger) = context(CancellationToken::new());
  let mut job = replicator();

  let err = job
    .run(&ctx, &params(42, &stub.base_url, false))
    .await
    .unwrap_err();

  match &err {
    JobError::Trigger(HttpError::Status { status, message }) => {
      assert_eq!(*status, 500);
      assert_eq!(message, "replication busy");
    }
    other => panic!("expected trigger status error, got {:?}", other),
  }
  // Passed through unchanged.
  assert_eq!(err.to_string(), "http error: code 500, message replication busy");

  assert_eq!(stub.requests().len(), 1);
  assert_eq!(job.state(), JobState::Failed);
  assert_eq!(logger.count(LogLevel::Error), 1);
  assert_eq!(count_containing(&logger, LogLevel::Info, "sent to"), 0);
  assert!(!job.should_retry());
  assert_eq!(job.max_fails(), 0);
}

#[tokio::test]
async fn test_canceled_context_sends_nothing() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let cancel = CancellationToken::new();
  cancel.cancel();
  let (ctx, logger) = context(cancel);
  let mut job = replicator();

  let err = job
    .run(&ctx, &params(42, &stub.base_url, false))
    .await
    .unwrap_err();

  assert!(matches!(err, JobError::Canceled));
  assert!(stub.requests().is_empty());
  assert_eq!(job.state(), JobState::Canceled);
  assert_eq!(logger.count(LogLevel::Warning), 1);
  assert_eq!(logger.count(LogLevel::Error), 0);
}

#[tokio::test]
async fn test_canceled_wins_over_bad_params() {
  let cancel = CancellationToken::new();
  cancel.cancel();
  let (ctx, _logger) = context(cancel);
  let mut job = replicator();

  let err = job.run(&ctx, &JobParams::new()).await.unwrap_err();

  assert!(matches!(err, JobError::Canceled));
}

#[tokio::test]
async fn test_instance_is_single_use() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let (ctx, _logger) = context(CancellationToken::new());
  let mut job = replicator();
  let p = params(7, &stub.base_url, false);

  job.run(&ctx, &p).await.expect("first run should succeed");
  let err = job.run(&ctx, &p).await.unwrap_err();

  assert!(matches!(err, JobError::AlreadyStarted { .. }));
  assert_eq!(stub.requests().len(), 1);
  assert_eq!(job.state(), JobState::Succeeded);
}

#[tokio::test]
async fn test_malformed_params_fail_cleanly() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let (ctx, logger) = context(CancellationToken::new());
  let mut job = replicator();
  let bad = json!({"policy_id": "42", "url": stub.base_url, "insecure": false})
    .as_object()
    .cloned()
    .unwrap();

  assert!(matches!(
    job.validate(&bad),
    Err(JobError::InvalidParams { .. })
  ));

  let err = job.run(&ctx, &bad).await.unwrap_err();

  assert!(matches!(err, JobError::InvalidParams { .. }));
  assert!(stub.requests().is_empty());
  assert_eq!(job.state(), JobState::Failed);
  assert_eq!(logger.count(LogLevel::Error), 1);
}

#[tokio::test]
async fn test_validate_accepts_good_params() {
  let job = replicator();
  assert!(job.validate(&params(1, "https://ctrl.example", true)).is_ok());
  assert_eq!(job.state(), JobState::Created);
}

#[tokio::test]
async fn test_missing_secret_sends_nothing() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let (ctx, _logger) = context(CancellationToken::new());
  let mut job = Replicator::new(Arc::new(EnvSecretProvider::new(
    "JOBSERVICE_REPLICATION_TEST_UNSET_SECRET",
  )));

  let err = job
    .run(&ctx, &params(42, &stub.base_url, false))
    .await
    .unwrap_err();

  assert!(matches!(err, JobError::Secret(_)));
  assert!(stub.requests().is_empty());
  assert_eq!(job.state(), JobState::Failed);
}

#[tokio::test]
async fn test_insecure_run_accepts_self_signed_certificate() {
  let stub = TlsStubControlPlane::spawn().await;
  let (ctx, _logger) = context(CancellationToken::new());
  let mut job = replicator();

  job
    .run(&ctx, &params(3, &stub.base_url, true))
    .await
    .expect("run should succeed");

  assert_eq!(stub.served(), 1);
  assert_eq!(job.state(), JobState::Succeeded);
}

#[tokio::test]
async fn test_secure_run_rejects_self_signed_certificate() {
  let stub = TlsStubControlPlane::spawn().await;
  let (ctx, logger) = context(CancellationToken::new());
  let mut job = replicator();

  let err = job
    .run(&ctx, &params(3, &stub.base_url, false))
    .await
    .unwrap_err();

  assert!(matches!(err, JobError::Trigger(HttpError::Request { .. })));
  assert_eq!(stub.served(), 0);
  assert_eq!(job.state(), JobState::Failed);
  assert_eq!(logger.count(LogLevel::Error), 1);
}

#[tokio::test]
async fn test_retry_declaration_is_constant() {
  let stub = StubControlPlane::spawn(StatusCode::BAD_GATEWAY, "").await;
  let (ctx, _logger) = context(CancellationToken::new());
  let mut job = replicator();

  assert!(!job.should_retry());
  assert_eq!(job.max_fails(), 0);

  let _ = job.run(&ctx, &params(1, &stub.base_url, false)).await;

  assert!(!job.should_retry());
  assert_eq!(job.max_fails(), 0);
}

#[tokio::test]
async fn test_executor_runs_registered_job() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let mut registry = JobRegistry::new();
  register(
    &mut registry,
    Arc::new(StaticSecretProvider::new(SECRET)),
    None,
  );
  let executor = JobExecutor::new(Arc::new(registry));
  let (ctx, _logger) = context(CancellationToken::new());

  let report = executor
    .execute(REPLICATION_KIND, &ctx, &params(42, &stub.base_url, false))
    .await
    .expect("kind is registered");

  assert!(report.is_success());
  assert_eq!(report.state, JobState::Succeeded);
  assert!(!report.should_retry);
  assert_eq!(report.max_fails, 0);
  assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn test_executor_rejects_malformed_params_before_run() {
  let stub = StubControlPlane::spawn(StatusCode::OK, "").await;
  let mut registry = JobRegistry::new();
  register(
    &mut registry,
    Arc::new(StaticSecretProvider::new(SECRET)),
    None,
  );
  let executor = JobExecutor::new(Arc::new(registry));
  let (ctx, logger) = context(CancellationToken::new());
  let bad = json!({"url": stub.base_url, "insecure": false})
    .as_object()
    .cloned()
    .unwrap();

  let report = executor
    .execute(REPLICATION_KIND, &ctx, &bad)
    .await
    .expect("kind is registered");

  assert!(matches!(report.error, Some(JobError::InvalidParams { .. })));
  assert_eq!(report.state, JobState::Created);
  assert!(stub.requests().is_empty());
  assert!(logger.entries().is_empty());
}

/// Counts error-level tracing events.
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    if *event.metadata().level() == Level::ERROR {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }
}

#[tokio::test]
async fn test_trigger_failure_emits_one_error_event() {
  let errors = Arc::new(AtomicUsize::new(0));
  let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
  // Current-thread runtime: the job and the executor log on this thread.
  let _guard = tracing::subscriber::set_default(subscriber);

  let stub = StubControlPlane::spawn(StatusCode::INTERNAL_SERVER_ERROR, "").await;
  let mut registry = JobRegistry::new();
  register(
    &mut registry,
    Arc::new(StaticSecretProvider::new(SECRET)),
    None,
  );
  let executor = JobExecutor::new(Arc::new(registry));
  let ctx = JobContext::new("job-9", REPLICATION_KIND, CancellationToken::new());

  let report = executor
    .execute(REPLICATION_KIND, &ctx, &params(42, &stub.base_url, false))
    .await
    .expect("kind is registered");

  assert!(!report.is_success());
  assert_eq!(errors.load(Ordering::SeqCst), 1);
}
