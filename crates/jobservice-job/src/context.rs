//! Execution context handed to a job by the runtime.

use std::sync::Arc;

use jobservice_host_log::{JobLogger, TracingLogger};
use tokio_util::sync::CancellationToken;

/// What a running job may observe about its runtime: who it is, where to
/// log, and whether it has been asked to stop.
///
/// The runtime owns the context; jobs only borrow it.
#[derive(Clone)]
pub struct JobContext {
  job_id: String,
  cancel: CancellationToken,
  logger: Arc<dyn JobLogger>,
}

impl JobContext {
  /// Create a context that logs through `tracing`.
  pub fn new(job_id: impl Into<String>, kind: &str, cancel: CancellationToken) -> Self {
    let job_id = job_id.into();
    let logger = Arc::new(TracingLogger::new(job_id.clone(), kind));
    Self {
      job_id,
      cancel,
      logger,
    }
  }

  /// Replace the logger.
  pub fn with_logger(mut self, logger: Arc<dyn JobLogger>) -> Self {
    self.logger = logger;
    self
  }

  pub fn job_id(&self) -> &str {
    &self.job_id
  }

  pub fn logger(&self) -> &dyn JobLogger {
    self.logger.as_ref()
  }

  /// Whether the runtime asked this job to stop.
  pub fn is_canceled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  pub fn cancel_token(&self) -> &CancellationToken {
    &self.cancel
  }
}

impl std::fmt::Debug for JobContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("JobContext")
      .field("job_id", &self.job_id)
      .field("canceled", &self.is_canceled())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use jobservice_host_log::{LogLevel, MemoryLogger};

  use super::*;

  #[test]
  fn test_cancellation_is_observed() {
    let cancel = CancellationToken::new();
    let ctx = JobContext::new("job-1", "TEST", cancel.clone());
    assert!(!ctx.is_canceled());

    cancel.cancel();
    assert!(ctx.is_canceled());
  }

  #[test]
  fn test_child_token_follows_parent() {
    let parent = CancellationToken::new();
    let ctx = JobContext::new("job-1", "TEST", parent.child_token());

    parent.cancel();
    assert!(ctx.is_canceled());
    assert!(ctx.cancel_token().is_cancelled());
  }

  #[test]
  fn test_with_logger() {
    let logger = MemoryLogger::new();
    let ctx =
      JobContext::new("job-2", "TEST", CancellationToken::new()).with_logger(Arc::new(logger.clone()));

    ctx.logger().warning("heads up");

    assert_eq!(ctx.job_id(), "job-2");
    assert_eq!(logger.count(LogLevel::Warning), 1);
  }
}
