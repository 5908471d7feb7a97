use tracing::{debug, error, info, warn};

use crate::{JobLogger, LogLevel};

/// Forwards job log lines to `tracing`, tagged with the job id and kind.
#[derive(Debug, Clone)]
pub struct TracingLogger {
  job_id: String,
  kind: String,
}

impl TracingLogger {
  pub fn new(job_id: impl Into<String>, kind: impl Into<String>) -> Self {
    Self {
      job_id: job_id.into(),
      kind: kind.into(),
    }
  }
}

impl JobLogger for TracingLogger {
  fn log(&self, level: LogLevel, message: &str) {
    match level {
      LogLevel::Debug => debug!(job_id = %self.job_id, kind = %self.kind, "{}", message),
      LogLevel::Info => info!(job_id = %self.job_id, kind = %self.kind, "{}", message),
      LogLevel::Warning => warn!(job_id = %self.job_id, kind = %self.kind, "{}", message),
      LogLevel::Error => error!(job_id = %self.job_id, kind = %self.kind, "{}", message),
    }
  }
}
