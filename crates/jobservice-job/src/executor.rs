//! Job executor.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::context::JobContext;
use crate::error::JobError;
use crate::job::{JobParams, JobState};
use crate::registry::JobRegistry;

/// Terminal outcome of one job execution.
#[derive(Debug)]
pub struct JobReport {
  pub job_id: String,
  pub kind: String,
  /// State the job instance ended in.
  pub state: JobState,
  /// Retry declaration of the job, for the scheduler to act on.
  pub should_retry: bool,
  pub max_fails: u32,
  /// `None` on success.
  pub error: Option<JobError>,
}

impl JobReport {
  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }
}

/// Runs registered jobs once each.
pub struct JobExecutor {
  registry: Arc<JobRegistry>,
}

impl JobExecutor {
  pub fn new(registry: Arc<JobRegistry>) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &JobRegistry {
    &self.registry
  }

  /// Validate and run a fresh instance of `kind`.
  ///
  /// Only an unknown kind is returned as `Err`; every failure of the job
  /// itself is carried in the report.
  #[instrument(
    name = "job_execute",
    skip(self, ctx, params),
    fields(job_id = %ctx.job_id(), kind = %kind)
  )]
  pub async fn execute(
    &self,
    kind: &str,
    ctx: &JobContext,
    params: &JobParams,
  ) -> Result<JobReport, JobError> {
    let mut job = self.registry.create(kind)?;

    info!("job started");

    // Malformed parameters never reach `run`.
    let result = match job.validate(params) {
      Ok(()) => job.run(ctx, params).await,
      Err(e) => Err(e),
    };

    let report = JobReport {
      job_id: ctx.job_id().to_string(),
      kind: kind.to_string(),
      state: job.state(),
      should_retry: job.should_retry(),
      max_fails: job.max_fails(),
      error: result.err(),
    };

    // Jobs report their own failures at error level.
    match &report.error {
      None => info!(state = %report.state, "job completed"),
      Some(e) => warn!(state = %report.state, error = %e, "job failed"),
    }

    Ok(report)
  }
}
