//! The job contract.

use std::fmt;

use async_trait::async_trait;

use crate::context::JobContext;
use crate::error::JobError;

/// Untyped parameters supplied by the runtime. Jobs parse them into their
/// own typed configuration.
pub type JobParams = serde_json::Map<String, serde_json::Value>;

/// Lifecycle of a single job instance.
///
/// `Created → Initializing → (Canceled | Running) → (Succeeded | Failed)`.
/// Initialization errors go straight to `Failed`. No state is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
  Created,
  Initializing,
  Canceled,
  /// The job's side effect is in flight.
  Running,
  Succeeded,
  Failed,
}

impl JobState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Canceled | Self::Succeeded | Self::Failed)
  }
}

impl fmt::Display for JobState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Created => "created",
      Self::Initializing => "initializing",
      Self::Canceled => "canceled",
      Self::Running => "running",
      Self::Succeeded => "succeeded",
      Self::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// A unit of work the runtime can schedule.
///
/// Instances are single-use: the registry builds a fresh one per execution.
#[async_trait]
pub trait Job: Send + Sync {
  /// Whether the scheduler may retry this job after a failure.
  fn should_retry(&self) -> bool;

  /// Failures tolerated before the scheduler gives up.
  fn max_fails(&self) -> u32;

  /// Check parameters before the job is accepted. Performs no I/O.
  fn validate(&self, params: &JobParams) -> Result<(), JobError>;

  /// Execute the job.
  async fn run(&mut self, ctx: &JobContext, params: &JobParams) -> Result<(), JobError>;

  /// Current lifecycle state.
  fn state(&self) -> JobState;
}
