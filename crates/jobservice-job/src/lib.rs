//! Jobservice Job
//!
//! The contract between the job runtime and the jobs it schedules.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     JobExecutor                      │
//! │  - resolve kind via JobRegistry (fresh job per run)  │
//! │  - validate(params) before run                       │
//! │  - run(ctx, params) → JobReport                      │
//! └──────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                     dyn Job                          │
//! │  - validate / run / should_retry / max_fails         │
//! │  - observes JobContext (logger + cancellation)       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Retrying is the scheduler's business: the executor runs a job once and
//! reports what the job declared about retries.

mod context;
mod error;
mod executor;
mod job;
mod registry;

pub use context::JobContext;
pub use error::JobError;
pub use executor::{JobExecutor, JobReport};
pub use job::{Job, JobParams, JobState};
pub use registry::JobRegistry;

pub use jobservice_host_log::{JobLogger, LogLevel};
pub use tokio_util::sync::CancellationToken;
