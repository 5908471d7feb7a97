//! Jobservice Replication
//!
//! The replication trigger job. It authenticates to the control plane with
//! the job service's trust secret and asks it to start replicating one
//! policy. It sends at most one request per run and never retries itself.

mod params;
mod replicator;

use std::sync::Arc;
use std::time::Duration;

use jobservice_host_secret::SecretProvider;
use jobservice_job::{Job, JobRegistry};

pub use params::ReplicationParams;
pub use replicator::Replicator;

/// Kind name the replication job is registered under.
pub const REPLICATION_KIND: &str = "IMAGE_REPLICATE";

/// Register the replication job. Every execution gets a new [`Replicator`]
/// sharing `secrets`.
pub fn register(
  registry: &mut JobRegistry,
  secrets: Arc<dyn SecretProvider>,
  timeout: Option<Duration>,
) {
  registry.register(REPLICATION_KIND, move || {
    Box::new(Replicator::new(secrets.clone()).with_timeout(timeout)) as Box<dyn Job>
  });
}
