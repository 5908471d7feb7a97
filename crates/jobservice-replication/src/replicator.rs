//! The replication trigger job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobservice_host_http::{CookieCredential, TransportPolicy, TriggerClient};
use jobservice_host_secret::SecretProvider;
use jobservice_job::{Job, JobContext, JobError, JobLogger, JobParams, JobState};

use crate::params::ReplicationParams;

/// Asks the control plane to start replicating a policy.
///
/// Single-use: build a new instance for every execution.
pub struct Replicator {
  secrets: Arc<dyn SecretProvider>,
  timeout: Option<Duration>,
  state: JobState,
}

impl Replicator {
  pub fn new(secrets: Arc<dyn SecretProvider>) -> Self {
    Self {
      secrets,
      timeout: None,
      state: JobState::Created,
    }
  }

  /// Request timeout for the outbound call.
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  /// Build the per-run state. Nothing is sent yet.
  async fn init<'a>(
    &self,
    ctx: &'a JobContext,
    params: &JobParams,
  ) -> Result<Replication<'a>, JobError> {
    let logger = ctx.logger();

    if ctx.is_canceled() {
      let err = JobError::Canceled;
      logger.warning(&err.to_string());
      return Err(err);
    }

    let params = ReplicationParams::parse(params).inspect_err(|e| logger.error(&e.to_string()))?;

    // Read on every run; the secret may have rotated.
    let secret = self
      .secrets
      .current_secret()
      .await
      .map_err(JobError::from)
      .inspect_err(|e| logger.error(&e.to_string()))?;

    let policy = TransportPolicy::new(params.insecure).with_timeout(self.timeout);
    let client = TriggerClient::new(policy, CookieCredential::secret(secret))
      .map_err(JobError::from)
      .inspect_err(|e| logger.error(&e.to_string()))?;

    logger.info(&format!(
      "replication job initialized: policy_id={}, url={}, insecure={}",
      params.policy_id, params.url, params.insecure
    ));

    Ok(Replication {
      params,
      client,
      logger,
    })
  }
}

#[async_trait]
impl Job for Replicator {
  fn should_retry(&self) -> bool {
    false
  }

  fn max_fails(&self) -> u32 {
    0
  }

  fn validate(&self, params: &JobParams) -> Result<(), JobError> {
    ReplicationParams::parse(params).map(|_| ())
  }

  async fn run(&mut self, ctx: &JobContext, params: &JobParams) -> Result<(), JobError> {
    if self.state != JobState::Created {
      return Err(JobError::AlreadyStarted {
        state: self.state.to_string(),
      });
    }

    self.state = JobState::Initializing;
    let replication = match self.init(ctx, params).await {
      Ok(replication) => replication,
      Err(e) => {
        self.state = match e {
          JobError::Canceled => JobState::Canceled,
          _ => JobState::Failed,
        };
        return Err(e);
      }
    };

    self.state = JobState::Running;
    let result = replication.trigger().await;
    self.state = match result {
      Ok(()) => JobState::Succeeded,
      Err(_) => JobState::Failed,
    };
    result
  }

  fn state(&self) -> JobState {
    self.state
  }
}

/// State of one run, dropped when `run` returns.
struct Replication<'a> {
  params: ReplicationParams,
  client: TriggerClient,
  logger: &'a dyn JobLogger,
}

impl Replication<'_> {
  async fn trigger(self) -> Result<(), JobError> {
    let ReplicationParams { policy_id, url, .. } = &self.params;

    match self.client.trigger_replication(url, *policy_id).await {
      Ok(()) => {
        self.logger.info(&format!(
          "replication request for policy {} sent to {}",
          policy_id, url
        ));
        Ok(())
      }
      Err(e) => {
        self.logger.error(&format!(
          "failed to send replication request to {}: {}",
          url, e
        ));
        Err(e.into())
      }
    }
  }
}
