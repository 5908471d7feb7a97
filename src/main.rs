use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jobservice_host_secret::{DEFAULT_SECRET_ENV, EnvSecretProvider};
use jobservice_job::{CancellationToken, JobContext, JobExecutor, JobParams, JobRegistry};

/// Jobservice - run a single job the way a worker would
#[derive(Parser)]
#[command(name = "jobservice")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Environment variable holding the job service's trust secret
  #[arg(long, global = true, default_value = DEFAULT_SECRET_ENV)]
  secret_env: String,

  /// Timeout for outbound requests, in seconds
  #[arg(long, global = true, env = "JOBSERVICE_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  /// Emit log lines as JSON
  #[arg(long, global = true)]
  log_json: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run one job
  Run {
    /// Job kind (see `kinds`)
    kind: String,

    /// Path to a JSON file with the job parameters (default: stdin)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Job ID (default: random)
    #[arg(long)]
    job_id: Option<String>,
  },

  /// List the registered job kinds
  Kinds,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.log_json);

  let registry = build_registry(&cli);

  match cli.command {
    Some(Commands::Run {
      kind,
      params,
      job_id,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run_job(registry, kind, params, job_id))?;
    }
    Some(Commands::Kinds) => {
      for kind in registry.kinds() {
        println!("{}", kind);
      }
    }
    None => {
      println!("jobservice - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  // stdout carries the job report; logs go to stderr.
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false);

  let _ = if json {
    builder.json().try_init()
  } else {
    builder.try_init()
  };
}

fn build_registry(cli: &Cli) -> JobRegistry {
  let secrets = Arc::new(EnvSecretProvider::new(cli.secret_env.clone()));
  let timeout = cli.timeout_secs.map(Duration::from_secs);

  let mut registry = JobRegistry::new();
  jobservice_replication::register(&mut registry, secrets, timeout);
  registry
}

async fn run_job(
  registry: JobRegistry,
  kind: String,
  params_file: Option<PathBuf>,
  job_id: Option<String>,
) -> Result<()> {
  let params = load_params(params_file.as_deref()).await?;

  let job_id = job_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
  let cancel = CancellationToken::new();

  // Cancellation is only observed before the job starts its work.
  let ctrl_c = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling job");
      ctrl_c.cancel();
    }
  });

  let ctx = JobContext::new(job_id, &kind, cancel);
  let executor = JobExecutor::new(Arc::new(registry));
  let report = executor
    .execute(&kind, &ctx, &params)
    .await
    .context("job could not be started")?;

  info!(job_id = %report.job_id, state = %report.state, "job finished");

  let output = serde_json::json!({
    "job_id": report.job_id,
    "kind": report.kind,
    "state": report.state.to_string(),
    "should_retry": report.should_retry,
    "max_fails": report.max_fails,
    "error": report.error.as_ref().map(|e| e.to_string()),
  });
  println!("{}", serde_json::to_string_pretty(&output)?);

  match report.error {
    Some(e) => Err(anyhow!(e).context("job failed")),
    None => Ok(()),
  }
}

/// Job parameters from `path`, or from piped stdin when no path is given.
async fn load_params(path: Option<&Path>) -> Result<JobParams> {
  let (text, origin) = match path {
    Some(path) => {
      let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read params file: {}", path.display()))?;
      (text, path.display().to_string())
    }
    None if io::stdin().is_terminal() => return Ok(JobParams::new()),
    None => {
      let mut text = String::new();
      io::stdin()
        .read_to_string(&mut text)
        .context("failed to read params from stdin")?;
      (text, "stdin".to_string())
    }
  };

  parse_params(&text).with_context(|| format!("invalid job parameters in {}", origin))
}

/// Blank input means no parameters.
fn parse_params(text: &str) -> Result<JobParams> {
  if text.trim().is_empty() {
    return Ok(JobParams::new());
  }
  into_params(serde_json::from_str(text)?)
}

fn into_params(value: serde_json::Value) -> Result<JobParams> {
  match value {
    serde_json::Value::Object(params) => Ok(params),
    other => bail!("job parameters must be a JSON object, got: {}", other),
  }
}
