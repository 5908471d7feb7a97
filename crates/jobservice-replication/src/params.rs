//! Typed replication job parameters.

use jobservice_host_http::replication_target;
use jobservice_job::{JobError, JobParams};
use serde::{Deserialize, Deserializer, de};

/// Parameters of a replication trigger, parsed from the runtime's untyped
/// mapping. Keys other than these three are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplicationParams {
  /// Replication policy to start.
  #[serde(deserialize_with = "deserialize_policy_id")]
  pub policy_id: i64,
  /// Base URL of the control-plane API.
  pub url: String,
  /// Skip TLS certificate verification.
  pub insecure: bool,
}

impl ReplicationParams {
  pub fn parse(params: &JobParams) -> Result<Self, JobError> {
    let parsed: Self = serde_json::from_value(serde_json::Value::Object(params.clone()))
      .map_err(|e| JobError::invalid_params(e.to_string()))?;

    replication_target(&parsed.url).map_err(|e| JobError::invalid_params(e.to_string()))?;

    Ok(parsed)
  }
}

// Numbers may arrive as floats (`42.0`); accept them only when integral.
fn deserialize_policy_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  let number = serde_json::Number::deserialize(deserializer)?;
  if let Some(id) = number.as_i64() {
    return Ok(id);
  }

  match number.as_f64() {
    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
    _ => Err(de::Error::custom(format!(
      "policy_id must be an integer, got {}",
      number
    ))),
  }
}
