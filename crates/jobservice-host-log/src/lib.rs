//! Jobservice Host Log
//!
//! The logging capability a job receives through its execution context.
//! Jobs never talk to `tracing` directly: they log through [`JobLogger`] so
//! the runtime decides where lines end up.
//!
//! - [`TracingLogger`] forwards every line to `tracing`, tagged with the job id.
//! - [`MemoryLogger`] keeps lines in memory for embedding and tests.

mod memory;
mod tracing_logger;

use std::fmt;

pub use memory::{LogEntry, MemoryLogger};
pub use tracing_logger::TracingLogger;

/// Severity of a job log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
  Debug,
  Info,
  Warning,
  Error,
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warning => "warning",
      LogLevel::Error => "error",
    };
    f.write_str(name)
  }
}

/// Logger bound to a single job execution.
///
/// Implementations must be cheap to call and must never fail; a sink that
/// cannot write drops the line.
pub trait JobLogger: Send + Sync {
  /// Record one line at the given level.
  fn log(&self, level: LogLevel, message: &str);

  fn debug(&self, message: &str) {
    self.log(LogLevel::Debug, message);
  }

  fn info(&self, message: &str) {
    self.log(LogLevel::Info, message);
  }

  fn warning(&self, message: &str) {
    self.log(LogLevel::Warning, message);
  }

  fn error(&self, message: &str) {
    self.log(LogLevel::Error, message);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_display() {
    assert_eq!(LogLevel::Debug.to_string(), "debug");
    assert_eq!(LogLevel::Warning.to_string(), "warning");
    assert_eq!(LogLevel::Error.to_string(), "error");
  }

  #[test]
  fn test_level_ordering() {
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Info < LogLevel::Warning);
    assert!(LogLevel::Warning < LogLevel::Error);
  }

  #[test]
  fn test_default_methods_route_to_log() {
    let logger = MemoryLogger::new();
    logger.debug("d");
    logger.info("i");
    logger.warning("w");
    logger.error("e");

    let levels: Vec<LogLevel> = logger.entries().iter().map(|e| e.level).collect();
    assert_eq!(
      levels,
      vec![
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error
      ]
    );
  }
}
