use std::sync::{Arc, Mutex};

use crate::{JobLogger, LogLevel};

/// A captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
  pub level: LogLevel,
  pub message: String,
}

/// In-memory logger.
///
/// Clones share the same buffer, so a caller can hand one clone to a job
/// and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
  entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of every line logged so far.
  pub fn entries(&self) -> Vec<LogEntry> {
    match self.entries.lock() {
      Ok(entries) => entries.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }

  /// Number of lines logged at exactly `level`.
  pub fn count(&self, level: LogLevel) -> usize {
    self
      .entries()
      .iter()
      .filter(|entry| entry.level == level)
      .count()
  }
}

impl JobLogger for MemoryLogger {
  fn log(&self, level: LogLevel, message: &str) {
    let entry = LogEntry {
      level,
      message: message.to_string(),
    };
    match self.entries.lock() {
      Ok(mut entries) => entries.push(entry),
      Err(poisoned) => poisoned.into_inner().push(entry),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_clones_share_buffer() {
    let logger = MemoryLogger::new();
    let handle = logger.clone();

    handle.info("initialization completed");
    handle.error("request failed");

    assert_eq!(logger.entries().len(), 2);
    assert_eq!(logger.count(LogLevel::Info), 1);
    assert_eq!(logger.count(LogLevel::Error), 1);
    assert_eq!(logger.count(LogLevel::Warning), 0);
    assert_eq!(logger.entries()[1].message, "request failed");
  }
}
