//! Registry of job kinds.

use std::collections::HashMap;

use crate::error::JobError;
use crate::job::Job;

type JobFactory = Box<dyn Fn() -> Box<dyn Job> + Send + Sync>;

/// Maps a job kind name to a factory that builds a fresh job instance.
#[derive(Default)]
pub struct JobRegistry {
  factories: HashMap<String, JobFactory>,
}

impl JobRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a job kind. A later registration under the same name wins.
  pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
  where
    F: Fn() -> Box<dyn Job> + Send + Sync + 'static,
  {
    self.factories.insert(kind.into(), Box::new(factory));
  }

  pub fn contains(&self, kind: &str) -> bool {
    self.factories.contains_key(kind)
  }

  /// Build a new instance of `kind`.
  pub fn create(&self, kind: &str) -> Result<Box<dyn Job>, JobError> {
    self
      .factories
      .get(kind)
      .map(|factory| factory())
      .ok_or_else(|| JobError::UnknownKind {
        kind: kind.to_string(),
      })
  }

  /// Registered kinds, sorted.
  pub fn kinds(&self) -> Vec<&str> {
    let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
    kinds.sort_unstable();
    kinds
  }
}

impl std::fmt::Debug for JobRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("JobRegistry")
      .field("kinds", &self.kinds())
      .finish()
  }
}
