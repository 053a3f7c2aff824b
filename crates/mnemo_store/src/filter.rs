use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A value a [`Filter`] entry can require. The engine only ever populates
/// `workspace_path`, `category`, `episode_id`, `resolved`, `after`, and
/// `before` (§6) — stores that don't recognize a key reject the query
/// rather than silently ignoring it.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
  Text(String),
  Bool(bool),
  /// Used only by the `after` / `before` keys, which are range bounds on
  /// the payload's `reference_time` rather than equality checks.
  Time(DateTime<Utc>),
}

impl From<String> for FilterValue {
  fn from(value: String) -> Self {
    Self::Text(value)
  }
}

impl From<&str> for FilterValue {
  fn from(value: &str) -> Self {
    Self::Text(value.to_string())
  }
}

impl From<bool> for FilterValue {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<DateTime<Utc>> for FilterValue {
  fn from(value: DateTime<Utc>) -> Self {
    Self::Time(value)
  }
}

/// A mapping from payload field name to required value (§6). `workspace_path`
/// is mandatory on every query the engine issues; the conflict resolver and
/// search service never omit it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(HashMap<String, FilterValue>);

impl Filter {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
    self.0.insert(key.into(), value.into());
    self
  }

  #[must_use]
  pub fn workspace_path(workspace_path: impl Into<String>) -> Self {
    Self::new().with("workspace_path", workspace_path.into())
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&FilterValue> {
    self.0.get(key)
  }

  #[must_use]
  pub fn contains_key(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
    self.0.iter()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
