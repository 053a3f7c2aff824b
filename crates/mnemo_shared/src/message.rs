use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The speaker of a single turn. Unlike the teacher's `MessageRole`
/// (`User`/`Assistant` only, since its host is a single voice-agent
/// conversation), this engine observes raw host conversations that can
/// also carry system prompts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
  User,
  Assistant,
  System,
}

impl std::fmt::Display for MessageRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::User => write!(f, "user"),
      Self::Assistant => write!(f, "assistant"),
      Self::System => write!(f, "system"),
    }
  }
}

/// A single immutable turn. `timestamp` is optional: parsers must accept
/// a missing or malformed timestamp and treat it as epoch-zero for gap
/// math rather than rejecting the message.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
  pub role: MessageRole,
  pub content: String,
  #[serde(default)]
  pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
  #[must_use]
  pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
    Self {
      role,
      content: content.into(),
      timestamp: None,
    }
  }

  #[must_use]
  pub fn with_timestamp(role: MessageRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
    Self {
      role,
      content: content.into(),
      timestamp: Some(timestamp),
    }
  }

  /// Timestamp used for all gap/ordering math, epoch-zero when absent.
  #[must_use]
  pub fn effective_timestamp(&self) -> DateTime<Utc> {
    self.timestamp.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
  }
}

impl std::fmt::Display for Message {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.role, self.content)
  }
}

/// Grounding passed through to the LLM; never stored inside a fact.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProjectContext {
  pub workspace_name: String,
  pub language: String,
  pub framework: Option<String>,
  pub package_manager: Option<String>,
}
