use chrono::{DateTime, Utc};
use mnemo_shared::ProjectContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::category::FactCategory;

/// Default applied on read when `confidence` is missing (§3).
pub const DEFAULT_CONFIDENCE: f32 = 0.7;

/// A fact before it has been assigned an id or ingestion metadata (§3).
/// What the extractor produces and what the conflict resolver evaluates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedFactInput {
  pub content: String,
  pub category: FactCategory,
  pub confidence: f32,
  #[serde(default)]
  pub embedding: Option<Vec<f32>>,
  #[serde(default)]
  pub reference_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub context_description: Option<String>,
  #[serde(default)]
  pub episode_id: Option<String>,
  #[serde(default)]
  pub source_model: Option<String>,
}

impl CategorizedFactInput {
  #[must_use]
  pub fn new(content: impl Into<String>, category: FactCategory, confidence: f32) -> Self {
    Self {
      content: content.into(),
      category,
      confidence,
      embedding: None,
      reference_time: None,
      context_description: None,
      episode_id: None,
      source_model: None,
    }
  }

  #[must_use]
  pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
    self.embedding = Some(embedding);
    self
  }

  /// `content` non-empty, `category` known, `confidence` in range (§4.5).
  /// A known category is enforced by the type system at parse time; this
  /// only checks what the type system can't.
  #[must_use]
  pub fn is_valid(&self) -> bool {
    !self.content.trim().is_empty() && (0.0..=1.0).contains(&self.confidence)
  }

  #[must_use]
  pub fn effective_confidence(&self) -> f32 {
    self.confidence
  }
}

/// A fact at rest in the store, with the full lifecycle envelope (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationFact {
  pub id: String,
  pub content: String,
  pub category: FactCategory,
  pub confidence: f32,
  #[serde(default)]
  pub embedding: Option<Vec<f32>>,
  pub reference_time: DateTime<Utc>,
  pub ingestion_time: DateTime<Utc>,
  pub workspace_id: String,
  #[serde(default)]
  pub workspace_path: Option<String>,
  #[serde(default)]
  pub project_context: Option<ProjectContext>,
  #[serde(default)]
  pub conversation_context: Option<String>,
  #[serde(default)]
  pub context_description: Option<String>,
  #[serde(default)]
  pub episode_id: Option<String>,
  #[serde(default)]
  pub source_model: Option<String>,
  #[serde(default)]
  pub metadata: Value,
  #[serde(default)]
  pub superseded_by: Option<String>,
  #[serde(default)]
  pub superseded_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub resolved: bool,
  #[serde(default)]
  pub resolved_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub derived_from: Option<String>,
  #[serde(default)]
  pub derived_pattern_created: bool,
  #[serde(default)]
  pub last_confirmed: Option<DateTime<Utc>>,
}

/// One of the three mutually-exclusive states a fact's lifecycle fields
/// encode (§3 invariant: exactly one of active/superseded/resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  Active,
  Superseded,
  Resolved,
}

impl ConversationFact {
  #[must_use]
  pub fn from_input(input: CategorizedFactInput, workspace_id: impl Into<String>, now: DateTime<Utc>) -> Self {
    let reference_time = input.reference_time.unwrap_or(now);
    Self {
      id: Uuid::now_v7().to_string(),
      content: input.content,
      category: input.category,
      confidence: input.confidence,
      embedding: input.embedding,
      reference_time,
      ingestion_time: now,
      workspace_id: workspace_id.into(),
      workspace_path: None,
      project_context: None,
      conversation_context: None,
      context_description: input.context_description,
      episode_id: input.episode_id,
      source_model: input.source_model,
      metadata: Value::Null,
      superseded_by: None,
      superseded_at: None,
      resolved: false,
      resolved_at: None,
      derived_from: None,
      derived_pattern_created: false,
      last_confirmed: None,
    }
  }

  #[must_use]
  pub fn effective_confidence(&self) -> f32 {
    self.confidence
  }

  #[must_use]
  pub fn lifecycle_state(&self) -> LifecycleState {
    if self.resolved {
      LifecycleState::Resolved
    } else if self.superseded_by.is_some() {
      LifecycleState::Superseded
    } else {
      LifecycleState::Active
    }
  }
}

/// Produced by the conflict resolver (C2) and consumed by the orchestrator
/// (C7). Modeled as a sum type per the category-polymorphism design note
/// rather than a flat `{type, fact, target_ids}` record, so the apply-action
/// match in the orchestrator is exhaustive at compile time.
#[derive(Debug, Clone)]
pub enum MemoryAction {
  Add(CategorizedFactInput),
  Ignore { candidate: CategorizedFactInput, target_id: String },
  Supersede { candidate: CategorizedFactInput, target_ids: Vec<String> },
  DeleteExisting { candidate: CategorizedFactInput, target_ids: Vec<String> },
  Update(ConversationFact),
}

impl MemoryAction {
  #[must_use]
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Add(_) => "ADD",
      Self::Ignore { .. } => "IGNORE",
      Self::Supersede { .. } => "SUPERSEDE",
      Self::DeleteExisting { .. } => "DELETE_EXISTING",
      Self::Update(_) => "UPDATE",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_inputs_are_rejected() {
    assert!(!CategorizedFactInput::new("", FactCategory::Pattern, 0.5).is_valid());
    assert!(!CategorizedFactInput::new("ok", FactCategory::Pattern, 1.5).is_valid());
    assert!(!CategorizedFactInput::new("ok", FactCategory::Pattern, -0.1).is_valid());
    assert!(CategorizedFactInput::new("ok", FactCategory::Pattern, 0.5).is_valid());
  }

  #[test]
  fn new_fact_starts_active() {
    let input = CategorizedFactInput::new("uses react", FactCategory::Pattern, 0.9);
    let fact = ConversationFact::from_input(input, "workspace-1", Utc::now());
    assert_eq!(fact.lifecycle_state(), LifecycleState::Active);
  }
}
