use mnemo_shared::EngineError;
use mnemo_store::{Filter, VectorStore};

use crate::category::FactCategory;
use crate::config::ConflictThresholds;
use crate::fact::{CategorizedFactInput, MemoryAction};

/// Decides ADD / IGNORE / SUPERSEDE / DELETE_EXISTING for a candidate fact
/// against whatever the store already holds for the same workspace (§4.2 /
/// C2).
pub struct ConflictResolver<S: VectorStore> {
  store: S,
  thresholds: ConflictThresholds,
}

impl<S: VectorStore> ConflictResolver<S> {
  #[must_use]
  pub fn new(store: S, thresholds: ConflictThresholds) -> Self {
    Self { store, thresholds }
  }

  /// Returns a single-element list in every current policy; the type
  /// admits plural futures per §4.2.
  pub async fn resolve(&self, candidate: CategorizedFactInput, workspace_path: &str) -> Result<Vec<MemoryAction>, EngineError> {
    let Some(embedding) = candidate.embedding.clone().filter(|v| !v.is_empty()) else {
      return Ok(vec![MemoryAction::Add(candidate)]);
    };

    let mut filter = Filter::workspace_path(workspace_path);
    filter = filter.with("category", candidate.category.to_string());

    let neighbours = self.store.search(&embedding, self.thresholds.neighbour_limit, &filter).await?;

    let candidate_content = candidate.content.trim().to_lowercase();

    if let Some(hit) = neighbours
      .iter()
      .find(|hit| hit.score.unwrap_or(0.0) > self.thresholds.ignore_similarity && content_of(hit).trim().to_lowercase() == candidate_content)
    {
      return Ok(vec![MemoryAction::Ignore {
        target_id: hit.record.id.clone(),
        candidate,
      }]);
    }

    if candidate.category == FactCategory::Architecture {
      let targets: Vec<String> = neighbours
        .iter()
        .filter(|hit| hit.score.unwrap_or(0.0) > self.thresholds.supersede_similarity && content_of(hit).trim().to_lowercase() != candidate_content)
        .map(|hit| hit.record.id.clone())
        .collect();

      if !targets.is_empty() {
        return Ok(vec![MemoryAction::Supersede { candidate, target_ids: targets }]);
      }
    }

    if candidate.category == FactCategory::Debugging && contains_resolution_marker(&candidate.content, &self.thresholds.resolution_markers) {
      let targets: Vec<String> = neighbours
        .iter()
        .filter(|hit| hit.score.unwrap_or(0.0) > self.thresholds.delete_existing_similarity)
        .map(|hit| hit.record.id.clone())
        .collect();

      if !targets.is_empty() {
        return Ok(vec![MemoryAction::DeleteExisting { candidate, target_ids: targets }]);
      }
    }

    Ok(vec![MemoryAction::Add(candidate)])
  }
}

fn content_of(hit: &mnemo_store::SearchHit) -> String {
  hit.record.payload.get("content").and_then(|v| v.as_str()).unwrap_or_default().to_string()
}

fn contains_resolution_marker(content: &str, markers: &[String]) -> bool {
  let lower = content.to_lowercase();
  markers.iter().any(|marker| lower.contains(&marker.to_lowercase()))
}

#[cfg(test)]
mod tests {
  use mnemo_store::{InMemoryVectorStore, StoreRecord};
  use serde_json::json;

  use super::*;

  async fn store_with(records: Vec<(&str, &str, FactCategory, Vec<f32>)>) -> InMemoryVectorStore {
    let store = InMemoryVectorStore::default();
    let records = records
      .into_iter()
      .map(|(id, content, category, vector)| {
        StoreRecord::new(id, vector, json!({ "workspace_path": "/workspace/one", "category": category.to_string(), "content": content }))
      })
      .collect();
    store.insert(records).await.unwrap();
    store
  }

  #[tokio::test]
  async fn duplicate_content_is_ignored() {
    let store = store_with(vec![("existing", "Using React with TypeScript", FactCategory::Pattern, vec![1.0, 0.0])]).await;
    let resolver = ConflictResolver::new(store, ConflictThresholds::default());

    let candidate = CategorizedFactInput::new("USING REACT WITH TYPESCRIPT", FactCategory::Pattern, 0.9).with_embedding(vec![0.99, 0.01]);

    let actions = resolver.resolve(candidate, "/workspace/one").await.unwrap();
    assert_eq!(actions.len(), 1);
    match &actions[0] {
      MemoryAction::Ignore { target_id, .. } => assert_eq!(target_id, "existing"),
      other => panic!("expected Ignore, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn architecture_conflict_supersedes() {
    let store = store_with(vec![("jwt", "Using JWT token authentication", FactCategory::Architecture, vec![0.9, 0.1])]).await;
    let resolver = ConflictResolver::new(store, ConflictThresholds::default());

    let candidate = CategorizedFactInput::new("Using session-based authentication", FactCategory::Architecture, 0.9).with_embedding(vec![0.85, 0.15]);

    let actions = resolver.resolve(candidate, "/workspace/one").await.unwrap();
    match &actions[0] {
      MemoryAction::Supersede { target_ids, .. } => assert_eq!(target_ids, &vec!["jwt".to_string()]),
      other => panic!("expected Supersede, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn no_embedding_short_circuits_to_add() {
    let store = InMemoryVectorStore::default();
    let resolver = ConflictResolver::new(store, ConflictThresholds::default());
    let candidate = CategorizedFactInput::new("anything", FactCategory::Pattern, 0.5);

    let actions = resolver.resolve(candidate, "/workspace/one").await.unwrap();
    assert!(matches!(actions[0], MemoryAction::Add(_)));
  }
}
