use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mnemo_shared::{cosine_similarity, EngineError};
use serde_json::Value;

use crate::filter::{Filter, FilterValue};
use crate::record::{Patch, SearchHit, StoreRecord};
use crate::vector_store::VectorStore;

/// Reference `VectorStore` used by tests and by hosts that have not wired
/// a real index. Backed by a concurrent map rather than the teacher's
/// `sea-orm`/Postgres pipeline, since the spec treats the vector index as
/// an external, pluggable collaborator with no prescribed backend.
pub struct InMemoryVectorStore {
  name: String,
  records: DashMap<String, StoreRecord>,
}

impl InMemoryVectorStore {
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      records: DashMap::new(),
    }
  }
}

impl Default for InMemoryVectorStore {
  fn default() -> Self {
    Self::new("conversation_facts")
  }
}

fn reference_time(payload: &Value) -> Option<DateTime<Utc>> {
  payload.get("reference_time")?.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|t| t.with_timezone(&Utc))
}

fn matches(payload: &Value, filter: &Filter) -> bool {
  for (key, value) in filter.iter() {
    match (key.as_str(), value) {
      ("after", FilterValue::Time(bound)) => match reference_time(payload) {
        Some(t) if t >= *bound => {}
        _ => return false,
      },
      ("before", FilterValue::Time(bound)) => match reference_time(payload) {
        Some(t) if t <= *bound => {}
        _ => return false,
      },
      (_, FilterValue::Text(expected)) => {
        if payload.get(key).and_then(Value::as_str) != Some(expected.as_str()) {
          return false;
        }
      }
      (_, FilterValue::Bool(expected)) => {
        let actual = payload.get(key).and_then(Value::as_bool).unwrap_or(false);
        if actual != *expected {
          return false;
        }
      }
      (_, FilterValue::Time(_)) => {
        // Only `after`/`before` are range keys; any other key paired with
        // a Time value has no defined semantics here.
        return false;
      }
    }
  }
  true
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
  async fn ensure_collection(&self) -> Result<(), EngineError> {
    Ok(())
  }

  fn collection_name(&self) -> &str {
    &self.name
  }

  async fn insert(&self, records: Vec<StoreRecord>) -> Result<(), EngineError> {
    for record in records {
      self.records.insert(record.id.clone(), record);
    }
    Ok(())
  }

  async fn update(&self, id: &str, patch: Patch) -> Result<(), EngineError> {
    let mut entry = self
      .records
      .get_mut(id)
      .ok_or_else(|| EngineError::provider(anyhow::anyhow!("no record with id {id}")))?;
    let Some(payload) = entry.payload.as_object_mut() else {
      return Err(EngineError::provider(anyhow::anyhow!("record {id} has a non-object payload")));
    };
    for (field, value) in patch.fields {
      payload.insert(field, value);
    }
    Ok(())
  }

  async fn delete(&self, ids: &[String]) -> Result<(), EngineError> {
    for id in ids {
      self.records.remove(id);
    }
    Ok(())
  }

  async fn get(&self, id: &str) -> Result<Option<StoreRecord>, EngineError> {
    Ok(self.records.get(id).map(|r| r.clone()))
  }

  async fn search(&self, query_vector: &[f32], k: usize, filter: &Filter) -> Result<Vec<SearchHit>, EngineError> {
    let mut hits: Vec<SearchHit> = self
      .records
      .iter()
      .filter(|entry| matches(&entry.payload, filter))
      .map(|entry| {
        let score = cosine_similarity(query_vector, &entry.vector);
        SearchHit {
          record: entry.clone(),
          score: Some(score),
        }
      })
      .collect();

    hits.sort_by(|a, b| b.score.unwrap_or(0.0).partial_cmp(&a.score.unwrap_or(0.0)).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(k);
    Ok(hits)
  }

  async fn filter(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<StoreRecord>, EngineError> {
    let mut out: Vec<StoreRecord> = self.records.iter().filter(|entry| matches(&entry.payload, filter)).map(|entry| entry.clone()).collect();
    if let Some(limit) = limit {
      out.truncate(limit);
    }
    Ok(out)
  }

  async fn clear_collection(&self) -> Result<(), EngineError> {
    self.records.clear();
    Ok(())
  }

  async fn delete_collection(&self) -> Result<(), EngineError> {
    self.records.clear();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(id: &str, workspace: &str, vector: Vec<f32>) -> StoreRecord {
    StoreRecord::new(id, vector, json!({ "workspace_path": workspace, "content": id }))
  }

  #[tokio::test]
  async fn workspace_isolation_is_enforced_on_search() {
    let store = InMemoryVectorStore::default();
    store
      .insert(vec![record("a", "/workspace/one", vec![1.0, 0.0]), record("b", "/workspace/two", vec![1.0, 0.0])])
      .await
      .unwrap();

    let filter = Filter::workspace_path("/workspace/one");
    let hits = store.search(&[1.0, 0.0], 10, &filter).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.id, "a");
  }

  #[tokio::test]
  async fn update_patches_payload_in_place() {
    let store = InMemoryVectorStore::default();
    store.insert(vec![record("a", "/workspace/one", vec![1.0, 0.0])]).await.unwrap();

    store.update("a", Patch::new().with("resolved", json!(true))).await.unwrap();

    let fetched = store.get("a").await.unwrap().unwrap();
    assert_eq!(fetched.payload["resolved"], json!(true));
  }

  #[tokio::test]
  async fn clear_collection_removes_everything() {
    let store = InMemoryVectorStore::default();
    store.insert(vec![record("a", "/workspace/one", vec![1.0, 0.0])]).await.unwrap();
    store.clear_collection().await.unwrap();

    let filter = Filter::workspace_path("/workspace/one");
    let remaining = store.filter(&filter, None).await.unwrap();
    assert!(remaining.is_empty());
  }

  #[tokio::test]
  async fn search_respects_k_limit() {
    let store = InMemoryVectorStore::default();
    let records = (0..5).map(|i| record(&format!("id-{i}"), "/workspace/one", vec![1.0, 0.0])).collect();
    store.insert(records).await.unwrap();

    let filter = Filter::workspace_path("/workspace/one");
    let hits = store.search(&[1.0, 0.0], 2, &filter).await.unwrap();
    assert_eq!(hits.len(), 2);
  }
}
