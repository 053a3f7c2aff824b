use std::sync::Arc;

use async_trait::async_trait;
use mnemo_shared::EngineError;

use crate::filter::Filter;
use crate::record::{Patch, SearchHit, StoreRecord};

/// The vector index capability (§6). The engine treats every concrete
/// implementation as an external, pluggable collaborator and never
/// assumes anything about its backing storage.
#[async_trait]
pub trait VectorStore: Send + Sync {
  /// Idempotent. Called once during orchestrator initialization.
  async fn ensure_collection(&self) -> Result<(), EngineError>;

  fn collection_name(&self) -> &str;

  async fn insert(&self, records: Vec<StoreRecord>) -> Result<(), EngineError>;

  async fn update(&self, id: &str, patch: Patch) -> Result<(), EngineError>;

  async fn delete(&self, ids: &[String]) -> Result<(), EngineError>;

  async fn get(&self, id: &str) -> Result<Option<StoreRecord>, EngineError>;

  /// Similarity search. `filter` is mandatory on every call the engine
  /// makes; a store that cannot honor a requested filter key must reject
  /// the query rather than silently ignore it.
  async fn search(&self, query_vector: &[f32], k: usize, filter: &Filter) -> Result<Vec<SearchHit>, EngineError>;

  /// Non-similarity filtered read, used by maintenance flows.
  async fn filter(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<StoreRecord>, EngineError>;

  /// Default: unsupported. Stores that can cheaply wipe their collection
  /// contents while keeping the collection itself should override this.
  async fn clear_collection(&self) -> Result<(), EngineError> {
    Err(EngineError::store_deletion(anyhow::anyhow!(
      "clear_collection is not supported by this store"
    )))
  }

  /// Default: unsupported. `clearMemoryData` (§4.7) prefers this over
  /// `clear_collection` when a store implements both.
  async fn delete_collection(&self) -> Result<(), EngineError> {
    Err(EngineError::store_deletion(anyhow::anyhow!(
      "delete_collection is not supported by this store"
    )))
  }
}

/// Lets a type-erased `Arc<dyn VectorStore>` be shared across the
/// orchestrator, conflict resolver, and search service without any of
/// them caring about the concrete backend.
#[async_trait]
impl VectorStore for Arc<dyn VectorStore> {
  async fn ensure_collection(&self) -> Result<(), EngineError> {
    (**self).ensure_collection().await
  }

  fn collection_name(&self) -> &str {
    (**self).collection_name()
  }

  async fn insert(&self, records: Vec<StoreRecord>) -> Result<(), EngineError> {
    (**self).insert(records).await
  }

  async fn update(&self, id: &str, patch: Patch) -> Result<(), EngineError> {
    (**self).update(id, patch).await
  }

  async fn delete(&self, ids: &[String]) -> Result<(), EngineError> {
    (**self).delete(ids).await
  }

  async fn get(&self, id: &str) -> Result<Option<StoreRecord>, EngineError> {
    (**self).get(id).await
  }

  async fn search(&self, query_vector: &[f32], k: usize, filter: &Filter) -> Result<Vec<SearchHit>, EngineError> {
    (**self).search(query_vector, k, filter).await
  }

  async fn filter(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<StoreRecord>, EngineError> {
    (**self).filter(filter, limit).await
  }

  async fn clear_collection(&self) -> Result<(), EngineError> {
    (**self).clear_collection().await
  }

  async fn delete_collection(&self) -> Result<(), EngineError> {
    (**self).delete_collection().await
  }
}
