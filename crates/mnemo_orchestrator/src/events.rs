/// Observable lifecycle events the orchestrator emits as it works (§6).
/// Hosts wire a [`TaskUpdateSink`] to surface these in their own UI/logging
/// without the engine knowing anything about that surface.
#[derive(Debug, Clone)]
pub enum EngineEvent {
  StoreStarted { episode_id: String },
  StoreCompleted { episode_id: String, facts_written: usize },
  StoreFailed { episode_id: String, reason: String },

  SearchStarted { query: String },
  SearchCompleted { query: String, results: usize },
  SearchFailed { query: String, reason: String },

  ExtractStarted { episode_id: String },
  ExtractCompleted { episode_id: String, facts_found: usize },
  ExtractFailed { episode_id: String, reason: String },

  SyncStarted,
  SyncCompleted,
  SyncFailed { reason: String },
}

pub trait TaskUpdateSink: Send + Sync {
  fn emit(&self, event: EngineEvent);
}

/// Default sink for hosts that have not wired observability.
pub struct NullSink;

impl TaskUpdateSink for NullSink {
  fn emit(&self, _event: EngineEvent) {}
}
