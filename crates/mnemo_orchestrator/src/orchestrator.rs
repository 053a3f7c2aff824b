use std::sync::Arc;

use chrono::{DateTime, Utc};
use mnemo_ai::{Embedder, LlmProvider};
use mnemo_core::{
  CategorizedFactInput, ConflictResolver, ConversationFact, EpisodeDetector, EpisodeSearchResult, EpisodeSearchService, ExtractionWindow, FactExtractor, HintsProvider, MemoryAction, NullHintsProvider,
  TemporalScorer, ToolInvocation,
};
use mnemo_shared::{EngineError, Message, ProjectContext};
use mnemo_store::{Patch, StoreRecord, VectorStore};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::events::{EngineEvent, NullSink, TaskUpdateSink};
use crate::queue::WorkQueue;
use crate::state_manager::StateManager;

/// Everything one assistant turn carries into the engine (§2).
#[derive(Debug, Clone)]
pub struct TurnInput {
  pub user_message: Message,
  pub assistant_message: Message,
  pub tool: Option<ToolInvocation>,
  pub project_context: Option<ProjectContext>,
}

/// What `on_turn` did, for callers that want to inspect or log it.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
  pub episode_id: String,
  pub actions: Vec<MemoryAction>,
  /// Per-fact failures (embedding or store errors). Non-fatal: the turn
  /// as a whole still succeeds even if one fact's write failed.
  pub errors: Vec<String>,
}

struct SessionState {
  messages: Vec<Message>,
}

/// Wires C1 through C6 together behind the four entry points a host calls:
/// `on_turn`, `search`, `clear`, `finalize` (§4.7 / C7). Every entry point
/// runs through a single per-workspace [`WorkQueue`] so observable state
/// transitions never interleave.
pub struct Orchestrator {
  workspace_id: String,
  workspace_path: String,
  config: EngineConfig,
  state: Arc<StateManager>,
  sink: Arc<dyn TaskUpdateSink>,
  queue: WorkQueue,
  embedder: Arc<dyn Embedder>,
  store: Arc<dyn VectorStore>,
  hints_provider: Arc<dyn HintsProvider>,
  detector: Arc<EpisodeDetector>,
  resolver: Arc<ConflictResolver<Arc<dyn VectorStore>>>,
  extractor: Arc<FactExtractor<Arc<dyn LlmProvider>>>,
  search_service: Arc<EpisodeSearchService<Arc<dyn Embedder>, Arc<dyn VectorStore>>>,
  scorer: Arc<TemporalScorer>,
  session: Arc<Mutex<SessionState>>,
}

impl Orchestrator {
  /// Fails only on construction-time misconfiguration (§7
  /// `WorkspaceMisconfig`); everything past this point is a per-job
  /// failure the caller handles at job granularity.
  pub async fn new(workspace_id: impl Into<String>, workspace_path: impl Into<String>, config: EngineConfig, embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, llm: Arc<dyn LlmProvider>) -> Result<Self, EngineError> {
    Self::with_collaborators(workspace_id, workspace_path, config, embedder, store, llm, Arc::new(NullHintsProvider), Arc::new(NullSink)).await
  }

  pub async fn with_collaborators(
    workspace_id: impl Into<String>,
    workspace_path: impl Into<String>,
    config: EngineConfig,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmProvider>,
    hints_provider: Arc<dyn HintsProvider>,
    sink: Arc<dyn TaskUpdateSink>,
  ) -> Result<Self, EngineError> {
    let workspace_path = workspace_path.into();
    if workspace_path.trim().is_empty() {
      return Err(EngineError::WorkspaceMisconfig("workspace_path must not be empty".to_string()));
    }

    store.ensure_collection().await?;

    let detector = EpisodeDetector::new(config.episode.clone()).with_embedder(embedder.clone()).with_llm(llm.clone());
    let resolver = ConflictResolver::new(store.clone(), config.conflict.clone());
    let extractor = FactExtractor::new(llm.clone(), config.prompt_budget_tokens);
    let search_service = EpisodeSearchService::new(embedder.clone(), store.clone());
    let scorer = TemporalScorer::new(config.temporal.clone());

    Ok(Self {
      workspace_id: workspace_id.into(),
      workspace_path,
      config,
      state: Arc::new(StateManager::new()),
      sink,
      queue: WorkQueue::spawn(),
      embedder,
      store,
      hints_provider,
      detector: Arc::new(detector),
      resolver: Arc::new(resolver),
      extractor: Arc::new(extractor),
      search_service: Arc::new(search_service),
      scorer: Arc::new(scorer),
      session: Arc::new(Mutex::new(SessionState { messages: Vec::new() })),
    })
  }

  #[must_use]
  pub fn state(&self) -> Arc<StateManager> {
    self.state.clone()
  }

  #[must_use]
  pub fn scorer(&self) -> Arc<TemporalScorer> {
    self.scorer.clone()
  }

  /// Appends a turn to the session, re-segments it into episodes,
  /// extracts facts from the new turn, resolves each against the store,
  /// and applies the resulting actions (§4.7 apply-action contract).
  /// A no-op returning an empty outcome while conversation memory is
  /// disabled.
  pub async fn on_turn(&self, turn: TurnInput) -> Result<TurnOutcome, EngineError> {
    if !self.config.conversation_memory_enabled {
      return Ok(TurnOutcome { episode_id: String::new(), actions: Vec::new(), errors: Vec::new() });
    }

    let workspace_id = self.workspace_id.clone();
    let workspace_path = self.workspace_path.clone();
    let hints = self.hints_provider.hints(&workspace_id).capped();
    let embedder = self.embedder.clone();
    let store = self.store.clone();
    let detector = self.detector.clone();
    let resolver = self.resolver.clone();
    let extractor = self.extractor.clone();
    let state = self.state.clone();
    let sink = self.sink.clone();
    let session = self.session.clone();
    let now = Utc::now();

    self
      .queue
      .submit(async move {
        state.start_indexing("processing turn");

        let messages = {
          let mut session = session.lock().await;
          session.messages.push(turn.user_message.clone());
          session.messages.push(turn.assistant_message.clone());
          session.messages.clone()
        };

        let episodes = detector.detect(&messages, &workspace_id, turn.project_context.as_ref(), &hints).await;
        let episode_id = episodes.last().map(|e| e.episode_id.clone()).unwrap_or_default();
        let conversation_context = episodes.last().and_then(|e| e.context_description.clone());

        sink.emit(EngineEvent::ExtractStarted { episode_id: episode_id.clone() });

        let window = ExtractionWindow {
          messages: vec![turn.user_message.clone(), turn.assistant_message.clone()],
          tool: turn.tool.clone(),
        };
        let facts = extractor.extract(&window).await;

        sink.emit(EngineEvent::ExtractCompleted { episode_id: episode_id.clone(), facts_found: facts.len() });
        sink.emit(EngineEvent::StoreStarted { episode_id: episode_id.clone() });

        let mut actions = Vec::new();
        let mut errors = Vec::new();

        for mut fact in facts {
          fact.episode_id = Some(episode_id.clone());
          if fact.reference_time.is_none() {
            fact.reference_time = Some(now);
          }

          let embedding = match embedder.embed(&fact.content).await {
            Ok(embedding) => embedding,
            Err(error) => {
              errors.push(format!("embedding failed for fact: {error}"));
              continue;
            }
          };
          let fact = fact.with_embedding(embedding);

          let resolved = match resolver.resolve(fact, &workspace_path).await {
            Ok(resolved) => resolved,
            Err(error) => {
              errors.push(format!("conflict resolution failed: {error}"));
              continue;
            }
          };

          for action in resolved {
            match apply_action(&store, action.clone(), &workspace_id, &workspace_path, turn.project_context.as_ref(), conversation_context.as_deref(), now).await {
              Ok(()) => actions.push(action),
              Err(error) => errors.push(format!("failed to apply {}: {error}", action.kind())),
            }
          }
        }

        if errors.is_empty() {
          sink.emit(EngineEvent::StoreCompleted { episode_id: episode_id.clone(), facts_written: actions.len() });
          state.mark_indexed("turn processed");
        } else {
          sink.emit(EngineEvent::StoreFailed { episode_id: episode_id.clone(), reason: errors.join("; ") });
          state.mark_error(errors.join("; "));
        }

        TurnOutcome { episode_id, actions, errors }
      })
      .await
  }

  /// Embeds `query`, searches the store, and groups the results by
  /// episode. `limit` falls back to the configured default when `None`.
  pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<EpisodeSearchResult>, EngineError> {
    if !self.config.conversation_memory_enabled {
      return Ok(Vec::new());
    }

    let query = query.to_string();
    let limit = limit.unwrap_or(self.config.memory_tool_default_limit);
    let workspace_path = self.workspace_path.clone();
    let search_service = self.search_service.clone();
    let state = self.state.clone();
    let sink = self.sink.clone();

    self
      .queue
      .submit(async move {
        state.start_indexing("searching");
        sink.emit(EngineEvent::SearchStarted { query: query.clone() });

        match search_service.search_by_episode(&query, &workspace_path, limit).await {
          Ok(results) => {
            sink.emit(EngineEvent::SearchCompleted { query: query.clone(), results: results.len() });
            state.mark_indexed("search complete");
            Ok(results)
          }
          Err(error) => {
            sink.emit(EngineEvent::SearchFailed { query: query.clone(), reason: error.to_string() });
            state.mark_error(error.to_string());
            Err(error)
          }
        }
      })
      .await?
  }

  /// `clearMemoryData` (§4.7): prefers `delete_collection` over
  /// `clear_collection` when the store supports both, then resets session
  /// state and the lifecycle state machine back to `Standby`.
  pub async fn clear(&self) -> Result<(), EngineError> {
    let store = self.store.clone();
    let state = self.state.clone();
    let session = self.session.clone();
    let sink = self.sink.clone();

    self
      .queue
      .submit(async move {
        sink.emit(EngineEvent::SyncStarted);

        let result = match store.delete_collection().await {
          Ok(()) => Ok(()),
          Err(_) => store.clear_collection().await,
        };

        session.lock().await.messages.clear();

        match &result {
          Ok(()) => {
            sink.emit(EngineEvent::SyncCompleted);
            state.clear("memory cleared");
          }
          Err(error) => {
            sink.emit(EngineEvent::SyncFailed { reason: error.to_string() });
            state.mark_error(error.to_string());
          }
        }

        result
      })
      .await?
  }

  /// Idempotent and never throws (§4.7): waits for everything already
  /// queued to finish, then returns regardless of outcome.
  pub async fn finalize(&self) {
    let _ = self.queue.submit(async {}).await;
  }
}

#[allow(clippy::too_many_arguments)]
async fn apply_action(
  store: &Arc<dyn VectorStore>,
  action: MemoryAction,
  workspace_id: &str,
  workspace_path: &str,
  project_context: Option<&ProjectContext>,
  conversation_context: Option<&str>,
  now: DateTime<Utc>,
) -> Result<(), EngineError> {
  match action {
    MemoryAction::Add(input) => {
      let fact = build_fact(input, workspace_id, workspace_path, project_context, conversation_context, now);
      store.insert(vec![fact_to_record(&fact)]).await
    }

    MemoryAction::Ignore { target_id, .. } => store.update(&target_id, Patch::new().with("last_confirmed", Value::String(now.to_rfc3339()))).await,

    MemoryAction::Supersede { candidate, target_ids } => {
      let fact = build_fact(candidate, workspace_id, workspace_path, project_context, conversation_context, now);
      store.insert(vec![fact_to_record(&fact)]).await?;
      for target_id in target_ids {
        store
          .update(&target_id, Patch::new().with("superseded_by", Value::String(fact.id.clone())).with("superseded_at", Value::String(now.to_rfc3339())))
          .await?;
      }
      Ok(())
    }

    MemoryAction::DeleteExisting { candidate, target_ids } => {
      let fact = build_fact(candidate, workspace_id, workspace_path, project_context, conversation_context, now);
      store.insert(vec![fact_to_record(&fact)]).await?;
      for target_id in target_ids {
        store.update(&target_id, Patch::new().with("resolved", Value::Bool(true)).with("resolved_at", Value::String(now.to_rfc3339()))).await?;
      }
      Ok(())
    }

    MemoryAction::Update(fact) => store.insert(vec![fact_to_record(&fact)]).await,
  }
}

fn build_fact(input: CategorizedFactInput, workspace_id: &str, workspace_path: &str, project_context: Option<&ProjectContext>, conversation_context: Option<&str>, now: DateTime<Utc>) -> ConversationFact {
  let mut fact = ConversationFact::from_input(input, workspace_id, now);
  fact.workspace_path = Some(workspace_path.to_string());
  fact.project_context = project_context.cloned();
  fact.conversation_context = conversation_context.map(str::to_string);
  fact
}

fn fact_to_record(fact: &ConversationFact) -> StoreRecord {
  let vector = fact.embedding.clone().unwrap_or_default();
  let payload = serde_json::to_value(fact).unwrap_or(Value::Null);
  StoreRecord::new(fact.id.clone(), vector, payload)
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use mnemo_shared::MessageRole;
  use mnemo_store::InMemoryVectorStore;

  use super::*;

  struct FixedEmbedder;

  #[async_trait]
  impl Embedder for FixedEmbedder {
    fn dimension(&self) -> usize {
      2
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EngineError> {
      Ok(vec![1.0, 0.0])
    }
  }

  struct FactLlm;

  #[async_trait]
  impl LlmProvider for FactLlm {
    async fn generate_json(&self, _prompt: &str, _opts: mnemo_ai::GenerateOptions) -> Result<String, EngineError> {
      Ok("{\"facts\":[{\"content\":\"Using session-based authentication\",\"category\":\"architecture\",\"confidence\":0.9}]}".to_string())
    }

    async fn generate_text(&self, _prompt: &str, _opts: mnemo_ai::GenerateOptions) -> Result<String, EngineError> {
      Ok("ok".to_string())
    }

    fn model(&self) -> &str {
      "fact-llm-test-model"
    }
  }

  fn turn() -> TurnInput {
    TurnInput {
      user_message: Message::new(MessageRole::User, "switch auth to sessions"),
      assistant_message: Message::new(MessageRole::Assistant, "done, now using session-based auth"),
      tool: None,
      project_context: None,
    }
  }

  async fn orchestrator(enabled: bool) -> Orchestrator {
    let mut config = EngineConfig::default();
    config.conversation_memory_enabled = enabled;
    Orchestrator::new("workspace-1", "/workspace/one", config, Arc::new(FixedEmbedder), Arc::new(InMemoryVectorStore::default()) as Arc<dyn VectorStore>, Arc::new(FactLlm)).await.unwrap()
  }

  #[tokio::test]
  async fn disabled_engine_is_a_no_op() {
    let orchestrator = orchestrator(false).await;
    let outcome = orchestrator.on_turn(turn()).await.unwrap();
    assert!(outcome.actions.is_empty());
    assert!(outcome.episode_id.is_empty());
  }

  #[tokio::test]
  async fn enabled_engine_extracts_and_stores_a_fact() {
    let orchestrator = orchestrator(true).await;
    let outcome = orchestrator.on_turn(turn()).await.unwrap();

    assert!(!outcome.episode_id.is_empty());
    assert_eq!(outcome.actions.len(), 1);
    assert!(matches!(outcome.actions[0], MemoryAction::Add(_)));
    assert!(outcome.errors.is_empty());
    assert_eq!(orchestrator.state().current().state, crate::state_manager::EngineState::Indexed);
  }

  #[tokio::test]
  async fn stored_facts_carry_source_model_and_conversation_context() {
    let store = Arc::new(InMemoryVectorStore::default());
    let mut config = EngineConfig::default();
    config.conversation_memory_enabled = true;
    let orchestrator = Orchestrator::new("workspace-1", "/workspace/one", config, Arc::new(FixedEmbedder), store.clone() as Arc<dyn VectorStore>, Arc::new(FactLlm)).await.unwrap();

    orchestrator.on_turn(turn()).await.unwrap();

    let records = store.filter(&mnemo_store::Filter::workspace_path("/workspace/one"), None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload["source_model"], "fact-llm-test-model");
    assert!(records[0].payload["conversation_context"].is_string());
  }

  #[tokio::test]
  async fn search_finds_the_fact_extracted_by_a_prior_turn() {
    let orchestrator = orchestrator(true).await;
    orchestrator.on_turn(turn()).await.unwrap();

    let results = orchestrator.search("authentication", None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].facts.len(), 1);
  }

  #[tokio::test]
  async fn clear_empties_the_store() {
    let orchestrator = orchestrator(true).await;
    orchestrator.on_turn(turn()).await.unwrap();
    orchestrator.clear().await.unwrap();

    let results = orchestrator.search("authentication", None).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(orchestrator.state().current().state, crate::state_manager::EngineState::Standby);
  }

  #[tokio::test]
  async fn finalize_is_idempotent() {
    let orchestrator = orchestrator(true).await;
    orchestrator.finalize().await;
    orchestrator.finalize().await;
  }

  #[tokio::test]
  async fn empty_workspace_path_is_rejected_at_construction() {
    let result = Orchestrator::new("workspace-1", "   ", EngineConfig::default(), Arc::new(FixedEmbedder), Arc::new(InMemoryVectorStore::default()) as Arc<dyn VectorStore>, Arc::new(FactLlm)).await;
    assert!(matches!(result, Err(EngineError::WorkspaceMisconfig(_))));
  }
}
