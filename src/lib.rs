//! Public facade. A host embeds this crate by implementing [`Embedder`],
//! [`VectorStore`], and [`LlmProvider`] (or reusing the OpenAI/in-memory
//! adapters already provided) and driving an [`Orchestrator`] through
//! `on_turn` / `search` / `clear` / `finalize`.

pub use mnemo_ai::{Embedder, GenerateOptions, LlmProvider, OpenAiEmbedder, OpenAiEmbedderConfig, OpenAiLlmConfig, OpenAiLlmProvider, TimeoutLlmProvider};
pub use mnemo_core::{
  CategorizedFactInput, ConflictThresholds, ConversationFact, Episode, EpisodeConfig, EpisodeSearchHit, EpisodeSearchResult, FactCategory, Hints, HintsProvider, LifecycleState, MemoryAction,
  NullHintsProvider, TemporalScorerConfig, ToolInvocation,
};
pub use mnemo_orchestrator::{EngineConfig, EngineEvent, EngineState, NullSink, Orchestrator, Progress, ProgressEvent, StateManager, TaskUpdateSink, TurnInput, TurnOutcome};
pub use mnemo_shared::{EngineError, Message, MessageRole, ProjectContext};
pub use mnemo_store::{Filter, FilterValue, InMemoryVectorStore, Patch, SearchHit, StoreRecord, VectorStore};
