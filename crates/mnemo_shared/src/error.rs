/// The engine's error surface (§7).
///
/// Unlike the teacher's `AppError` — an `anyhow`-wrapped struct carrying
/// an HTTP status code for its axum handlers — this engine has no HTTP
/// surface, so each §7 error kind gets its own variant. Construction-time
/// misconfiguration is fatal; everything else is recoverable by the
/// caller at job granularity.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// Transient failure from the embedder, LLM, or vector store. Retried
  /// by the host at job granularity; the engine does not mutate state.
  #[error("provider error: {0}")]
  Provider(#[source] anyhow::Error),

  /// The LLM produced output that could not be parsed or salvaged as
  /// JSON. Never fatal — callers fall back to an empty/default result.
  #[error("malformed LLM output: {0}")]
  MalformedOutput(String),

  /// A fact failed post-extraction validation (bad category, confidence
  /// out of range, empty content). Dropped silently by the caller.
  #[error("invalid fact: {0}")]
  InvalidFact(String),

  /// The engine was constructed without a usable workspace path.
  #[error("workspace misconfigured: {0}")]
  WorkspaceMisconfig(String),

  /// `clearMemoryData` failed to delete or clear the underlying
  /// collection. The original cause is preserved.
  #[error("store deletion failed: {0}")]
  StoreDeletion(#[source] anyhow::Error),

  /// Anything else, wrapped so internal code can keep using
  /// `anyhow::anyhow!` / `.context()` the way the teacher does.
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl EngineError {
  #[must_use]
  pub fn provider(err: impl Into<anyhow::Error>) -> Self {
    Self::Provider(err.into())
  }

  #[must_use]
  pub fn store_deletion(err: impl Into<anyhow::Error>) -> Self {
    Self::StoreDeletion(err.into())
  }
}
