use std::sync::Arc;

use async_trait::async_trait;
use mnemo_shared::EngineError;

/// Sampling knobs threaded down to the concrete adapter. Every caller in
/// `mnemo_core` picks its own values; the provider never defaults them
/// silently.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
  pub temperature: Option<f32>,
  pub max_tokens: Option<u32>,
}

impl Default for GenerateOptions {
  fn default() -> Self {
    Self {
      temperature: Some(0.0),
      max_tokens: None,
    }
  }
}

/// The LLM capability (§6). Both methods return raw text on success —
/// `generate_json` is still text, not a parsed `Value`, because the engine
/// tolerates prose-wrapped and fenced responses and performs its own
/// salvage (§4.5) rather than pushing that policy into the adapter.
#[async_trait]
pub trait LlmProvider: Send + Sync {
  async fn generate_json(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError>;

  async fn generate_text(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError>;

  /// Identifier recorded on facts as `source_model` (§4.5 step 1).
  fn model(&self) -> &str;
}

/// Lets callers hold a type-erased `Arc<dyn LlmProvider>` anywhere a generic
/// `P: LlmProvider` is expected, which is how the orchestrator and core
/// components share one provider instance across components.
#[async_trait]
impl LlmProvider for Arc<dyn LlmProvider> {
  async fn generate_json(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError> {
    (**self).generate_json(prompt, opts).await
  }

  async fn generate_text(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError> {
    (**self).generate_text(prompt, opts).await
  }

  fn model(&self) -> &str {
    (**self).model()
  }
}
