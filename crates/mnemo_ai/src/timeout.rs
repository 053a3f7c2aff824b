use std::time::Duration;

use async_trait::async_trait;
use mnemo_shared::EngineError;

use crate::llm_provider::{GenerateOptions, LlmProvider};

/// Wall-clock budget for a single LLM call (§5). Extraction, conflict
/// resolution, and boundary refinement each make at most one call per
/// turn against this deadline.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Wraps any `LlmProvider` with a wall-clock deadline. On timeout,
/// `generate_json` returns `"{}"` so extraction callers can treat it as an
/// empty result without a separate error branch; `generate_text` returns
/// an error since its callers each need their own fallback text.
pub struct TimeoutLlmProvider<P: LlmProvider> {
  inner: P,
  timeout: Duration,
}

impl<P: LlmProvider> TimeoutLlmProvider<P> {
  pub fn new(inner: P) -> Self {
    Self {
      inner,
      timeout: DEFAULT_LLM_TIMEOUT,
    }
  }

  pub fn with_timeout(inner: P, timeout: Duration) -> Self {
    Self { inner, timeout }
  }
}

#[async_trait]
impl<P: LlmProvider> LlmProvider for TimeoutLlmProvider<P> {
  async fn generate_json(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError> {
    match tokio::time::timeout(self.timeout, self.inner.generate_json(prompt, opts)).await {
      Ok(result) => result,
      Err(_) => Ok("{}".to_string()),
    }
  }

  async fn generate_text(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError> {
    match tokio::time::timeout(self.timeout, self.inner.generate_text(prompt, opts)).await {
      Ok(result) => result,
      Err(_) => Err(EngineError::provider(anyhow::anyhow!(
        "LLM call exceeded {:?} timeout",
        self.timeout
      ))),
    }
  }

  fn model(&self) -> &str {
    self.inner.model()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use super::*;

  struct SlowProvider {
    delay: Duration,
    calls: Arc<AtomicUsize>,
  }

  #[async_trait]
  impl LlmProvider for SlowProvider {
    async fn generate_json(&self, _prompt: &str, _opts: GenerateOptions) -> Result<String, EngineError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(self.delay).await;
      Ok("{\"ok\":true}".to_string())
    }

    async fn generate_text(&self, _prompt: &str, _opts: GenerateOptions) -> Result<String, EngineError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(self.delay).await;
      Ok("done".to_string())
    }

    fn model(&self) -> &str {
      "slow-test-model"
    }
  }

  #[tokio::test(start_paused = true)]
  async fn generate_json_times_out_to_empty_object() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = TimeoutLlmProvider::with_timeout(
      SlowProvider {
        delay: Duration::from_secs(60),
        calls: calls.clone(),
      },
      Duration::from_secs(1),
    );

    let result = provider.generate_json("prompt", GenerateOptions::default()).await.unwrap();
    assert_eq!(result, "{}");
  }

  #[tokio::test(start_paused = true)]
  async fn generate_text_times_out_to_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = TimeoutLlmProvider::with_timeout(
      SlowProvider {
        delay: Duration::from_secs(60),
        calls: calls.clone(),
      },
      Duration::from_secs(1),
    );

    let result = provider.generate_text("prompt", GenerateOptions::default()).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn fast_call_passes_through_unaffected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = TimeoutLlmProvider::new(SlowProvider {
      delay: Duration::from_millis(1),
      calls,
    });

    let result = provider.generate_json("prompt", GenerateOptions::default()).await.unwrap();
    assert_eq!(result, "{\"ok\":true}");
  }
}
