use std::sync::Arc;

use async_trait::async_trait;
use mnemo_shared::EngineError;

/// The embedding capability (§6). `dimension` is authoritative: the engine
/// refuses to store embeddings of any other size.
#[async_trait]
pub trait Embedder: Send + Sync {
  fn dimension(&self) -> usize;

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError>;

  /// Batched embedding. The default implementation calls `embed` once per
  /// input; adapters with a real batch API (like the OpenAI one) should
  /// override this to issue a single call.
  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
    let mut out = Vec::with_capacity(texts.len());
    for text in texts {
      out.push(self.embed(text).await?);
    }
    Ok(out)
  }
}

/// See the matching `Arc<dyn LlmProvider>` impl for why this exists.
#[async_trait]
impl Embedder for Arc<dyn Embedder> {
  fn dimension(&self) -> usize {
    (**self).dimension()
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
    (**self).embed(text).await
  }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
    (**self).embed_batch(texts).await
  }
}
