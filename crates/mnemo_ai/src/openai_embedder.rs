use anyhow::anyhow;
use async_openai::config::OpenAIConfig;
use async_openai::types::embeddings::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use mnemo_shared::EngineError;

use crate::embedder::Embedder;

/// Explicit construction config for [`OpenAiEmbedder`]. Unlike the teacher's
/// `LazyLock<AppEnv>` static, this is a plain struct the host builds and
/// passes in — the engine never reaches into the process environment
/// itself.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub dimensions: u32,
}

pub struct OpenAiEmbedder {
  client: Client<OpenAIConfig>,
  model: String,
  dimensions: u32,
}

impl OpenAiEmbedder {
  #[must_use]
  pub fn new(config: OpenAiEmbedderConfig) -> Self {
    let openai_config = OpenAIConfig::new().with_api_key(config.api_key).with_api_base(config.base_url);

    Self {
      client: Client::with_config(openai_config),
      model: config.model,
      dimensions: config.dimensions,
    }
  }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
  fn dimension(&self) -> usize {
    self.dimensions as usize
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
    let request = CreateEmbeddingRequestArgs::default()
      .model(&self.model)
      .input(text)
      .dimensions(self.dimensions)
      .build()
      .map_err(EngineError::provider)?;

    let embedding = self
      .client
      .embeddings()
      .create(request)
      .await
      .map_err(EngineError::provider)?
      .data
      .into_iter()
      .map(|e| e.embedding)
      .next()
      .ok_or_else(|| EngineError::provider(anyhow!("empty embedding response")))?;

    Ok(embedding)
  }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    let request = CreateEmbeddingRequestArgs::default()
      .model(&self.model)
      .input(texts.to_vec())
      .dimensions(self.dimensions)
      .build()
      .map_err(EngineError::provider)?;

    let mut data = self.client.embeddings().create(request).await.map_err(EngineError::provider)?.data;
    data.sort_by_key(|e| e.index);

    if data.len() != texts.len() {
      return Err(EngineError::provider(anyhow!(
        "embedding count mismatch: expected {}, got {}",
        texts.len(),
        data.len()
      )));
    }

    Ok(data.into_iter().map(|e| e.embedding).collect())
  }
}
