use anyhow::anyhow;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
  ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
  CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;
use mnemo_shared::EngineError;

use crate::llm_provider::{GenerateOptions, LlmProvider};

/// Explicit construction config for [`OpenAiLlmProvider`]; see
/// [`crate::OpenAiEmbedder`] for why this isn't a process-global static.
#[derive(Debug, Clone)]
pub struct OpenAiLlmConfig {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

pub struct OpenAiLlmProvider {
  client: Client<OpenAIConfig>,
  model: String,
}

impl OpenAiLlmProvider {
  #[must_use]
  pub fn new(config: OpenAiLlmConfig) -> Self {
    let openai_config = OpenAIConfig::new().with_api_key(config.api_key).with_api_base(config.base_url);

    Self {
      client: Client::with_config(openai_config),
      model: config.model,
    }
  }

  fn messages(prompt: &str, system: Option<&str>) -> Result<Vec<ChatCompletionRequestMessage>, EngineError> {
    let mut messages = Vec::new();
    if let Some(system) = system {
      messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
          .content(system)
          .build()
          .map_err(EngineError::provider)?
          .into(),
      );
    }
    messages.push(
      ChatCompletionRequestUserMessageArgs::default()
        .content(prompt)
        .build()
        .map_err(EngineError::provider)?
        .into(),
    );
    Ok(messages)
  }

  async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>, opts: GenerateOptions, json_mode: bool) -> Result<String, EngineError> {
    let mut builder = CreateChatCompletionRequestArgs::default();
    builder.model(&self.model).messages(messages);

    if let Some(temperature) = opts.temperature {
      builder.temperature(temperature);
    }
    if let Some(max_tokens) = opts.max_tokens {
      builder.max_completion_tokens(max_tokens);
    }
    if json_mode {
      builder.response_format(ResponseFormat::JsonObject);
    }

    let request = builder.build().map_err(EngineError::provider)?;

    self
      .client
      .chat()
      .create(request)
      .await
      .map_err(EngineError::provider)?
      .choices
      .into_iter()
      .find_map(|c| c.message.content)
      .ok_or_else(|| EngineError::provider(anyhow!("empty message content")))
  }
}

#[async_trait]
impl LlmProvider for OpenAiLlmProvider {
  async fn generate_json(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError> {
    let messages = Self::messages(prompt, None)?;
    self.complete(messages, opts, true).await
  }

  async fn generate_text(&self, prompt: &str, opts: GenerateOptions) -> Result<String, EngineError> {
    let messages = Self::messages(prompt, None)?;
    self.complete(messages, opts, false).await
  }

  fn model(&self) -> &str {
    &self.model
  }
}
