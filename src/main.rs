use std::env;
use std::sync::Arc;

use mnemo::{EngineConfig, Message, MessageRole, OpenAiEmbedder, OpenAiEmbedderConfig, OpenAiLlmConfig, OpenAiLlmProvider, Orchestrator, TimeoutLlmProvider, TurnInput};
use mnemo_store::InMemoryVectorStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Minimal host wiring: one workspace, an in-memory store, and the OpenAI
/// adapters, driven through one turn and a search. Real hosts own their
/// own persistence and UI; this only demonstrates the entry points.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let api_key = env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
  let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
  let chat_model = env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
  let embedding_model = env::var("OPENAI_EMBEDDING_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string());

  let embedder = Arc::new(OpenAiEmbedder::new(OpenAiEmbedderConfig {
    api_key: api_key.clone(),
    base_url: base_url.clone(),
    model: embedding_model,
    dimensions: 1536,
  }));
  let llm = Arc::new(TimeoutLlmProvider::new(OpenAiLlmProvider::new(OpenAiLlmConfig { api_key, base_url, model: chat_model })));
  let store = Arc::new(InMemoryVectorStore::default());

  let config = EngineConfig {
    conversation_memory_enabled: true,
    ..EngineConfig::default()
  };

  let orchestrator = Orchestrator::new("demo-workspace", "/home/user/demo-workspace", config, embedder, store, llm).await?;

  orchestrator
    .on_turn(TurnInput {
      user_message: Message::new(MessageRole::User, "let's switch authentication to session cookies instead of JWT"),
      assistant_message: Message::new(MessageRole::Assistant, "done, the app now issues session cookies and validates them on each request"),
      tool: None,
      project_context: None,
    })
    .await?;

  let results = orchestrator.search("how does authentication work", None).await?;
  for result in results {
    tracing::info!(episode = %result.episode_id, relevance = result.relevance, "recalled episode");
    for fact in result.facts {
      tracing::info!(content = %fact.content, category = %fact.category, "recalled fact");
    }
  }

  orchestrator.finalize().await;
  Ok(())
}
