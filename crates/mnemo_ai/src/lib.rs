mod embedder;
pub use embedder::Embedder;

mod llm_provider;
pub use llm_provider::{GenerateOptions, LlmProvider};

mod timeout;
pub use timeout::{DEFAULT_LLM_TIMEOUT, TimeoutLlmProvider};

mod openai_embedder;
pub use openai_embedder::{OpenAiEmbedder, OpenAiEmbedderConfig};

mod openai_llm;
pub use openai_llm::{OpenAiLlmConfig, OpenAiLlmProvider};

mod json_salvage;
pub use json_salvage::salvage_json;
