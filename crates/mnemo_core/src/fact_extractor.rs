use mnemo_ai::{GenerateOptions, LlmProvider};
use mnemo_shared::Message;

use crate::category::FactCategory;
use crate::fact::CategorizedFactInput;

const SYSTEM_DIRECTIVE: &str = "Return a single JSON object. No prose, no markdown fences. If you cannot produce JSON, return {}.";
const CHARS_PER_TOKEN: f32 = 4.0;

/// A tool call the host wants folded into the extraction window (§4.5).
#[derive(Debug, Clone)]
pub struct ToolInvocation {
  pub name: String,
  pub params: String,
  pub result_text: String,
}

/// Everything the extractor considers for one turn: the recent message
/// window plus an optional tool invocation that produced the assistant's
/// response.
#[derive(Debug, Clone)]
pub struct ExtractionWindow {
  pub messages: Vec<Message>,
  pub tool: Option<ToolInvocation>,
}

/// Builds a prompt from a message window, calls the LLM, and parses
/// `{facts: [...]}` (§4.5 / C5). Never returns an error: malformed or
/// empty output is a normal zero-fact outcome, not a failure.
pub struct FactExtractor<P: LlmProvider> {
  llm: P,
  prompt_budget_tokens: usize,
}

impl<P: LlmProvider> FactExtractor<P> {
  #[must_use]
  pub fn new(llm: P, prompt_budget_tokens: usize) -> Self {
    Self { llm, prompt_budget_tokens }
  }

  pub async fn extract(&self, window: &ExtractionWindow) -> Vec<CategorizedFactInput> {
    let prompt = build_prompt(window, self.prompt_budget_tokens);

    let raw = match self.llm.generate_json(&prompt, GenerateOptions { temperature: Some(0.0), max_tokens: None }).await {
      Ok(raw) => raw,
      Err(error) => {
        tracing::debug!(%error, "fact extraction call failed, treating as zero facts");
        return Vec::new();
      }
    };

    let model = self.llm.model().to_string();
    parse_facts(&raw).into_iter().map(|mut fact| {
      fact.source_model = Some(model.clone());
      fact
    }).collect()
  }
}

fn build_prompt(window: &ExtractionWindow, budget_tokens: usize) -> String {
  let mut messages = window.messages.clone();

  // Best-effort token-budget truncation: drop the oldest window entries
  // first, then fall back to truncating the tool result text, since the
  // most recent turn is always the one extraction cares most about.
  while messages.len() > 1 && estimate_tokens(&render(&messages, window.tool.as_ref())) > budget_tokens {
    messages.remove(0);
  }

  let mut tool = window.tool.clone();
  if let Some(invocation) = &mut tool {
    while estimate_tokens(&render(&messages, Some(invocation))) > budget_tokens && invocation.result_text.len() > 64 {
      let keep = invocation.result_text.len() - invocation.result_text.len() / 4;
      invocation.result_text.truncate(keep);
    }
  }

  format!("{SYSTEM_DIRECTIVE}\n\n{}", render(&messages, tool.as_ref()))
}

fn render(messages: &[Message], tool: Option<&ToolInvocation>) -> String {
  let mut lines = Vec::new();

  for (i, message) in messages.iter().enumerate() {
    let is_last = i == messages.len() - 1;
    if is_last {
      if let Some(tool) = tool {
        lines.push(format!("TOOL: {}({})", tool.name, tool.params));
        lines.push(format!("TOOL_OUT: {}", tool.result_text));
      }
    }
    lines.push(format!("{}: {}", message.role, message.content));
  }

  lines.join("\n")
}

fn estimate_tokens(text: &str) -> usize {
  (text.chars().count() as f32 / CHARS_PER_TOKEN).ceil() as usize
}

/// Strip fences, parse, salvage, give up to an empty list — never a hard
/// error (§4.5 parsing policy).
fn parse_facts(raw: &str) -> Vec<CategorizedFactInput> {
  let Some(value) = mnemo_ai::salvage_json(raw) else {
    return Vec::new();
  };

  let Some(facts) = value.get("facts").and_then(|v| v.as_array()) else {
    return Vec::new();
  };

  facts.iter().filter_map(parse_one_fact).collect()
}

fn parse_one_fact(value: &serde_json::Value) -> Option<CategorizedFactInput> {
  let content = value.get("content")?.as_str()?.to_string();
  let category: FactCategory = value.get("category")?.as_str()?.parse().ok()?;
  let confidence = value.get("confidence")?.as_f64()? as f32;

  let fact = CategorizedFactInput::new(content, category, confidence);
  fact.is_valid().then_some(fact)
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use mnemo_shared::{EngineError, MessageRole};

  use super::*;

  struct StubLlm(String);

  #[async_trait]
  impl LlmProvider for StubLlm {
    async fn generate_json(&self, _prompt: &str, _opts: GenerateOptions) -> Result<String, EngineError> {
      Ok(self.0.clone())
    }

    async fn generate_text(&self, _prompt: &str, _opts: GenerateOptions) -> Result<String, EngineError> {
      unreachable!()
    }

    fn model(&self) -> &str {
      "stub-model"
    }
  }

  fn window() -> ExtractionWindow {
    ExtractionWindow {
      messages: vec![Message::new(MessageRole::User, "switch auth to sessions"), Message::new(MessageRole::Assistant, "done, using session-based auth now")],
      tool: None,
    }
  }

  #[tokio::test]
  async fn parses_well_formed_facts() {
    let extractor = FactExtractor::new(StubLlm("{\"facts\":[{\"content\":\"Using session-based authentication\",\"category\":\"architecture\",\"confidence\":0.9}]}".to_string()), 400);
    let facts = extractor.extract(&window()).await;
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].content, "Using session-based authentication");
  }

  #[tokio::test]
  async fn facts_are_tagged_with_the_provider_model() {
    let extractor = FactExtractor::new(StubLlm("{\"facts\":[{\"content\":\"Using session-based authentication\",\"category\":\"architecture\",\"confidence\":0.9}]}".to_string()), 400);
    let facts = extractor.extract(&window()).await;
    assert_eq!(facts[0].source_model.as_deref(), Some("stub-model"));
  }

  #[tokio::test]
  async fn malformed_json_yields_zero_facts_not_an_error() {
    let extractor = FactExtractor::new(StubLlm("I cannot produce valid JSON here".to_string()), 400);
    let facts = extractor.extract(&window()).await;
    assert!(facts.is_empty());
  }

  #[tokio::test]
  async fn empty_object_yields_zero_facts() {
    let extractor = FactExtractor::new(StubLlm("{}".to_string()), 400);
    let facts = extractor.extract(&window()).await;
    assert!(facts.is_empty());
  }

  #[tokio::test]
  async fn invalid_category_is_dropped() {
    let extractor = FactExtractor::new(StubLlm("{\"facts\":[{\"content\":\"x\",\"category\":\"nonsense\",\"confidence\":0.5}]}".to_string()), 400);
    let facts = extractor.extract(&window()).await;
    assert!(facts.is_empty());
  }

  #[tokio::test]
  async fn out_of_range_confidence_is_dropped() {
    let extractor = FactExtractor::new(StubLlm("{\"facts\":[{\"content\":\"x\",\"category\":\"pattern\",\"confidence\":1.5}]}".to_string()), 400);
    let facts = extractor.extract(&window()).await;
    assert!(facts.is_empty());
  }

  #[tokio::test]
  async fn tool_lines_precede_the_assistant_message() {
    let window = ExtractionWindow {
      messages: vec![Message::new(MessageRole::User, "run the tests"), Message::new(MessageRole::Assistant, "tests pass")],
      tool: Some(ToolInvocation { name: "run_tests".to_string(), params: "{}".to_string(), result_text: "3 passed".to_string() }),
    };
    let prompt = build_prompt(&window, 4000);
    let tool_pos = prompt.find("TOOL: run_tests").unwrap();
    let assistant_pos = prompt.find("assistant: tests pass").unwrap();
    assert!(tool_pos < assistant_pos);
  }
}
