use mnemo_ai::{GenerateOptions, LlmProvider};
use mnemo_shared::{Message, ProjectContext};

use crate::hints::Hints;

const MAX_MESSAGE_CHARS: usize = 300;
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 80;

/// Produces a short label for an episode (§4.3 / C3). Degrades gracefully:
/// any failure to call or parse the LLM yields a generic fallback instead
/// of propagating an error, since a missing description never blocks a
/// turn.
pub struct EpisodeContextGenerator<P: LlmProvider> {
  llm: P,
}

impl<P: LlmProvider> EpisodeContextGenerator<P> {
  #[must_use]
  pub fn new(llm: P) -> Self {
    Self { llm }
  }

  pub async fn describe(&self, messages: &[Message], project_context: Option<&ProjectContext>, hints: &Hints) -> String {
    let fallback = || format!("Episode with {} messages", messages.len());

    if messages.is_empty() {
      return fallback();
    }

    let prompt = build_prompt(messages, project_context, hints);

    let raw = match self.llm.generate_json(&prompt, GenerateOptions { temperature: Some(TEMPERATURE), max_tokens: Some(MAX_TOKENS) }).await {
      Ok(raw) => raw,
      Err(error) => {
        tracing::debug!(%error, "episode context generation failed, using fallback");
        return fallback();
      }
    };

    match mnemo_ai::salvage_json(&raw) {
      Some(value) => {
        let description = value
          .get("description")
          .and_then(|v| v.as_str())
          .or_else(|| value.get("summary").and_then(|v| v.as_str()))
          .map(str::trim)
          .filter(|s| !s.is_empty());

        match description {
          Some(description) => description.to_string(),
          None => fallback(),
        }
      }
      None => {
        tracing::debug!("episode context response was not salvageable JSON");
        fallback()
      }
    }
  }
}

fn build_prompt(messages: &[Message], project_context: Option<&ProjectContext>, hints: &Hints) -> String {
  let mut prompt = String::new();

  if let Some(project) = project_context {
    prompt.push_str(&format!("Project: {}", project.workspace_name));
    if let Some(language) = &project.framework {
      prompt.push_str(&format!(" ({language})"));
    }
    prompt.push('\n');
  }

  let fragment = hints.to_prompt_fragment();
  if !fragment.is_empty() {
    prompt.push_str(&fragment);
    prompt.push('\n');
  }

  prompt.push_str("Conversation:\n");
  for message in messages {
    let truncated: String = message.content.chars().take(MAX_MESSAGE_CHARS).collect();
    prompt.push_str(&format!("{}: {}\n", message.role, truncated));
  }

  prompt.push_str("\nReturn JSON {\"description\": \"...\"} with a label of at most 10 words.");
  prompt
}
