use mnemo_ai::{GenerateOptions, LlmProvider};
use mnemo_shared::Message;

const MAX_MESSAGE_CHARS: usize = 400;
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 500;

/// Sanitized refinement output. `boundaries` always starts with 0, is
/// deduplicated, sorted, and within `[0, message_count)`.
pub struct RefinedBoundaries {
  pub boundaries: Vec<usize>,
  pub titles: Vec<String>,
}

/// Asks the LLM to confirm episode boundaries (§4.4 step 5). Returns
/// `None` on any failure — malformed JSON, an empty response, an
/// unreachable provider — so the caller falls back to the preliminary
/// episodes without treating this as an error.
pub async fn refine_boundaries<P: LlmProvider>(llm: &P, messages: &[Message]) -> Option<RefinedBoundaries> {
  if messages.is_empty() {
    return None;
  }

  let prompt = build_prompt(messages);

  let raw = llm.generate_json(&prompt, GenerateOptions { temperature: Some(TEMPERATURE), max_tokens: Some(MAX_TOKENS) }).await.ok()?;
  let value = mnemo_ai::salvage_json(&raw)?;

  let raw_boundaries: Vec<i64> = value.get("boundaries")?.as_array()?.iter().filter_map(|v| v.as_i64()).collect();

  let raw_titles: Vec<String> = value.get("titles").and_then(|v| v.as_array()).map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()).unwrap_or_default();

  let message_count = messages.len() as i64;
  let mut boundaries: Vec<usize> = raw_boundaries.into_iter().filter(|&i| (0..message_count).contains(&i)).map(|i| i as usize).collect();

  boundaries.push(0);
  boundaries.sort_unstable();
  boundaries.dedup();

  Some(RefinedBoundaries { boundaries, titles: raw_titles })
}

fn build_prompt(messages: &[Message]) -> String {
  let entries: Vec<String> = messages
    .iter()
    .enumerate()
    .map(|(i, message)| {
      let truncated: String = message.content.chars().take(MAX_MESSAGE_CHARS).collect();
      let escaped = truncated.replace('"', "\\\"");
      format!("{{\"i\":{i},\"role\":\"{}\",\"t\":{},\"c\":\"{escaped}\"}}", message.role, message.effective_timestamp().timestamp())
    })
    .collect();

  format!(
    "Given this conversation, identify episode boundaries. Return JSON {{\"boundaries\": [int], \"titles\": [string]}}.\nMessages:\n[{}]",
    entries.join(",\n")
  )
}
