use serde_json::Value;

/// Recovers a JSON value from an LLM response that may be wrapped in prose
/// or a markdown code fence (§4.5, §7 `MalformedLLMOutput`).
///
/// Tries, in order:
/// 1. The raw text, parsed as-is.
/// 2. The text with a leading ```` ```json ```` / ```` ``` ```` fence and
///    trailing ```` ``` ```` stripped.
/// 3. The substring between the first `{` and the last `}`, inclusive.
///
/// Returns `None` if none of these parse as JSON.
pub fn salvage_json(raw: &str) -> Option<Value> {
  let trimmed = raw.trim();

  if let Ok(value) = serde_json::from_str(trimmed) {
    return Some(value);
  }

  let unfenced = strip_fence(trimmed);
  if let Ok(value) = serde_json::from_str(unfenced) {
    return Some(value);
  }

  let start = unfenced.find('{')?;
  let end = unfenced.rfind('}')?;
  if end < start {
    return None;
  }

  serde_json::from_str(&unfenced[start..=end]).ok()
}

fn strip_fence(text: &str) -> &str {
  let text = text.strip_prefix("```json").or_else(|| text.strip_prefix("```")).unwrap_or(text);
  text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_clean_json() {
    let value = salvage_json("{\"a\":1}").unwrap();
    assert_eq!(value["a"], 1);
  }

  #[test]
  fn strips_markdown_fence() {
    let value = salvage_json("```json\n{\"a\":1}\n```").unwrap();
    assert_eq!(value["a"], 1);
  }

  #[test]
  fn strips_plain_fence() {
    let value = salvage_json("```\n{\"a\":1}\n```").unwrap();
    assert_eq!(value["a"], 1);
  }

  #[test]
  fn salvages_from_surrounding_prose() {
    let value = salvage_json("Sure, here's the result: {\"a\":1} — hope that helps!").unwrap();
    assert_eq!(value["a"], 1);
  }

  #[test]
  fn returns_none_for_unrecoverable_text() {
    assert!(salvage_json("I cannot produce JSON for this request.").is_none());
  }

  #[test]
  fn returns_none_for_empty_string() {
    assert!(salvage_json("").is_none());
  }
}
