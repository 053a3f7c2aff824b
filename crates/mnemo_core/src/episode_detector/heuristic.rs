use mnemo_shared::Message;
use regex::RegexSet;

/// Indices at which a new episode should start, from the time-gap and
/// topic-pattern rules (§4.4 step 1). Index 0 is never included here; the
/// caller always treats the start of the input as an implicit breakpoint.
pub fn heuristic_breakpoints(messages: &[Message], time_gap_min: i64, topic_patterns: &[String]) -> Vec<usize> {
  let pattern_set = RegexSet::new(topic_patterns).ok();
  let gap = chrono::Duration::minutes(time_gap_min);

  let mut breakpoints = Vec::new();

  for i in 1..messages.len() {
    let time_gap = messages[i].effective_timestamp() - messages[i - 1].effective_timestamp();
    let topic_shift = pattern_set.as_ref().is_some_and(|set| set.is_match(&messages[i].content.to_lowercase()));

    if time_gap > gap || topic_shift {
      breakpoints.push(i);
    }
  }

  breakpoints
}

#[cfg(test)]
mod tests {
  use mnemo_shared::MessageRole;

  use super::*;

  fn msg_at(minute: i64) -> Message {
    Message::with_timestamp(MessageRole::User, "content", chrono::DateTime::<chrono::Utc>::UNIX_EPOCH + chrono::Duration::minutes(minute))
  }

  #[test]
  fn time_gap_produces_a_breakpoint() {
    let messages = vec![msg_at(0), msg_at(5), msg_at(45), msg_at(47)];
    let breakpoints = heuristic_breakpoints(&messages, 30, &[]);
    assert_eq!(breakpoints, vec![2]);
  }

  #[test]
  fn missing_timestamps_are_treated_as_epoch_zero() {
    let messages = vec![Message::new(MessageRole::User, "a"), Message::new(MessageRole::User, "b")];
    let breakpoints = heuristic_breakpoints(&messages, 30, &[]);
    assert!(breakpoints.is_empty());
  }

  #[test]
  fn topic_pattern_match_is_case_insensitive() {
    let messages = vec![msg_at(0), Message::with_timestamp(mnemo_shared::MessageRole::User, "Let's switch to DEPLOYMENT now", chrono::DateTime::<chrono::Utc>::UNIX_EPOCH + chrono::Duration::minutes(1))];
    let breakpoints = heuristic_breakpoints(&messages, 30, &["deployment".to_string()]);
    assert_eq!(breakpoints, vec![1]);
  }
}
