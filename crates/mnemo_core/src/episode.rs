use chrono::{DateTime, Utc};
use mnemo_shared::Message;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest (§3).
const FINGERPRINT_LEN: usize = 10;

/// A contiguous run of messages treated as one conversational unit (§3).
#[derive(Debug, Clone)]
pub struct Episode {
  pub episode_id: String,
  pub workspace_id: String,
  pub messages: Vec<Message>,
  pub start_time: DateTime<Utc>,
  pub end_time: DateTime<Utc>,
  pub message_count: usize,
  pub context_description: Option<String>,
}

impl Episode {
  /// Builds an episode from a contiguous message slice. The id is derived
  /// only from the anchor (workspace + first message), so it stays stable
  /// as later messages are appended to the same conversation (§3 invariant,
  /// §8 property 2).
  #[must_use]
  pub fn from_messages(workspace_id: impl Into<String>, messages: Vec<Message>) -> Self {
    let workspace_id = workspace_id.into();
    let start_time = messages.first().map_or(DateTime::<Utc>::UNIX_EPOCH, Message::effective_timestamp);
    let end_time = messages.last().map_or(start_time, Message::effective_timestamp);
    let episode_id = messages.first().map_or_else(|| fingerprint(&workspace_id, "", start_time), |first| fingerprint(&workspace_id, &first.content, start_time));

    Self {
      episode_id,
      workspace_id,
      message_count: messages.len(),
      messages,
      start_time,
      end_time,
      context_description: None,
    }
  }

  /// `reference_time` is defined as `end_time` (§3) — always the episode's
  /// most recent activity, used by the temporal scorer and search grouping.
  #[must_use]
  pub fn reference_time(&self) -> DateTime<Utc> {
    self.end_time
  }
}

/// `sha256(workspaceId || firstMessageContent[0..120] || firstTimestamp)`,
/// truncated to the first 10 hex characters (§3).
#[must_use]
pub fn fingerprint(workspace_id: &str, first_message_content: &str, first_timestamp: DateTime<Utc>) -> String {
  let truncated: String = first_message_content.chars().take(120).collect();

  let mut hasher = Sha256::new();
  hasher.update(workspace_id.as_bytes());
  hasher.update(truncated.as_bytes());
  hasher.update(first_timestamp.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());

  let digest = hasher.finalize();
  let hex = digest.iter().map(|byte| format!("{byte:02x}")).collect::<String>();
  hex[..FINGERPRINT_LEN].to_string()
}
