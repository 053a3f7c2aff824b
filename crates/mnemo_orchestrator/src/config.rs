use mnemo_core::{ConflictThresholds, EpisodeConfig, TemporalScorerConfig};
use serde::{Deserialize, Serialize};

/// Top-level knobs an embedding host exposes to its users (§6). Master
/// switch and budgets live here; per-component policy (episode detection,
/// temporal scoring, conflict thresholds) is composed in from `mnemo_core`
/// rather than duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Master switch. The orchestrator no-ops every call while this is
  /// `false`, matching the host's default-off posture for conversation
  /// memory.
  pub conversation_memory_enabled: bool,
  pub prompt_budget_tokens: usize,
  pub memory_tool_default_limit: i64,
  pub daily_processing_budget_usd: f64,
  pub episode: EpisodeConfig,
  pub temporal: TemporalScorerConfig,
  pub conflict: ConflictThresholds,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      conversation_memory_enabled: false,
      prompt_budget_tokens: 400,
      memory_tool_default_limit: 10,
      daily_processing_budget_usd: 1.0,
      episode: EpisodeConfig::default(),
      temporal: TemporalScorerConfig::default(),
      conflict: ConflictThresholds::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn conversation_memory_defaults_to_disabled() {
    assert!(!EngineConfig::default().conversation_memory_enabled);
  }
}
