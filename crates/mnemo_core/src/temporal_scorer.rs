use chrono::{DateTime, Utc};

use crate::category::FactCategory;
use crate::config::TemporalScorerConfig;
use crate::fact::ConversationFact;

/// Pure, total, category-parameterized relevance scorer (§4.1 / C1).
/// Holds no state beyond its policy table — `score` never performs I/O and
/// never fails.
pub struct TemporalScorer {
  config: TemporalScorerConfig,
}

impl TemporalScorer {
  #[must_use]
  pub fn new(config: TemporalScorerConfig) -> Self {
    Self { config }
  }

  /// `max(0, (now - reference_time) / 86400s)` — future-dated facts score
  /// as age zero rather than negative (§4.1).
  fn age_days(reference_time: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let seconds = now.signed_duration_since(reference_time).num_seconds();
    (seconds as f32 / 86_400.0).max(0.0)
  }

  #[must_use]
  pub fn score(&self, fact: &ConversationFact, now: DateTime<Utc>) -> f32 {
    let confidence = fact.effective_confidence();
    let age_days = Self::age_days(fact.reference_time, now);

    match fact.category {
      FactCategory::Infrastructure => confidence * self.config.infra_multiplier,

      FactCategory::Architecture => {
        if fact.superseded_by.is_some() {
          self.config.superseded_score
        } else {
          let decay = 1.0 - age_days / self.config.architecture_decay_days;
          confidence * decay.max(self.config.architecture_recency_floor)
        }
      }

      FactCategory::Debugging => {
        if fact.resolved {
          self.config.debugging_resolved_score
        } else if age_days > self.config.debugging_stale_after_days {
          self.config.stale_debug_score
        } else {
          confidence
        }
      }

      FactCategory::Pattern => {
        let decay = 1.0 - age_days / self.config.pattern_decay_days;
        confidence * self.config.pattern_base * decay.max(self.config.pattern_recency_floor)
      }
    }
  }
}

impl Default for TemporalScorer {
  fn default() -> Self {
    Self::new(TemporalScorerConfig::default())
  }
}
