use serde::{Deserialize, Serialize};

/// Distance metric used by the semantic segmentation channel (§4.4 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
  Cosine,
  Dot,
}

impl Default for DistanceMetric {
  fn default() -> Self {
    Self::Cosine
  }
}

/// How much segmentation work the detector does (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
  Heuristic,
  Semantic,
  LlmVerified,
}

impl Default for SegmentationMode {
  fn default() -> Self {
    Self::Heuristic
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
  /// Multiplier on the MAD term of the drift threshold.
  pub drift_k: f32,
  /// Minimum cluster size before a semantic breakpoint can fire.
  pub min_window: usize,
  pub distance: DistanceMetric,
}

impl Default for SemanticConfig {
  fn default() -> Self {
    Self {
      drift_k: 2.5,
      min_window: 5,
      distance: DistanceMetric::Cosine,
    }
  }
}

/// Source of the project hints folded into episode-context and extraction
/// prompts (§4.3, supplemented ambient feature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintsSource {
  None,
  Workspace,
  Memory,
  Auto,
}

impl Default for HintsSource {
  fn default() -> Self {
    Self::Auto
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintsConfig {
  pub source: HintsSource,
  #[serde(default)]
  pub extra: Vec<String>,
}

impl Default for HintsConfig {
  fn default() -> Self {
    Self {
      source: HintsSource::Auto,
      extra: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
  pub prefer_llm: bool,
  pub hints: HintsConfig,
}

impl Default for ContextConfig {
  fn default() -> Self {
    Self {
      prefer_llm: true,
      hints: HintsConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
  pub mode: SegmentationMode,
  pub semantic: SemanticConfig,
  /// Defaults to `true` iff `mode == LlmVerified` (§4.4); set explicitly
  /// here rather than derived, since a caller may want LLM refinement
  /// without semantic segmentation or vice versa.
  pub boundary_refiner: bool,
}

impl Default for SegmentationConfig {
  fn default() -> Self {
    Self {
      mode: SegmentationMode::Heuristic,
      semantic: SemanticConfig::default(),
      boundary_refiner: false,
    }
  }
}

/// Configuration for [`crate::episode_detector::EpisodeDetector`] (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeConfig {
  pub time_gap_min: i64,
  pub max_messages: usize,
  #[serde(default)]
  pub topic_patterns: Vec<String>,
  pub segmentation: SegmentationConfig,
  pub context: ContextConfig,
}

impl Default for EpisodeConfig {
  fn default() -> Self {
    Self {
      time_gap_min: 30,
      max_messages: 25,
      topic_patterns: Vec::new(),
      segmentation: SegmentationConfig::default(),
      context: ContextConfig::default(),
    }
  }
}

/// Category-parameterized policy table for [`crate::temporal_scorer::TemporalScorer`]
/// (§4.1). A tagged policy table, per the polymorphism-over-categories
/// design note, rather than a class per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalScorerConfig {
  pub infra_multiplier: f32,
  pub architecture_decay_days: f32,
  pub architecture_recency_floor: f32,
  pub superseded_score: f32,
  pub debugging_resolved_score: f32,
  pub debugging_stale_after_days: f32,
  pub stale_debug_score: f32,
  pub pattern_base: f32,
  pub pattern_decay_days: f32,
  pub pattern_recency_floor: f32,
}

impl Default for TemporalScorerConfig {
  fn default() -> Self {
    Self {
      infra_multiplier: 1.2,
      architecture_decay_days: 90.0,
      architecture_recency_floor: 0.3,
      superseded_score: 0.1,
      debugging_resolved_score: 0.15,
      debugging_stale_after_days: 14.0,
      stale_debug_score: 0.1,
      pattern_base: 0.8,
      pattern_decay_days: 180.0,
      pattern_recency_floor: 0.5,
    }
  }
}

/// Similarity thresholds driving [`crate::conflict_resolver::ConflictResolver`]
/// (§4.2). The resolution-marker list is left as configuration per the
/// open question on whether it should be localized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictThresholds {
  pub ignore_similarity: f32,
  pub supersede_similarity: f32,
  pub delete_existing_similarity: f32,
  pub neighbour_limit: usize,
  pub resolution_markers: Vec<String>,
}

impl Default for ConflictThresholds {
  fn default() -> Self {
    Self {
      ignore_similarity: 0.95,
      supersede_similarity: 0.80,
      delete_existing_similarity: 0.85,
      neighbour_limit: 8,
      resolution_markers: vec![
        "resolved".to_string(),
        "fixed".to_string(),
        "no longer".to_string(),
        "is now fixed".to_string(),
        "has been resolved".to_string(),
      ],
    }
  }
}
