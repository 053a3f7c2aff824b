mod category;
pub use category::FactCategory;

mod fact;
pub use fact::{CategorizedFactInput, ConversationFact, LifecycleState, MemoryAction, DEFAULT_CONFIDENCE};

mod episode;
pub use episode::{fingerprint, Episode};

mod config;
pub use config::{ContextConfig, DistanceMetric, EpisodeConfig, HintsConfig, HintsSource, SegmentationConfig, SegmentationMode, SemanticConfig, TemporalScorerConfig, ConflictThresholds};

mod hints;
pub use hints::{Hints, HintsProvider, NullHintsProvider};

mod temporal_scorer;
pub use temporal_scorer::TemporalScorer;

mod conflict_resolver;
pub use conflict_resolver::ConflictResolver;

mod episode_context;
pub use episode_context::EpisodeContextGenerator;

mod episode_detector;
pub use episode_detector::EpisodeDetector;

mod fact_extractor;
pub use fact_extractor::{ExtractionWindow, FactExtractor, ToolInvocation};

mod episode_search;
pub use episode_search::{EpisodeSearchHit, EpisodeSearchResult, EpisodeSearchService};
