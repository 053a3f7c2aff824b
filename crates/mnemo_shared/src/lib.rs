mod error;
pub use error::EngineError;

mod message;
pub use message::{Message, MessageRole, ProjectContext};

mod similarity;
pub use similarity::{cosine_distance, cosine_similarity, dot_distance};
