mod config;
pub use config::EngineConfig;

mod events;
pub use events::{EngineEvent, NullSink, TaskUpdateSink};

mod queue;
pub use queue::WorkQueue;

mod state_manager;
pub use state_manager::{EngineState, Progress, ProgressEvent, StateManager};

mod orchestrator;
pub use orchestrator::{Orchestrator, TurnInput, TurnOutcome};
