use tokio::sync::watch;

/// The engine's lifecycle state for one workspace (§4.7 / C8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
  Standby,
  Indexing,
  Indexed,
  Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  pub processed: usize,
  pub total: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
  pub state: EngineState,
  pub message: String,
  pub progress: Option<Progress>,
}

impl ProgressEvent {
  fn standby() -> Self {
    Self {
      state: EngineState::Standby,
      message: "idle".to_string(),
      progress: None,
    }
  }
}

/// Broadcasts `{state, message, {processed, total}}` transitions to
/// whoever is watching (§4.7). Built on `tokio::sync::watch` rather than a
/// hand-rolled observer list, so subscribers only ever see the latest
/// event and never need to drain a backlog.
pub struct StateManager {
  sender: watch::Sender<ProgressEvent>,
}

impl StateManager {
  #[must_use]
  pub fn new() -> Self {
    let (sender, _) = watch::channel(ProgressEvent::standby());
    Self { sender }
  }

  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<ProgressEvent> {
    self.sender.subscribe()
  }

  #[must_use]
  pub fn current(&self) -> ProgressEvent {
    self.sender.borrow().clone()
  }

  fn set(&self, state: EngineState, message: impl Into<String>, progress: Option<Progress>) {
    let _ = self.sender.send(ProgressEvent { state, message: message.into(), progress });
  }

  /// `Standby → Indexing` on the first turn or search of a session.
  pub fn start_indexing(&self, message: impl Into<String>) {
    self.set(EngineState::Indexing, message, None);
  }

  /// Reports progress without changing state; only meaningful while
  /// `Indexing`.
  pub fn report_progress(&self, message: impl Into<String>, processed: usize, total: usize) {
    self.set(EngineState::Indexing, message, Some(Progress { processed, total }));
  }

  /// `Indexing → Indexed` on success.
  pub fn mark_indexed(&self, message: impl Into<String>) {
    self.set(EngineState::Indexed, message, None);
  }

  /// Any state → `Error` on unrecoverable failure.
  pub fn mark_error(&self, message: impl Into<String>) {
    self.set(EngineState::Error, message, None);
  }

  /// `Error → Standby` on explicit clear.
  pub fn clear(&self, message: impl Into<String>) {
    self.set(EngineState::Standby, message, None);
  }
}

impl Default for StateManager {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starts_in_standby() {
    let manager = StateManager::new();
    assert_eq!(manager.current().state, EngineState::Standby);
  }

  #[test]
  fn transitions_flow_through_the_documented_states() {
    let manager = StateManager::new();

    manager.start_indexing("first turn received");
    assert_eq!(manager.current().state, EngineState::Indexing);

    manager.report_progress("extracting facts", 1, 3);
    let progress = manager.current();
    assert_eq!(progress.state, EngineState::Indexing);
    assert_eq!(progress.progress, Some(Progress { processed: 1, total: 3 }));

    manager.mark_indexed("turn processed");
    assert_eq!(manager.current().state, EngineState::Indexed);

    manager.mark_error("store unreachable");
    assert_eq!(manager.current().state, EngineState::Error);

    manager.clear("explicit clear");
    assert_eq!(manager.current().state, EngineState::Standby);
  }

  #[tokio::test]
  async fn subscribers_observe_transitions() {
    let manager = StateManager::new();
    let mut receiver = manager.subscribe();

    manager.start_indexing("go");
    receiver.changed().await.unwrap();
    assert_eq!(receiver.borrow().state, EngineState::Indexing);
  }
}
