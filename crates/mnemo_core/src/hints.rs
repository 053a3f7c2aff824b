/// Project hints folded into context-generation and extraction prompts
/// (§4.3). Supplemented ambient capability: the spec names the shape of
/// the hint budget (5 deps, 5 tags, 5 dirs, 3 extra keywords) but leaves
/// the source of these hints to the host, so it is modeled as a trait
/// rather than a fixed struct the engine populates itself.
pub trait HintsProvider: Send + Sync {
  fn hints(&self, workspace_id: &str) -> Hints;
}

#[derive(Debug, Clone, Default)]
pub struct Hints {
  pub dependencies: Vec<String>,
  pub tags: Vec<String>,
  pub directories: Vec<String>,
  pub extra_keywords: Vec<String>,
}

const MAX_DEPENDENCIES: usize = 5;
const MAX_TAGS: usize = 5;
const MAX_DIRECTORIES: usize = 5;
const MAX_EXTRA_KEYWORDS: usize = 3;

impl Hints {
  #[must_use]
  pub fn capped(mut self) -> Self {
    self.dependencies.truncate(MAX_DEPENDENCIES);
    self.tags.truncate(MAX_TAGS);
    self.directories.truncate(MAX_DIRECTORIES);
    self.extra_keywords.truncate(MAX_EXTRA_KEYWORDS);
    self
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.dependencies.is_empty() && self.tags.is_empty() && self.directories.is_empty() && self.extra_keywords.is_empty()
  }

  /// Renders as a short prompt fragment, empty string if there's nothing
  /// to say.
  #[must_use]
  pub fn to_prompt_fragment(&self) -> String {
    if self.is_empty() {
      return String::new();
    }

    let mut lines = Vec::new();
    if !self.dependencies.is_empty() {
      lines.push(format!("Dependencies: {}", self.dependencies.join(", ")));
    }
    if !self.tags.is_empty() {
      lines.push(format!("Tags: {}", self.tags.join(", ")));
    }
    if !self.directories.is_empty() {
      lines.push(format!("Directories: {}", self.directories.join(", ")));
    }
    if !self.extra_keywords.is_empty() {
      lines.push(format!("Keywords: {}", self.extra_keywords.join(", ")));
    }
    lines.join("\n")
  }
}

/// Default no-op hints provider for hosts that have not wired a real one.
pub struct NullHintsProvider;

impl HintsProvider for NullHintsProvider {
  fn hints(&self, _workspace_id: &str) -> Hints {
    Hints::default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hints_are_capped_to_the_documented_budget() {
    let hints = Hints {
      dependencies: (0..10).map(|i| format!("dep-{i}")).collect(),
      tags: (0..10).map(|i| format!("tag-{i}")).collect(),
      directories: (0..10).map(|i| format!("dir-{i}")).collect(),
      extra_keywords: (0..10).map(|i| format!("kw-{i}")).collect(),
    }
    .capped();

    assert_eq!(hints.dependencies.len(), MAX_DEPENDENCIES);
    assert_eq!(hints.tags.len(), MAX_TAGS);
    assert_eq!(hints.directories.len(), MAX_DIRECTORIES);
    assert_eq!(hints.extra_keywords.len(), MAX_EXTRA_KEYWORDS);
  }

  #[test]
  fn null_provider_returns_empty_hints() {
    assert!(NullHintsProvider.hints("workspace-1").is_empty());
  }
}
