mod heuristic;
mod refine;
mod semantic;

use std::collections::BTreeSet;
use std::sync::Arc;

use mnemo_ai::{Embedder, LlmProvider};
use mnemo_shared::{Message, ProjectContext};

use crate::config::{EpisodeConfig, SegmentationMode};
use crate::episode::Episode;
use crate::episode_context::EpisodeContextGenerator;
use crate::hints::Hints;
use heuristic::heuristic_breakpoints;
use refine::refine_boundaries;
use semantic::semantic_breakpoints;

/// Segments a message sequence into episodes using heuristic, optional
/// semantic, and optional LLM-refined passes (§4.4 / C4). Holds its
/// collaborators as type-erased `Arc`s rather than generic parameters: the
/// detector is constructed once per workspace and its embedder/LLM are
/// shared with every other component in that workspace's orchestrator.
pub struct EpisodeDetector {
  config: EpisodeConfig,
  embedder: Option<Arc<dyn Embedder>>,
  llm: Option<Arc<dyn LlmProvider>>,
}

impl EpisodeDetector {
  #[must_use]
  pub fn new(config: EpisodeConfig) -> Self {
    Self { config, embedder: None, llm: None }
  }

  #[must_use]
  pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
    self.embedder = Some(embedder);
    self
  }

  #[must_use]
  pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
    self.llm = Some(llm);
    self
  }

  /// Partitions `messages` exactly: concatenating the returned episodes'
  /// messages in order reproduces the input (§8 property 3). Deterministic
  /// given the same inputs, config, and embedder/LLM outputs.
  pub async fn detect(&self, messages: &[Message], workspace_id: &str, project_context: Option<&ProjectContext>, hints: &Hints) -> Vec<Episode> {
    if messages.is_empty() {
      return Vec::new();
    }

    let mut breakpoints: BTreeSet<usize> = heuristic_breakpoints(messages, self.config.time_gap_min, &self.config.topic_patterns).into_iter().collect();

    if self.config.segmentation.mode != SegmentationMode::Heuristic {
      if let Some(embedder) = &self.embedder {
        let texts: Vec<String> = messages.iter().map(|m| m.content.clone()).collect();
        if let Ok(embeddings) = embedder.embed_batch(&texts).await {
          breakpoints.extend(semantic_breakpoints(&embeddings, &self.config.segmentation.semantic));
        }
      }
    }

    breakpoints.insert(0);
    breakpoints.insert(messages.len());
    let cuts: Vec<usize> = breakpoints.into_iter().collect();
    let cuts = enforce_max_size(&cuts, self.config.max_messages);

    let mut episodes = build_episodes(messages, &cuts, workspace_id);

    if self.config.segmentation.boundary_refiner {
      if let Some(llm) = &self.llm {
        if let Some(refined) = refine_boundaries(llm, messages).await {
          let mut refined_cuts = refined.boundaries;
          refined_cuts.push(messages.len());
          refined_cuts.dedup();
          let refined_cuts = enforce_max_size(&refined_cuts, self.config.max_messages);
          episodes = attach_titles(build_episodes(messages, &refined_cuts, workspace_id), &refined.titles);
        }
      }
    }

    self.fill_context_descriptions(&mut episodes, project_context, hints).await;

    episodes
  }

  async fn fill_context_descriptions(&self, episodes: &mut [Episode], project_context: Option<&ProjectContext>, hints: &Hints) {
    match &self.llm {
      Some(llm) => {
        let generator = EpisodeContextGenerator::new(llm.clone());
        for episode in episodes.iter_mut() {
          if episode.context_description.is_none() {
            episode.context_description = Some(generator.describe(&episode.messages, project_context, hints).await);
          }
        }
      }
      None => {
        for episode in episodes.iter_mut() {
          if episode.context_description.is_none() {
            episode.context_description = Some(format!("Episode with {} messages", episode.message_count));
          }
        }
      }
    }
  }
}

/// Inserts forced cuts every `max_messages` messages so no segment exceeds
/// that size (§4.4 step 3). `cuts` must already be sorted, deduplicated,
/// and bracketed by `0` and the message count.
fn enforce_max_size(cuts: &[usize], max_messages: usize) -> Vec<usize> {
  let mut result = vec![cuts[0]];
  for window in cuts.windows(2) {
    let (start, end) = (window[0], window[1]);
    let mut pos = start;
    while end - pos > max_messages {
      pos += max_messages;
      result.push(pos);
    }
    result.push(end);
  }
  result.dedup();
  result
}

fn build_episodes(messages: &[Message], cuts: &[usize], workspace_id: &str) -> Vec<Episode> {
  cuts.windows(2).filter(|window| window[0] != window[1]).map(|window| Episode::from_messages(workspace_id, messages[window[0]..window[1]].to_vec())).collect()
}

fn attach_titles(mut episodes: Vec<Episode>, titles: &[String]) -> Vec<Episode> {
  for (episode, title) in episodes.iter_mut().zip(titles.iter()) {
    if !title.trim().is_empty() {
      episode.context_description = Some(title.clone());
    }
  }
  episodes
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, Duration, Utc};
  use mnemo_shared::MessageRole;

  use super::*;

  fn msg_at(minute: i64) -> Message {
    Message::with_timestamp(MessageRole::User, "content", DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minute))
  }

  #[tokio::test]
  async fn empty_input_yields_no_episodes() {
    let detector = EpisodeDetector::new(EpisodeConfig::default());
    let episodes = detector.detect(&[], "workspace-1", None, &Hints::default()).await;
    assert!(episodes.is_empty());
  }

  #[tokio::test]
  async fn time_gap_splits_into_two_episodes_of_two() {
    let detector = EpisodeDetector::new(EpisodeConfig::default());
    let messages = vec![msg_at(0), msg_at(5), msg_at(45), msg_at(47)];
    let episodes = detector.detect(&messages, "workspace-1", None, &Hints::default()).await;

    let sizes: Vec<usize> = episodes.iter().map(|e| e.message_count).collect();
    assert_eq!(sizes, vec![2, 2]);
  }

  #[tokio::test]
  async fn size_enforcement_splits_twenty_into_two_tens() {
    let config = EpisodeConfig { max_messages: 10, ..EpisodeConfig::default() };
    let detector = EpisodeDetector::new(config);
    let messages: Vec<Message> = (0..20).map(|i| msg_at(i * 10)).collect();
    let episodes = detector.detect(&messages, "workspace-1", None, &Hints::default()).await;

    let sizes: Vec<usize> = episodes.iter().map(|e| e.message_count).collect();
    assert_eq!(sizes, vec![10, 10]);
  }

  #[tokio::test]
  async fn partition_invariant_holds() {
    let detector = EpisodeDetector::new(EpisodeConfig::default());
    let messages: Vec<Message> = (0..7).map(|i| msg_at(i * 5)).collect();
    let episodes = detector.detect(&messages, "workspace-1", None, &Hints::default()).await;

    let reconstructed: Vec<String> = episodes.iter().flat_map(|e| e.messages.iter().map(|m| m.content.clone())).collect();
    let original: Vec<String> = messages.iter().map(|m| m.content.clone()).collect();
    assert_eq!(reconstructed, original);
  }

  #[tokio::test]
  async fn single_message_has_equal_start_and_end() {
    let detector = EpisodeDetector::new(EpisodeConfig::default());
    let episodes = detector.detect(&[msg_at(0)], "workspace-1", None, &Hints::default()).await;
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].start_time, episodes[0].end_time);
  }

  #[tokio::test]
  async fn every_episode_respects_the_size_bound() {
    let config = EpisodeConfig { max_messages: 5, ..EpisodeConfig::default() };
    let detector = EpisodeDetector::new(config);
    let messages: Vec<Message> = (0..37).map(|i| msg_at(i)).collect();
    let episodes = detector.detect(&messages, "workspace-1", None, &Hints::default()).await;

    assert!(episodes.iter().all(|e| e.message_count <= 5));
  }
}
