use mnemo_shared::{cosine_distance, dot_distance};

use crate::config::{DistanceMetric, SemanticConfig};

/// Caps the running-mean weight so a very long cluster doesn't smooth the
/// centroid into near-immobility (§4.4 step 2).
const MAX_CENTROID_WEIGHT: f32 = 1000.0;

/// Breakpoints from the adaptive drift-threshold channel. Embeddings must
/// be in message order and correspond 1:1 with the messages being
/// segmented; callers skip this channel entirely when no embedder is
/// configured.
pub fn semantic_breakpoints(embeddings: &[Vec<f32>], config: &SemanticConfig) -> Vec<usize> {
  if embeddings.len() < 2 {
    return Vec::new();
  }

  let mut breakpoints = Vec::new();
  let mut centroid = embeddings[0].clone();
  let mut weight: f32 = 1.0;
  let mut window: Vec<f32> = Vec::new();

  for (i, embedding) in embeddings.iter().enumerate().skip(1) {
    let distance = match config.distance {
      DistanceMetric::Cosine => cosine_distance(embedding, &centroid),
      DistanceMetric::Dot => dot_distance(embedding, &centroid),
    };

    let is_breakpoint = window.len() >= config.min_window && distance > median(&window) + config.drift_k * mad(&window);

    if is_breakpoint {
      breakpoints.push(i);
      centroid = embedding.clone();
      weight = 1.0;
      window.clear();
      continue;
    }

    window.push(distance);
    let capped_weight = weight.min(MAX_CENTROID_WEIGHT);
    for (c, v) in centroid.iter_mut().zip(embedding.iter()) {
      *c = (*c * capped_weight + v) / (capped_weight + 1.0);
    }
    weight += 1.0;
  }

  breakpoints
}

fn median(values: &[f32]) -> f32 {
  let mut sorted = values.to_vec();
  sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
  let mid = sorted.len() / 2;
  if sorted.len() % 2 == 0 {
    (sorted[mid - 1] + sorted[mid]) / 2.0
  } else {
    sorted[mid]
  }
}

fn mad(values: &[f32]) -> f32 {
  let center = median(values);
  let deviations: Vec<f32> = values.iter().map(|v| (v - center).abs()).collect();
  median(&deviations)
}
