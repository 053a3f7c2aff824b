use chrono::{DateTime, Utc};
use mnemo_ai::Embedder;
use mnemo_shared::EngineError;
use mnemo_store::{Filter, VectorStore};

const SEARCH_K: usize = 50;
/// Coherence bonus applied when an episode group has more than this many
/// matching facts (§4.6 / glossary).
const COHERENCE_THRESHOLD: usize = 3;
const COHERENCE_BONUS: f32 = 0.1;
const UNKNOWN_EPISODE_BUCKET: &str = "unknown";

#[derive(Debug, Clone)]
pub struct EpisodeSearchHit {
  pub content: String,
  pub category: String,
  pub confidence: f32,
  pub reference_time: Option<DateTime<Utc>>,
  pub context_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EpisodeSearchResult {
  pub episode_id: String,
  pub episode_context: String,
  pub relevance: f32,
  pub timeframe: String,
  pub facts: Vec<EpisodeSearchHit>,
}

/// Embeds a query, searches the store, and groups hits by episode (§4.6 /
/// C6).
pub struct EpisodeSearchService<E: Embedder, S: VectorStore> {
  embedder: E,
  store: S,
}

impl<E: Embedder, S: VectorStore> EpisodeSearchService<E, S> {
  #[must_use]
  pub fn new(embedder: E, store: S) -> Self {
    Self { embedder, store }
  }

  /// `limit <= 0` yields an empty list without touching the store.
  pub async fn search_by_episode(&self, query: &str, workspace_path: &str, limit: i64) -> Result<Vec<EpisodeSearchResult>, EngineError> {
    if limit <= 0 {
      return Ok(Vec::new());
    }

    let query_vector = self.embedder.embed(query).await?;
    let filter = Filter::workspace_path(workspace_path);
    let hits = self.store.search(&query_vector, SEARCH_K, &filter).await?;

    let mut groups: Vec<(String, Vec<EpisodeSearchHit>)> = Vec::new();
    for hit in hits {
      let episode_id = hit.record.payload.get("episode_id").and_then(|v| v.as_str()).map(str::to_string).unwrap_or_else(|| UNKNOWN_EPISODE_BUCKET.to_string());

      let fact = EpisodeSearchHit {
        content: hit.record.payload.get("content").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        category: hit.record.payload.get("category").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        confidence: hit.record.payload.get("confidence").and_then(|v| v.as_f64()).map_or(crate::fact::DEFAULT_CONFIDENCE, |v| v as f32),
        reference_time: hit.record.payload.get("reference_time").and_then(|v| v.as_str()).and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|t| t.with_timezone(&Utc)),
        context_description: hit.record.payload.get("context_description").and_then(|v| v.as_str()).map(str::to_string),
      };

      match groups.iter_mut().find(|(id, _)| id == &episode_id) {
        Some((_, facts)) => facts.push(fact),
        None => groups.push((episode_id, vec![fact])),
      }
    }

    let mut results: Vec<EpisodeSearchResult> = groups
      .into_iter()
      .map(|(episode_id, mut facts)| {
        let episode_context = episode_context_for(&facts);
        facts.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

        let mean_confidence = facts.iter().map(|f| f.confidence).sum::<f32>() / facts.len() as f32;
        let coherence_bonus = if facts.len() > COHERENCE_THRESHOLD { COHERENCE_BONUS } else { 0.0 };

        EpisodeSearchResult {
          timeframe: format_timeframe(&facts),
          episode_context,
          relevance: mean_confidence + coherence_bonus,
          episode_id,
          facts,
        }
      })
      .collect();

    results.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit as usize);

    Ok(results)
  }
}

/// "Episode context unavailable" when the group is empty or the first
/// fact carries no `context_description` (§4.6 step 4).
fn episode_context_for(facts: &[EpisodeSearchHit]) -> String {
  facts.first().and_then(|fact| fact.context_description.clone()).unwrap_or_else(|| "Episode context unavailable".to_string())
}

fn format_timeframe(facts: &[EpisodeSearchHit]) -> String {
  let times: Vec<DateTime<Utc>> = facts.iter().filter_map(|f| f.reference_time).collect();
  let (Some(earliest), Some(latest)) = (times.iter().min(), times.iter().max()) else {
    return "unknown".to_string();
  };

  if earliest.date_naive() == latest.date_naive() {
    earliest.date_naive().to_string()
  } else {
    format!("{} – {}", earliest.date_naive(), latest.date_naive())
  }
}
