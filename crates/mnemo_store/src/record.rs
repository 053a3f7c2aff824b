use serde_json::Value;

/// A stored vector plus its opaque payload. The engine serializes
/// `ConversationFact` fields into `payload` rather than the store knowing
/// about facts directly — the store is a pluggable collaborator (§1, §6).
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
  pub id: String,
  pub vector: Vec<f32>,
  pub payload: Value,
}

impl StoreRecord {
  #[must_use]
  pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: Value) -> Self {
    Self {
      id: id.into(),
      vector,
      payload,
    }
  }
}

/// A [`StoreRecord`] annotated with its similarity score against the query
/// vector that produced it, in `[0, 1]`. A missing score is treated by
/// callers as `0.0` (§4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
  pub record: StoreRecord,
  pub score: Option<f32>,
}

/// A partial update to an existing record's payload fields. Only the
/// fields present are modified; `None` leaves the existing value alone.
#[derive(Debug, Clone, Default)]
pub struct Patch {
  pub fields: Vec<(String, Value)>,
}

impl Patch {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
    self.fields.push((field.into(), value));
    self
  }
}
