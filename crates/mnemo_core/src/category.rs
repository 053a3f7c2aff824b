use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Drives conflict policy and temporal decay (§3). New categories require
/// explicit policy additions in both [`crate::temporal_scorer`] and
/// [`crate::conflict_resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FactCategory {
  Infrastructure,
  Architecture,
  Debugging,
  Pattern,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_through_display_and_from_str() {
    for category in [FactCategory::Infrastructure, FactCategory::Architecture, FactCategory::Debugging, FactCategory::Pattern] {
      let parsed: FactCategory = category.to_string().parse().unwrap();
      assert_eq!(parsed, category);
    }
  }

  #[test]
  fn unknown_category_is_rejected() {
    assert!("unknown".parse::<FactCategory>().is_err());
  }
}
