//! Rubric weight table
//!
//! The scorer never hard-codes points. It receives a [`RubricWeights`]
//! mapping, so alternate rubrics can be tried from config alone:
//!
//! ```toml
//! [rubric.weights]
//! title = 12
//! geo = 0
//! ```

use crate::models::CheckKey;
use indexmap::IndexMap;
use serde::Serialize;

/// Ordered mapping of check key to maximum points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RubricWeights(IndexMap<CheckKey, u32>);

impl Default for RubricWeights {
    fn default() -> Self {
        Self(
            CheckKey::ALL
                .into_iter()
                .map(|key| (key, default_weight(key)))
                .collect(),
        )
    }
}

/// Built-in points per check (sum 87)
pub fn default_weight(key: CheckKey) -> u32 {
    match key {
        CheckKey::Lang => 5,
        CheckKey::Charset => 3,
        CheckKey::Viewport => 5,
        CheckKey::Title => 10,
        CheckKey::Description => 10,
        CheckKey::H1 => 6,
        CheckKey::Canonical => 6,
        CheckKey::Robots => 8,
        CheckKey::JsonLd => 10,
        CheckKey::LocalSchema => 10,
        CheckKey::ImagesAlt => 6,
        CheckKey::Geo => 8,
    }
}

impl RubricWeights {
    /// Defaults with per-key overrides applied
    pub fn with_overrides(overrides: &IndexMap<CheckKey, u32>) -> Self {
        let mut weights = Self::default();
        for (key, weight) in overrides {
            weights.0.insert(*key, *weight);
        }
        weights
    }

    /// Replace the points for one check
    pub fn set(&mut self, key: CheckKey, weight: u32) {
        self.0.insert(key, weight);
    }

    /// Weight of `key`, falling back to the built-in value
    pub fn weight(&self, key: CheckKey) -> u32 {
        self.0.get(&key).copied().unwrap_or_else(|| default_weight(key))
    }

    pub fn total(&self) -> u32 {
        CheckKey::ALL
            .into_iter()
            .fold(0u32, |sum, k| sum.saturating_add(self.weight(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_87() {
        assert_eq!(RubricWeights::default().total(), 87);
    }

    #[test]
    fn test_overrides_replace_only_named_keys() {
        let mut overrides = IndexMap::new();
        overrides.insert(CheckKey::Title, 20);
        let weights = RubricWeights::with_overrides(&overrides);
        assert_eq!(weights.weight(CheckKey::Title), 20);
        assert_eq!(weights.weight(CheckKey::Lang), 5);
        assert_eq!(weights.total(), 97);
    }

    #[test]
    fn test_set_layers_on_existing_overrides() {
        let mut overrides = IndexMap::new();
        overrides.insert(CheckKey::Geo, 0);
        let mut weights = RubricWeights::with_overrides(&overrides);
        weights.set(CheckKey::Title, 12);
        assert_eq!(weights.weight(CheckKey::Geo), 0);
        assert_eq!(weights.weight(CheckKey::Title), 12);
        assert_eq!(weights.total(), 87 - 8 + 2);
    }
}
