//! Execution result types.
//!
//! Bitstring ordering: the rightmost bit corresponds to the lowest-indexed
//! classical bit (OpenQASM 3 convention). For example, `"01"` means clbit 0
//! read `1` and clbit 1 read `0`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement counts from circuit execution.
///
/// Maps bitstrings to occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Map from bitstring to count.
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from an iterator of (bitstring, count) pairs.
    /// Duplicate bitstrings are accumulated, consistent with `insert()`.
    pub fn from_pairs(iter: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Insert a count for a bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_default() += count;
    }

    /// Get the count for a bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Get the total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Get probabilities for each bitstring.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots() as f64;
        if total == 0.0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total))
            .collect()
    }

    /// Get the number of unique bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if counts are empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Result of circuit execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Provider metadata attached to the result.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            metadata: serde_json::Value::Null,
        }
    }

    /// Set metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get probabilities for each bitstring.
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        self.counts.probabilities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("00", 10);
        counts.insert("00", 5);
        counts.insert("11", 1);
        assert_eq!(counts.get("00"), 15);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 16);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_probabilities() {
        let counts = Counts::from_pairs([("00", 512), ("11", 512)]);
        let probs = counts.probabilities();
        assert!((probs["00"] - 0.5).abs() < 1e-12);
        assert!((probs["11"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_empty() {
        assert!(Counts::new().probabilities().is_empty());
        assert!(Counts::new().is_empty());
    }

    #[test]
    fn test_execution_result_builder() {
        let result = ExecutionResult::new(Counts::from_pairs([("0", 3)]), 3)
            .with_metadata(serde_json::json!({"backend": "ibm_perth"}));
        assert_eq!(result.shots, 3);
        assert_eq!(result.metadata["backend"], "ibm_perth");
        assert!((result.probabilities()["0"] - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_probabilities_sum_to_one(entries in prop::collection::vec(("[01]{2}", 1u64..10_000), 1..8)) {
            let counts: Counts = entries.into_iter().collect();
            let sum: f64 = counts.probabilities().values().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
