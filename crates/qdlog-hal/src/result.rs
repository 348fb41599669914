//! Measurement counts and execution results.
//!
//! Outcome keys are bitstrings over every classical bit of the circuit,
//! written with the highest clbit first: clbit `0` is the rightmost
//! character.

use qdlog_ir::ClbitId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Histogram of measured bitstrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Observations of `bitstring`.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(bitstring, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Outcomes ordered by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.sorted().into_iter().next()
    }

    /// Relative frequency of each outcome.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots();
        if total == 0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total as f64))
            .collect()
    }

    /// Read the little-endian value of `clbits` out of an outcome key.
    ///
    /// Returns `None` if a bit index lies outside the key or the key holds
    /// characters other than `0` and `1`.
    pub fn read_bits(bitstring: &str, clbits: &[ClbitId]) -> Option<u64> {
        let bytes = bitstring.as_bytes();
        let width = bytes.len();
        let mut value = 0u64;
        for (k, c) in clbits.iter().enumerate() {
            let pos = width.checked_sub(c.index() + 1)?;
            match bytes[pos] {
                b'1' => value |= 1 << k,
                b'0' => {}
                _ => return None,
            }
        }
        Some(value)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }
}

/// Result of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measured histogram.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Wall-clock execution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Create a result from counts.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("01", 3);
        counts.insert("10", 5);
        counts.insert("01", 4);
        assert_eq!(counts.get("01"), 7);
        assert_eq!(counts.get("11"), 0);
        assert_eq!(counts.total_shots(), 12);
        assert_eq!(counts.most_frequent(), Some(("01", 7)));
    }

    #[test]
    fn test_sorted_breaks_ties_by_bitstring() {
        let counts: Counts = [("11", 2), ("00", 2), ("10", 9)].into_iter().collect();
        let sorted = counts.sorted();
        assert_eq!(sorted, vec![("10", 9), ("00", 2), ("11", 2)]);
    }

    #[test]
    fn test_read_bits_rightmost_is_clbit_zero() {
        // clbits: c3 c2 c1 c0 = 1 0 1 1
        let key = "1011";
        assert_eq!(Counts::read_bits(key, &[ClbitId(0), ClbitId(1)]), Some(0b11));
        assert_eq!(Counts::read_bits(key, &[ClbitId(2), ClbitId(3)]), Some(0b10));
        assert_eq!(Counts::read_bits(key, &[ClbitId(3), ClbitId(0)]), Some(0b11));
        assert_eq!(Counts::read_bits(key, &[ClbitId(4)]), None);
        assert_eq!(Counts::read_bits("1x", &[ClbitId(0)]), None);
    }

    #[test]
    fn test_probabilities() {
        let counts: Counts = [("0", 1), ("1", 3)].into_iter().collect();
        let probs = counts.probabilities();
        assert!((probs["1"] - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }
}
