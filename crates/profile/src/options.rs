use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    /// Entries kept in each column's value histogram.
    pub top_n: usize,
    pub detect_patterns: bool,
    /// Upper bound on values tested against the pattern library per column.
    pub sample_size: usize,
    /// Sampling seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Profile only these columns. Unknown names produce an error profile.
    pub columns: Option<Vec<String>>,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            detect_patterns: true,
            sample_size: 10_000,
            seed: Some(42),
            columns: None,
        }
    }
}

/// Limits beyond which a shared column counts as drifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftThresholds {
    /// Allowed rise in null percentage, in percentage points.
    pub null_increase: f64,
    /// Allowed relative change in cardinality (0.2 = 20%).
    pub cardinality_change: f64,
    /// Whether a dtype change counts as drift.
    pub type_change: bool,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            null_increase: 5.0,
            cardinality_change: 0.2,
            type_change: true,
        }
    }
}
