use mdrecon_table::Value;
use serde::{Deserialize, Serialize};

use crate::scorer::SimilarityMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

// ---------------------------------------------------------------------------
// Exact comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Match,
    OrphanSource,
    OrphanTarget,
    Conflict,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::OrphanSource => "orphan_source",
            Self::OrphanTarget => "orphan_target",
            Self::Conflict => "conflict",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMatch {
    pub status: RecordStatus,
    /// Key cells as loaded, aligned with `CompareResult::key_columns`.
    pub key_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hash: Option<String>,
    /// Value columns whose normalized cells differ (conflicts only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diff_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompareTotals {
    pub matched: usize,
    pub orphan_source: usize,
    pub orphan_target: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResult {
    pub success: bool,
    pub key_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub totals: CompareTotals,
    /// Matched keys over distinct keys on both sides, as a percentage.
    pub match_rate: f64,
    pub source_rows: usize,
    pub target_rows: usize,
    pub details: Vec<RecordMatch>,
    /// Set when `details` was cut at `max_details`.
    pub details_truncated: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub compare_time_ms: u64,
}

// ---------------------------------------------------------------------------
// Fuzzy linkage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub source_index: usize,
    pub target_index: usize,
    pub source_value: String,
    pub target_value: String,
    pub score: f64,
    pub method: SimilarityMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchTotals {
    pub matched: usize,
    pub unmatched_source: usize,
    pub unmatched_target: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub success: bool,
    pub method: SimilarityMethod,
    pub threshold: f64,
    pub totals: MatchTotals,
    pub matches: Vec<MatchCandidate>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub match_time_ms: u64,
}

impl MatchResult {
    /// Unsuccessful result carrying one error.
    pub fn failed(method: SimilarityMethod, threshold: f64, error: impl ToString) -> Self {
        Self {
            success: false,
            method,
            threshold,
            totals: MatchTotals::default(),
            matches: Vec::new(),
            warnings: Vec::new(),
            errors: vec![error.to_string()],
            match_time_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Which member of a duplicate group survives when the group is collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepPolicy {
    /// Lowest index.
    #[default]
    First,
    /// Highest index.
    Last,
    /// Highest similarity to the master; the master itself scores 100.
    Best,
}

impl std::str::FromStr for KeepPolicy {
    type Err = crate::error::ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "best" => Ok(Self::Best),
            other => Err(crate::error::ReconError::Validation(format!(
                "unknown keep policy '{other}' (expected first, last or best)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupeMember {
    pub index: usize,
    pub value: String,
    /// Similarity to the group master.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupeGroup {
    pub master_index: usize,
    pub master_value: String,
    pub members: Vec<DedupeMember>,
    pub keep_index: usize,
    pub keep_value: String,
}

impl DedupeGroup {
    pub fn size(&self) -> usize {
        self.members.len() + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupeTotals {
    pub total: usize,
    pub unique: usize,
    pub duplicate_groups: usize,
    pub duplicate_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupeResult {
    pub success: bool,
    pub method: SimilarityMethod,
    pub threshold: f64,
    pub keep: KeepPolicy,
    pub totals: DedupeTotals,
    pub groups: Vec<DedupeGroup>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub dedupe_time_ms: u64,
}

impl DedupeResult {
    /// Unsuccessful result carrying one error.
    pub fn failed(method: SimilarityMethod, threshold: f64, keep: KeepPolicy, error: impl ToString) -> Self {
        Self {
            success: false,
            method,
            threshold,
            keep,
            totals: DedupeTotals::default(),
            groups: Vec::new(),
            warnings: Vec::new(),
            errors: vec![error.to_string()],
            dedupe_time_ms: 0,
        }
    }
}
