use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::scorer::SimilarityMethod;

// ---------------------------------------------------------------------------
// Exact comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

/// How cells are normalized and hashed. Both sides always use the same
/// options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashOptions {
    pub algorithm: HashAlgorithm,
    pub case_sensitive: bool,
    pub trim_whitespace: bool,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            case_sensitive: true,
            trim_whitespace: true,
        }
    }
}

/// One comparison: which columns identify a record, which are monitored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub key_columns: Vec<String>,
    /// Monitored columns. `None` uses the non-key columns both sides share.
    pub value_columns: Option<Vec<String>>,
    pub include_details: bool,
    pub max_details: usize,
}

impl CompareRequest {
    pub fn new<S: Into<String>>(key_columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            key_columns: key_columns.into_iter().map(Into::into).collect(),
            value_columns: None,
            include_details: true,
            max_details: 100,
        }
    }

    pub fn value_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.value_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn details(mut self, include: bool, max: usize) -> Self {
        self.include_details = include;
        self.max_details = max;
        self
    }
}

// ---------------------------------------------------------------------------
// Fuzzy matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    pub method: SimilarityMethod,
    /// Minimum score, 0-100, for a pair to count as a match.
    pub threshold: f64,
    pub case_sensitive: bool,
    pub trim_whitespace: bool,
    pub strip_punctuation: bool,
    /// Candidates considered per source value.
    pub limit: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            method: SimilarityMethod::WRatio,
            threshold: 80.0,
            case_sensitive: false,
            trim_whitespace: true,
            strip_punctuation: false,
            limit: 5,
        }
    }
}

impl FuzzyConfig {
    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        let config: Self = toml::from_str(s).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(ReconError::Configuration(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        if self.limit == 0 {
            return Err(ReconError::Configuration("limit must be at least 1".into()));
        }
        Ok(())
    }
}
