// String similarity scores on a 0-100 scale

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    /// Indel (longest common subsequence) ratio over whole strings.
    Ratio,
    /// Best ratio of the shorter string against windows of the longer.
    PartialRatio,
    /// Ratio after sorting whitespace tokens.
    #[serde(alias = "token_sort")]
    TokenSortRatio,
    /// Ratio over token intersection and differences.
    #[serde(alias = "token_set")]
    TokenSetRatio,
    /// Weighted blend of the above, picking the best scaled score.
    #[serde(rename = "wratio", alias = "weighted")]
    WRatio,
    /// Normalized edit distance.
    Levenshtein,
}

impl SimilarityMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::PartialRatio => "partial_ratio",
            Self::TokenSortRatio => "token_sort_ratio",
            Self::TokenSetRatio => "token_set_ratio",
            Self::WRatio => "wratio",
            Self::Levenshtein => "levenshtein",
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMethod {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ratio" => Ok(Self::Ratio),
            "partial_ratio" | "partial" => Ok(Self::PartialRatio),
            "token_sort_ratio" | "token_sort" => Ok(Self::TokenSortRatio),
            "token_set_ratio" | "token_set" => Ok(Self::TokenSetRatio),
            "wratio" | "weighted" => Ok(Self::WRatio),
            "levenshtein" => Ok(Self::Levenshtein),
            other => Err(ReconError::Configuration(format!(
                "no similarity scorer named '{other}'"
            ))),
        }
    }
}

/// Scores two already-normalized strings. Implementations must return a
/// value in `[0, 100]` and be symmetric in `a` and `b`.
pub trait SimilarityScorer: Send + Sync {
    /// Whether this scorer can compute `method`. Checked once when a matcher
    /// is built.
    fn supports(&self, method: SimilarityMethod) -> bool {
        let _ = method;
        true
    }

    fn score(&self, method: SimilarityMethod, a: &str, b: &str) -> f64;
}

/// The in-crate implementation of every [`SimilarityMethod`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinScorer;

impl SimilarityScorer for BuiltinScorer {
    fn score(&self, method: SimilarityMethod, a: &str, b: &str) -> f64 {
        match method {
            SimilarityMethod::Ratio => ratio(a, b),
            SimilarityMethod::PartialRatio => partial_ratio(a, b),
            SimilarityMethod::TokenSortRatio => token_sort_ratio(a, b),
            SimilarityMethod::TokenSetRatio => token_set_ratio(a, b),
            SimilarityMethod::WRatio => wratio(a, b),
            SimilarityMethod::Levenshtein => levenshtein_ratio(a, b),
        }
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    if short.len() == long.len() {
        return ratio_chars(short, long);
    }

    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        best = best.max(ratio_chars(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, ratio)
}

/// Blend in the style of fuzzywuzzy's WRatio: whole-string ratio, token
/// scores scaled by 0.95, and partial scores (scaled 0.9, or 0.6 for very
/// unequal lengths) once one string is at least 1.5x the other.
pub fn wratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return ratio(a, b);
    }

    let base = ratio(a, b);
    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;

    if len_ratio < 1.5 {
        let token_sort = token_sort_ratio(a, b) * 0.95;
        let token_set = token_set_ratio(a, b) * 0.95;
        return base.max(token_sort).max(token_set);
    }

    let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
    let partial = partial_ratio(a, b) * partial_scale;
    let partial_sort = partial_ratio(&sorted_tokens(a), &sorted_tokens(b)) * 0.95 * partial_scale;
    let partial_set = token_set_with(a, b, partial_ratio) * 0.95 * partial_scale;
    base.max(partial).max(partial_sort).max(partial_set)
}

pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 100.0;
    }
    (1.0 - edit_distance(&a, &b) as f64 / longest as f64) * 100.0
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_with(a: &str, b: &str, score: fn(&str, &str) -> f64) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return if ta.is_empty() && tb.is_empty() { 100.0 } else { 0.0 };
    }

    let common: Vec<&str> = ta.intersection(&tb).copied().collect();
    let only_a: Vec<&str> = ta.difference(&tb).copied().collect();
    let only_b: Vec<&str> = tb.difference(&ta).copied().collect();

    // One token set contains the other
    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let sect = common.join(" ");
    let combined_a = join_nonempty(&sect, &only_a.join(" "));
    let combined_b = join_nonempty(&sect, &only_b.join(" "));

    score(&sect, &combined_a)
        .max(score(&sect, &combined_b))
        .max(score(&combined_a, &combined_b))
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}

/// Longest common subsequence length, two-row dynamic programme.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn edit_distance(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
