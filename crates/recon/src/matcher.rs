// Fuzzy one-to-one linkage between two value lists

use std::fmt;
use std::time::Instant;

use mdrecon_table::Table;

use crate::config::FuzzyConfig;
use crate::error::ReconError;
use crate::model::{MatchCandidate, MatchResult, MatchTotals, Side};
use crate::scorer::{BuiltinScorer, SimilarityScorer};

/// Values that normalize to nothing and are never scored.
const EMPTY_TOKENS: &[&str] = &["none", "nan", "null"];

/// Scored approximate matching. Built once per configuration; every call is
/// independent.
pub struct FuzzyMatcher {
    config: FuzzyConfig,
    scorer: Box<dyn SimilarityScorer>,
}

impl fmt::Debug for FuzzyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyMatcher").field("config", &self.config).finish_non_exhaustive()
    }
}

impl FuzzyMatcher {
    /// Matcher over the built-in scorers. Fails on an invalid threshold or
    /// limit.
    pub fn new(config: FuzzyConfig) -> Result<Self, ReconError> {
        Self::with_scorer(config, Box::new(BuiltinScorer))
    }

    /// Matcher over a caller-supplied scorer, which must support the
    /// configured method.
    pub fn with_scorer(config: FuzzyConfig, scorer: Box<dyn SimilarityScorer>) -> Result<Self, ReconError> {
        config.validate()?;
        if !scorer.supports(config.method) {
            return Err(ReconError::Configuration(format!(
                "scorer does not provide method '{}'",
                config.method
            )));
        }
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Canonical form used for scoring. Empty for blanks and null-like
    /// tokens.
    pub fn normalize(&self, value: &str) -> String {
        let mut s = if self.config.trim_whitespace {
            value.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            value.to_string()
        };
        if !self.config.case_sensitive {
            s = s.to_lowercase();
        }
        if self.config.strip_punctuation {
            s.retain(|c| !c.is_ascii_punctuation());
            if self.config.trim_whitespace {
                s = s.split_whitespace().collect::<Vec<_>>().join(" ");
            }
        }
        let trimmed = s.trim();
        if trimmed.is_empty() || EMPTY_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
            return String::new();
        }
        s
    }

    /// Score two raw values after normalization, clamped to `[0, 100]`.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.score_normalized(&self.normalize(a), &self.normalize(b))
    }

    pub(crate) fn score_normalized(&self, a: &str, b: &str) -> f64 {
        self.scorer.score(self.config.method, a, b).clamp(0.0, 100.0)
    }

    /// Link each source value to at most one target value.
    ///
    /// Sources are taken in order. Each looks at its `limit` best-scoring
    /// targets and takes the highest-scoring one that is still free and
    /// reaches the threshold. Greedy, so not globally optimal.
    pub fn match_values<S: AsRef<str>>(&self, source: &[S], target: &[S]) -> MatchResult {
        let started = Instant::now();

        let targets: Vec<(usize, String)> = target
            .iter()
            .enumerate()
            .map(|(i, v)| (i, self.normalize(v.as_ref())))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let mut consumed = vec![false; target.len()];
        let mut matches = Vec::new();
        let mut skipped = 0usize;

        for (si, raw) in source.iter().enumerate() {
            let value = self.normalize(raw.as_ref());
            if value.is_empty() {
                skipped += 1;
                continue;
            }

            let mut candidates: Vec<(usize, f64)> = targets
                .iter()
                .map(|(ti, t)| (*ti, self.score_normalized(&value, t)))
                .collect();
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            candidates.truncate(self.config.limit);

            for (ti, score) in candidates {
                if score < self.config.threshold {
                    break;
                }
                if consumed[ti] {
                    continue;
                }
                consumed[ti] = true;
                matches.push(MatchCandidate {
                    source_index: si,
                    target_index: ti,
                    source_value: raw.as_ref().to_string(),
                    target_value: target[ti].as_ref().to_string(),
                    score,
                    method: self.config.method,
                });
                break;
            }
        }

        let mut warnings = Vec::new();
        if skipped > 0 {
            warnings.push(format!("{skipped} empty source value(s) skipped"));
        }

        let totals = MatchTotals {
            matched: matches.len(),
            unmatched_source: source.len() - matches.len(),
            unmatched_target: target.len() - matches.len(),
        };
        let elapsed = started.elapsed().as_millis() as u64;
        log::info!(
            "fuzzy match ({}, threshold {}): {} of {} source values matched in {elapsed}ms",
            self.config.method,
            self.config.threshold,
            totals.matched,
            source.len()
        );

        MatchResult {
            success: true,
            method: self.config.method,
            threshold: self.config.threshold,
            totals,
            matches,
            warnings,
            errors: Vec::new(),
            match_time_ms: elapsed,
        }
    }

    /// Link two table columns. Cells are compared by their text form; a
    /// missing column gives an unsuccessful result.
    pub fn match_columns(
        &self,
        source: &Table,
        source_column: &str,
        target: &Table,
        target_column: &str,
    ) -> MatchResult {
        let values = column_text(source, Side::Source, source_column)
            .and_then(|s| Ok((s, column_text(target, Side::Target, target_column)?)));
        match values {
            Ok((s, t)) => self.match_values(&s, &t),
            Err(e) => {
                log::warn!("fuzzy match failed: {e}");
                MatchResult::failed(self.config.method, self.config.threshold, e)
            }
        }
    }
}

/// Text form of every cell in `column`; nulls become empty strings.
pub(crate) fn column_text(table: &Table, side: Side, column: &str) -> Result<Vec<String>, ReconError> {
    let values = table
        .column_values(column)
        .map_err(|_| ReconError::MissingColumn { side, column: column.to_string() })?;
    Ok(values.map(|v| v.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::SimilarityMethod;
    use mdrecon_table::Value;

    fn matcher(method: SimilarityMethod, threshold: f64) -> FuzzyMatcher {
        FuzzyMatcher::new(FuzzyConfig { method, threshold, ..FuzzyConfig::default() }).unwrap()
    }

    #[test]
    fn case_insensitive_ratio_is_exact() {
        let m = matcher(SimilarityMethod::Ratio, 80.0);
        assert_eq!(m.score("ALICE", "alice"), 100.0);
    }

    #[test]
    fn normalization() {
        let m = FuzzyMatcher::new(FuzzyConfig { strip_punctuation: true, ..FuzzyConfig::default() }).unwrap();
        assert_eq!(m.normalize("  Acme,  Inc. "), "acme inc");
        assert_eq!(m.normalize("NaN"), "");
        assert_eq!(m.normalize(" None "), "");
        assert_eq!(m.normalize(""), "");
    }

    #[test]
    fn one_to_one_greedy_assignment() {
        let m = matcher(SimilarityMethod::Ratio, 60.0);
        let source = ["acme corp", "acme corporation"];
        let target = ["acme corp"];
        let result = m.match_values(&source, &target);
        assert_eq!(result.totals, MatchTotals { matched: 1, unmatched_source: 1, unmatched_target: 0 });
        assert_eq!(result.matches[0].source_index, 0);
        assert_eq!(result.matches[0].score, 100.0);
    }

    #[test]
    fn consumed_target_falls_through_to_next_candidate() {
        let m = matcher(SimilarityMethod::Ratio, 50.0);
        let source = ["jon smith", "jon smith"];
        let target = ["jon smith", "jon smyth"];
        let result = m.match_values(&source, &target);
        assert_eq!(result.totals.matched, 2);
        assert_eq!(result.matches[0].target_index, 0);
        assert_eq!(result.matches[0].score, 100.0);
        // exact target already taken
        assert_eq!(result.matches[1].target_index, 1);
        assert!(result.matches[1].score < 100.0);
    }

    #[test]
    fn empty_values_are_skipped() {
        let m = matcher(SimilarityMethod::Ratio, 50.0);
        let result = m.match_values(&["", "null", "beta"], &["beta", ""]);
        assert_eq!(result.totals.matched, 1);
        assert_eq!(result.totals.unmatched_source, 2);
        assert_eq!(result.totals.unmatched_target, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn threshold_blocks_weak_matches() {
        let m = matcher(SimilarityMethod::Ratio, 95.0);
        let result = m.match_values(&["acme"], &["acme inc"]);
        assert_eq!(result.totals.matched, 0);
    }

    #[test]
    fn invalid_config_fails_fast() {
        let err = FuzzyMatcher::new(FuzzyConfig { threshold: -1.0, ..FuzzyConfig::default() }).unwrap_err();
        assert!(matches!(err, ReconError::Configuration(_)));
    }

    struct RatioOnly;

    impl SimilarityScorer for RatioOnly {
        fn supports(&self, method: SimilarityMethod) -> bool {
            method == SimilarityMethod::Ratio
        }

        fn score(&self, _method: SimilarityMethod, a: &str, b: &str) -> f64 {
            crate::scorer::ratio(a, b)
        }
    }

    struct Overshoot;

    impl SimilarityScorer for Overshoot {
        fn score(&self, _method: SimilarityMethod, a: &str, b: &str) -> f64 {
            if a == b { 150.0 } else { -20.0 }
        }
    }

    #[test]
    fn custom_scores_are_clamped() {
        let m = FuzzyMatcher::with_scorer(FuzzyConfig::default(), Box::new(Overshoot)).unwrap();
        assert_eq!(m.score("acme", "ACME"), 100.0);
        assert_eq!(m.score("acme", "globex"), 0.0);
        let result = m.match_values(&["acme"], &["acme"]);
        assert_eq!(result.matches[0].score, 100.0);
    }

    #[test]
    fn scorer_without_method_is_a_configuration_error() {
        let err = FuzzyMatcher::with_scorer(FuzzyConfig::default(), Box::new(RatioOnly)).unwrap_err();
        assert!(err.to_string().contains("wratio"));

        let config = FuzzyConfig { method: SimilarityMethod::Ratio, ..FuzzyConfig::default() };
        assert!(FuzzyMatcher::with_scorer(config, Box::new(RatioOnly)).is_ok());
    }

    #[test]
    fn column_matching() {
        let vendors = Table::from_rows(["name"], vec![vec!["Acme Inc".into()], vec![Value::Null]]).unwrap();
        let ledger = Table::from_rows(["payee"], vec![vec!["ACME INC".into()]]).unwrap();
        let m = matcher(SimilarityMethod::WRatio, 90.0);

        let result = m.match_columns(&vendors, "name", &ledger, "payee");
        assert!(result.success);
        assert_eq!(result.totals.matched, 1);
        assert_eq!(result.matches[0].target_value, "ACME INC");

        let failed = m.match_columns(&vendors, "name", &ledger, "vendor");
        assert!(!failed.success);
        assert_eq!(failed.errors, vec!["target: missing column 'vendor'".to_string()]);
    }
}
