// Settings-driven entry point for every reconciliation operation

use mdrecon_config::Settings;
use mdrecon_io::{LoadOptions, LoadResult, Source};
use mdrecon_profile::{DriftReport, ProfileResult, Profiler, SchemaComparison};
use mdrecon_recon::{
    CompareRequest, CompareResult, DedupeResult, FuzzyConfig, FuzzyMatcher, HashComparer, KeepPolicy, MatchResult,
    ReconError, SimilarityMethod,
};
use mdrecon_table::Table;

use crate::error::WorkbenchError;

/// Components built once from [`Settings`]. Operations borrow the workbench
/// immutably, so one instance can serve many threads.
#[derive(Debug)]
pub struct Workbench {
    settings: Settings,
    profiler: Profiler,
    comparer: HashComparer,
    matcher: FuzzyMatcher,
}

impl Workbench {
    /// Validate settings and build every component. Fails on settings no
    /// call could succeed with.
    pub fn new(settings: Settings) -> Result<Self, WorkbenchError> {
        settings.validate()?;
        let matcher = FuzzyMatcher::new(settings.fuzzy.clone())?;
        Ok(Self {
            profiler: Profiler::new(settings.profiler.clone()),
            comparer: HashComparer::new(settings.compare.hash.clone()),
            matcher,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ------------------------------------------------------------------------
    // Loading and profiling
    // ------------------------------------------------------------------------

    /// Load a table. Loader settings fill whatever `options` leaves unset.
    pub fn load(&self, source: &Source, mut options: LoadOptions) -> LoadResult {
        self.settings.loader.apply(&mut options);
        mdrecon_io::load(source, &options)
    }

    /// Profile a table, optionally overriding the histogram size and
    /// pattern detection for this call.
    pub fn profile(&self, table: &Table, top_n: Option<usize>, detect_patterns: Option<bool>) -> ProfileResult {
        if top_n.is_none() && detect_patterns.is_none() {
            return self.profiler.profile(table);
        }
        let mut options = self.profiler.options().clone();
        if let Some(n) = top_n {
            options.top_n = n;
        }
        if let Some(detect) = detect_patterns {
            options.detect_patterns = detect;
        }
        Profiler::new(options).profile(table)
    }

    pub fn compare_schemas(&self, first: &ProfileResult, second: &ProfileResult) -> SchemaComparison {
        mdrecon_profile::compare_schemas(first, second)
    }

    /// Drift from `baseline` to `current` under the configured thresholds.
    pub fn detect_drift(&self, baseline: &ProfileResult, current: &ProfileResult) -> DriftReport {
        mdrecon_profile::detect_drift(baseline, current, &self.settings.drift)
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    /// Request for `key_columns` carrying the configured detail policy.
    pub fn compare_request<S: Into<String>>(&self, key_columns: impl IntoIterator<Item = S>) -> CompareRequest {
        self.settings.compare.request(key_columns)
    }

    pub fn compare(&self, source: &Table, target: &Table, request: &CompareRequest) -> CompareResult {
        self.comparer.compare(source, target, request)
    }

    /// One-to-one fuzzy linkage. `threshold` and `method` override the
    /// configured matcher for this call; an invalid override gives an
    /// unsuccessful result.
    pub fn match_values<S: AsRef<str>>(
        &self,
        source: &[S],
        target: &[S],
        threshold: Option<f64>,
        method: Option<SimilarityMethod>,
    ) -> MatchResult {
        match self.matcher_for(threshold, method) {
            Ok(Some(matcher)) => matcher.match_values(source, target),
            Ok(None) => self.matcher.match_values(source, target),
            Err(e) => {
                let config = &self.settings.fuzzy;
                MatchResult::failed(method.unwrap_or(config.method), threshold.unwrap_or(config.threshold), e)
            }
        }
    }

    /// Near-duplicate groups within `values`, with the same per-call
    /// overrides as [`Workbench::match_values`].
    pub fn deduplicate<S: AsRef<str>>(
        &self,
        values: &[S],
        threshold: Option<f64>,
        method: Option<SimilarityMethod>,
        keep: KeepPolicy,
    ) -> DedupeResult {
        match self.matcher_for(threshold, method) {
            Ok(Some(matcher)) => matcher.deduplicate(values, keep),
            Ok(None) => self.matcher.deduplicate(values, keep),
            Err(e) => {
                let config = &self.settings.fuzzy;
                DedupeResult::failed(
                    method.unwrap_or(config.method),
                    threshold.unwrap_or(config.threshold),
                    keep,
                    e,
                )
            }
        }
    }

    /// A one-off matcher when the call overrides the configuration, `None`
    /// when the shared one applies.
    fn matcher_for(
        &self,
        threshold: Option<f64>,
        method: Option<SimilarityMethod>,
    ) -> Result<Option<FuzzyMatcher>, ReconError> {
        if threshold.is_none() && method.is_none() {
            return Ok(None);
        }
        let base = &self.settings.fuzzy;
        let config = FuzzyConfig {
            threshold: threshold.unwrap_or(base.threshold),
            method: method.unwrap_or(base.method),
            ..base.clone()
        };
        log::debug!("fuzzy override: {} at threshold {}", config.method, config.threshold);
        FuzzyMatcher::new(config).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdrecon_table::Value;

    fn people() -> Table {
        Table::from_rows(
            ["id", "name"],
            vec![vec![Value::Int(1), "Alice".into()], vec![Value::Int(2), "Bob".into()]],
        )
        .unwrap()
    }

    #[test]
    fn invalid_settings_fail_construction() {
        let mut settings = Settings::default();
        settings.fuzzy.limit = 0;
        assert!(matches!(Workbench::new(settings), Err(WorkbenchError::Config(_))));
    }

    #[test]
    fn profile_overrides_apply_per_call() {
        let bench = Workbench::new(Settings::default()).unwrap();
        let result = bench.profile(&people(), Some(1), Some(false));
        let name = result.column("name").unwrap();
        assert_eq!(name.top_values.len(), 1);
        assert!(name.patterns.is_empty());

        let full = bench.profile(&people(), None, None);
        assert_eq!(full.column("name").unwrap().top_values.len(), 2);
    }

    #[test]
    fn invalid_threshold_override_gives_failed_result() {
        let bench = Workbench::new(Settings::default()).unwrap();
        let result = bench.match_values(&["a"], &["a"], Some(150.0), None);
        assert!(!result.success);
        assert_eq!(result.threshold, 150.0);
        assert!(result.errors[0].contains("threshold"));
    }

    #[test]
    fn compare_request_follows_settings() {
        let mut settings = Settings::default();
        settings.compare.max_details = 1;
        let bench = Workbench::new(settings).unwrap();

        let other = Table::from_rows(["id", "name"], vec![vec![Value::Int(3), "Carl".into()]]).unwrap();
        let result = bench.compare(&people(), &other, &bench.compare_request(["id"]));
        assert_eq!(result.details.len(), 1);
        assert!(result.details_truncated);
        assert_eq!(result.totals.orphan_source, 2);
        assert_eq!(result.totals.orphan_target, 1);
    }
}
