use std::collections::HashSet;
use std::time::Instant;

use mdrecon_table::{DType, Table, Value};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ProfileError;
use crate::model::{ColumnProfile, ProfileResult};
use crate::options::ProfileOptions;
use crate::{patterns, quality, stats};

/// Computes [`ProfileResult`]s. Holds only its options; every call is
/// independent.
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    options: ProfileOptions,
}

impl Profiler {
    pub fn new(options: ProfileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProfileOptions {
        &self.options
    }

    /// Profile every column (or the configured subset).
    ///
    /// A column that cannot be profiled carries its error and a zero score;
    /// the result as a whole still succeeds.
    pub fn profile(&self, table: &Table) -> ProfileResult {
        let started = Instant::now();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let names: Vec<String> = match &self.options.columns {
            Some(requested) => requested.clone(),
            None => table.columns().to_vec(),
        };

        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut columns = Vec::with_capacity(names.len());
        for name in &names {
            match self.profile_column_with(table, name, &mut rng) {
                Ok(profile) => {
                    if profile.total_count > 0 && profile.null_count == profile.total_count {
                        warnings.push(format!("column '{name}' is entirely null"));
                    }
                    columns.push(profile);
                }
                Err(e) => {
                    log::warn!("profiling column '{name}' failed: {e}");
                    errors.push(format!("column '{name}': {e}"));
                    columns.push(ColumnProfile::failed(name.clone(), e));
                }
            }
        }

        let duplicate_rows = count_duplicate_rows(table);
        let overall = quality::overall_score(&columns, duplicate_rows, table.row_count());
        let elapsed = started.elapsed().as_millis() as u64;

        log::info!(
            "profiled {} columns over {} rows in {elapsed}ms (quality {overall:.1})",
            columns.len(),
            table.row_count()
        );

        ProfileResult {
            success: true,
            row_count: table.row_count(),
            column_count: table.column_count(),
            columns,
            duplicate_rows,
            overall_quality_score: overall,
            warnings,
            errors,
            profile_time_ms: elapsed,
        }
    }

    /// Profile one column on its own.
    pub fn profile_column(&self, table: &Table, name: &str) -> Result<ColumnProfile, ProfileError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.profile_column_with(table, name, &mut rng)
    }

    fn profile_column_with(&self, table: &Table, name: &str, rng: &mut StdRng) -> Result<ColumnProfile, ProfileError> {
        let dtype = table.column_dtype(name)?;
        let total_count = table.row_count();

        let non_null: Vec<&Value> = table.column_values(name)?.filter(|v| !v.is_null()).collect();
        let rendered: Vec<String> = non_null.iter().map(|v| v.to_string()).collect();
        let null_count = total_count - non_null.len();

        let unique_count = rendered.iter().map(String::as_str).collect::<HashSet<_>>().len();
        let cardinality = if total_count == 0 {
            0.0
        } else {
            unique_count as f64 / total_count as f64
        };

        let numeric_stats = if dtype.is_numeric() {
            let values: Vec<f64> = non_null.iter().filter_map(|v| v.as_f64()).filter(|n| !n.is_nan()).collect();
            stats::numeric_stats(&values)
        } else {
            None
        };

        let (string_stats, patterns) = if dtype == DType::String {
            let strings = rendered.iter().map(String::as_str);
            let detected = if self.options.detect_patterns {
                self.detect_patterns(&rendered, rng)
            } else {
                Vec::new()
            };
            (stats::string_stats(strings), detected)
        } else {
            (None, Vec::new())
        };

        let top_values = stats::top_values(rendered.iter().map(String::as_str), total_count, self.options.top_n);

        let mut profile = ColumnProfile {
            name: name.to_string(),
            dtype,
            total_count,
            null_count,
            null_percentage: stats::percent(null_count, total_count),
            unique_count,
            cardinality,
            is_unique: !non_null.is_empty() && unique_count == non_null.len(),
            is_constant: unique_count == 1,
            numeric_stats,
            string_stats,
            patterns,
            top_values,
            quality_score: 0.0,
            error: None,
        };
        profile.quality_score = quality::column_score(&profile);

        log::debug!(
            "column '{name}': {dtype}, {null_count} nulls, {unique_count} unique, score {:.1}",
            profile.quality_score
        );
        Ok(profile)
    }

    /// Pattern detection over at most `sample_size` values.
    fn detect_patterns(&self, values: &[String], rng: &mut StdRng) -> Vec<String> {
        let limit = self.options.sample_size.max(1);
        let sample: Vec<&str> = if values.len() > limit {
            values.choose_multiple(rng, limit).map(String::as_str).collect()
        } else {
            values.iter().map(String::as_str).collect()
        };
        patterns::detect(&sample)
    }
}

/// Rows equal to an earlier row across all columns.
fn count_duplicate_rows(table: &Table) -> usize {
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(table.row_count());
    let mut duplicates = 0;
    for row in table.rows() {
        let key: Vec<Option<String>> = row
            .values()
            .iter()
            .map(|v| (!v.is_null()).then(|| v.to_string()))
            .collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendors() -> Table {
        Table::from_rows(
            ["id", "name", "email", "amount", "active"],
            vec![
                vec![Value::Int(1), "Acme".into(), "ap@acme.com".into(), Value::Float(10.0), Value::Bool(true)],
                vec![Value::Int(2), "Beta".into(), "billing@beta.io".into(), Value::Float(20.0), Value::Bool(true)],
                vec![Value::Int(3), "Acme".into(), "ops@acme.com".into(), Value::Null, Value::Bool(false)],
                vec![Value::Int(4), Value::Null, "x@gamma.org".into(), Value::Float(30.0), Value::Bool(true)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn profiles_every_column() {
        let result = Profiler::default().profile(&vendors());
        assert!(result.success);
        assert_eq!(result.row_count, 4);
        assert_eq!(result.column_count, 5);
        assert_eq!(result.columns.len(), 5);
        assert!(result.errors.is_empty());

        let id = result.column("id").unwrap();
        assert_eq!(id.dtype, DType::Integer);
        assert!(id.is_unique);
        assert_eq!(id.cardinality, 1.0);
        assert_eq!(id.quality_score, 100.0);
        assert_eq!(id.numeric_stats.as_ref().unwrap().median, 2.5);

        let name = result.column("name").unwrap();
        assert_eq!(name.null_count, 1);
        assert_eq!(name.null_percentage, 25.0);
        assert_eq!(name.unique_count, 2);
        assert_eq!(name.cardinality, 0.5);
        assert_eq!(name.top_values[0].value, "Acme");
        assert_eq!(name.top_values[0].count, 2);
        assert_eq!(name.quality_score, 75.0);
        assert_eq!(name.string_stats.as_ref().unwrap().max_length, 4);

        let email = result.column("email").unwrap();
        assert_eq!(email.patterns, vec!["email".to_string()]);

        let amount = result.column("amount").unwrap();
        assert_eq!(amount.dtype, DType::Decimal);
        let s = amount.numeric_stats.as_ref().unwrap();
        assert_eq!((s.min, s.max, s.mean), (10.0, 30.0, 20.0));
        assert_eq!(s.std_dev, Some(10.0));

        let active = result.column("active").unwrap();
        assert_eq!(active.dtype, DType::Boolean);
        assert!(active.numeric_stats.is_none());
        assert!(active.string_stats.is_none());
    }

    #[test]
    fn unknown_column_is_isolated() {
        let options = ProfileOptions {
            columns: Some(vec!["id".into(), "missing".into()]),
            ..ProfileOptions::default()
        };
        let result = Profiler::new(options).profile(&vendors());
        assert!(result.success);
        assert_eq!(result.columns.len(), 2);
        assert!(result.columns[0].is_ok());
        let failed = &result.columns[1];
        assert_eq!(failed.quality_score, 0.0);
        assert!(failed.error.as_ref().unwrap().contains("missing"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.overall_quality_score, 100.0);
    }

    #[test]
    fn constant_and_duplicate_rows() {
        let t = Table::from_rows(
            ["k", "v"],
            vec![
                vec!["a".into(), Value::Int(1)],
                vec!["a".into(), Value::Int(1)],
                vec!["a".into(), Value::Int(2)],
                vec!["a".into(), Value::Int(1)],
            ],
        )
        .unwrap();
        let result = Profiler::default().profile(&t);
        assert_eq!(result.duplicate_rows, 2);
        let k = result.column("k").unwrap();
        assert!(k.is_constant);
        assert_eq!(k.quality_score, 90.0);
        // mean(90, 100) - 2/4 * 10
        assert_eq!(result.overall_quality_score, 90.0);
    }

    #[test]
    fn patterns_can_be_disabled() {
        let options = ProfileOptions { detect_patterns: false, ..ProfileOptions::default() };
        let result = Profiler::new(options).profile(&vendors());
        assert!(result.column("email").unwrap().patterns.is_empty());
    }

    #[test]
    fn sampling_is_bounded_and_seeded() {
        let rows: Vec<Vec<Value>> = (0..500)
            .map(|i| {
                let v = if i % 10 == 0 { format!("row {i}") } else { format!("user{i}@example.com") };
                vec![Value::Text(v)]
            })
            .collect();
        let t = Table::from_rows(["contact"], rows).unwrap();
        let options = ProfileOptions { sample_size: 50, ..ProfileOptions::default() };
        let first = Profiler::new(options.clone()).profile(&t);
        let second = Profiler::new(options).profile(&t);
        assert_eq!(first.columns[0].patterns, second.columns[0].patterns);
    }

    #[test]
    fn empty_table() {
        let t = Table::new(["a"]).unwrap();
        let result = Profiler::default().profile(&t);
        let a = &result.columns[0];
        assert_eq!(a.total_count, 0);
        assert_eq!(a.cardinality, 0.0);
        assert_eq!(a.null_percentage, 0.0);
        assert!(a.top_values.is_empty());
    }
}
