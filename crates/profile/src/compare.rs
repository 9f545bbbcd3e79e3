// Schema comparison and drift detection between two profiles

use std::collections::HashMap;

use mdrecon_table::DType;
use serde::Serialize;

use crate::model::{ColumnProfile, ProfileResult};
use crate::options::DriftThresholds;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMismatch {
    pub column: String,
    pub first: DType,
    pub second: DType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaComparison {
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
    pub type_mismatches: Vec<TypeMismatch>,
    pub identical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    NullIncrease,
    CardinalityChange,
    TypeChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDrift {
    pub column: String,
    pub kinds: Vec<DriftKind>,
    pub baseline_null_percentage: f64,
    pub current_null_percentage: f64,
    pub baseline_cardinality: f64,
    pub current_cardinality: f64,
    /// Relative cardinality change; 1.0 when the baseline was 0.
    pub cardinality_change: f64,
    pub baseline_dtype: DType,
    pub current_dtype: DType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub has_drift: bool,
    pub columns_added: Vec<String>,
    pub columns_removed: Vec<String>,
    pub drifted: Vec<ColumnDrift>,
}

/// Column set and dtype differences. Columns that failed to profile count
/// for presence but are not type-checked.
pub fn compare_schemas(first: &ProfileResult, second: &ProfileResult) -> SchemaComparison {
    let (only_in_first, only_in_second, shared) = split_columns(first, second);

    let type_mismatches: Vec<TypeMismatch> = shared
        .into_iter()
        .filter(|(a, b)| a.is_ok() && b.is_ok() && a.dtype != b.dtype)
        .map(|(a, b)| TypeMismatch {
            column: a.name.clone(),
            first: a.dtype,
            second: b.dtype,
        })
        .collect();

    let identical = only_in_first.is_empty() && only_in_second.is_empty() && type_mismatches.is_empty();
    SchemaComparison { only_in_first, only_in_second, type_mismatches, identical }
}

/// Flag shared columns whose null share, cardinality or dtype moved past
/// `thresholds`. Any change in the column set is drift on its own.
pub fn detect_drift(baseline: &ProfileResult, current: &ProfileResult, thresholds: &DriftThresholds) -> DriftReport {
    let (columns_removed, columns_added, shared) = split_columns(baseline, current);

    let drifted: Vec<ColumnDrift> = shared
        .into_iter()
        .filter(|(b, c)| b.is_ok() && c.is_ok())
        .filter_map(|(b, c)| column_drift(b, c, thresholds))
        .collect();

    let has_drift = !drifted.is_empty() || !columns_added.is_empty() || !columns_removed.is_empty();
    if has_drift {
        log::info!(
            "drift: {} columns drifted, {} added, {} removed",
            drifted.len(),
            columns_added.len(),
            columns_removed.len()
        );
    }

    DriftReport { has_drift, columns_added, columns_removed, drifted }
}

fn column_drift(baseline: &ColumnProfile, current: &ColumnProfile, thresholds: &DriftThresholds) -> Option<ColumnDrift> {
    let mut kinds = Vec::new();

    if current.null_percentage - baseline.null_percentage > thresholds.null_increase {
        kinds.push(DriftKind::NullIncrease);
    }

    let cardinality_change = relative_change(baseline.cardinality, current.cardinality);
    if cardinality_change > thresholds.cardinality_change {
        kinds.push(DriftKind::CardinalityChange);
    }

    if thresholds.type_change && baseline.dtype != current.dtype {
        kinds.push(DriftKind::TypeChange);
    }

    (!kinds.is_empty()).then(|| ColumnDrift {
        column: baseline.name.clone(),
        kinds,
        baseline_null_percentage: baseline.null_percentage,
        current_null_percentage: current.null_percentage,
        baseline_cardinality: baseline.cardinality,
        current_cardinality: current.cardinality,
        cardinality_change,
        baseline_dtype: baseline.dtype,
        current_dtype: current.dtype,
    })
}

fn relative_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            1.0
        }
    } else {
        ((current - baseline) / baseline).abs()
    }
}

type Split<'a> = (Vec<String>, Vec<String>, Vec<(&'a ColumnProfile, &'a ColumnProfile)>);

/// (only in `a`, only in `b`, shared pairs in `a`'s order)
fn split_columns<'a>(a: &'a ProfileResult, b: &'a ProfileResult) -> Split<'a> {
    let by_name_a: HashMap<&str, &ColumnProfile> = a.columns.iter().map(|c| (c.name.as_str(), c)).collect();
    let by_name_b: HashMap<&str, &ColumnProfile> = b.columns.iter().map(|c| (c.name.as_str(), c)).collect();

    let mut only_a = Vec::new();
    let mut shared = Vec::new();
    for col in &a.columns {
        match by_name_b.get(col.name.as_str()) {
            Some(other) => shared.push((col, *other)),
            None => only_a.push(col.name.clone()),
        }
    }
    let only_b = b
        .columns
        .iter()
        .filter(|c| !by_name_a.contains_key(c.name.as_str()))
        .map(|c| c.name.clone())
        .collect();

    (only_a, only_b, shared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Profiler;
    use mdrecon_table::{Table, Value};

    fn profile(columns: &[&str], rows: Vec<Vec<Value>>) -> ProfileResult {
        let t = Table::from_rows(columns.iter().copied(), rows).unwrap();
        Profiler::default().profile(&t)
    }

    #[test]
    fn schema_differences() {
        let a = profile(&["id", "name", "legacy"], vec![vec![Value::Int(1), "x".into(), "y".into()]]);
        let b = profile(&["id", "name", "region"], vec![vec!["A1".into(), "x".into(), "EU".into()]]);
        let cmp = compare_schemas(&a, &b);
        assert_eq!(cmp.only_in_first, vec!["legacy".to_string()]);
        assert_eq!(cmp.only_in_second, vec!["region".to_string()]);
        assert_eq!(
            cmp.type_mismatches,
            vec![TypeMismatch { column: "id".into(), first: DType::Integer, second: DType::String }]
        );
        assert!(!cmp.identical);
        assert!(compare_schemas(&a, &a).identical);
    }

    #[test]
    fn null_increase_drift() {
        let baseline = profile(&["v"], (0..10).map(|i| vec![Value::Int(i)]).collect());
        let current = profile(
            &["v"],
            (0..10).map(|i| vec![if i < 2 { Value::Null } else { Value::Int(i) }]).collect(),
        );
        let report = detect_drift(&baseline, &current, &DriftThresholds::default());
        assert!(report.has_drift);
        assert_eq!(report.drifted.len(), 1);
        assert!(report.drifted[0].kinds.contains(&DriftKind::NullIncrease));
    }

    #[test]
    fn cardinality_from_zero_counts_as_full_change() {
        assert_eq!(relative_change(0.0, 0.5), 1.0);
        assert_eq!(relative_change(0.0, 0.0), 0.0);
        assert!((relative_change(0.5, 0.6) - 0.2).abs() < 1e-12);
    }

    fn ints(distinct: i64) -> Vec<Vec<Value>> {
        (0..10).map(|i| vec![Value::Int(i % distinct)]).collect()
    }

    #[test]
    fn cardinality_change_drift() {
        // 10 distinct of 10 rows, then 5 of 10: same dtype, no nulls
        let baseline = profile(&["v"], ints(10));
        let current = profile(&["v"], ints(5));
        let report = detect_drift(&baseline, &current, &DriftThresholds::default());
        assert!(report.has_drift);
        assert_eq!(report.drifted.len(), 1);
        let drift = &report.drifted[0];
        assert_eq!(drift.kinds, vec![DriftKind::CardinalityChange]);
        assert_eq!(drift.baseline_cardinality, 1.0);
        assert_eq!(drift.current_cardinality, 0.5);
        assert!((drift.cardinality_change - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cardinality_change_at_threshold_is_not_drift() {
        // 0.5 -> 0.6 is a 20% move, which the strict comparison lets through
        let baseline = profile(&["v"], ints(5));
        let current = profile(&["v"], ints(6));
        assert!(!detect_drift(&baseline, &current, &DriftThresholds::default()).has_drift);

        let beyond = profile(&["v"], ints(7));
        let report = detect_drift(&baseline, &beyond, &DriftThresholds::default());
        assert_eq!(report.drifted[0].kinds, vec![DriftKind::CardinalityChange]);
    }

    #[test]
    fn drift_report_serializes_with_snake_case_kinds() {
        let report = detect_drift(&profile(&["v"], ints(10)), &profile(&["v"], ints(5)), &DriftThresholds::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["has_drift"], true);
        assert_eq!(json["drifted"][0]["column"], "v");
        assert_eq!(json["drifted"][0]["kinds"][0], "cardinality_change");
        assert_eq!(json["drifted"][0]["baseline_dtype"], "integer");
    }

    #[test]
    fn type_change_can_be_ignored() {
        let baseline = profile(&["v"], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        let current = profile(&["v"], vec![vec!["a".into()], vec!["b".into()]]);
        let strict = detect_drift(&baseline, &current, &DriftThresholds::default());
        assert_eq!(strict.drifted[0].kinds, vec![DriftKind::TypeChange]);

        let lenient = DriftThresholds { type_change: false, ..DriftThresholds::default() };
        assert!(!detect_drift(&baseline, &current, &lenient).has_drift);
    }

    #[test]
    fn column_set_change_is_drift() {
        let baseline = profile(&["a"], vec![vec![Value::Int(1)]]);
        let current = profile(&["a", "b"], vec![vec![Value::Int(1), Value::Int(2)]]);
        let report = detect_drift(&baseline, &current, &DriftThresholds::default());
        assert!(report.has_drift);
        assert!(report.drifted.is_empty());
        assert_eq!(report.columns_added, vec!["b".to_string()]);
        assert!(report.columns_removed.is_empty());
    }
}
