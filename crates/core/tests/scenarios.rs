// End-to-end reconciliation runs through the workbench

use std::fs;

use mdrecon::{DType, KeepPolicy, LoadOptions, RecordStatus, Settings, SimilarityMethod, Source, Table, Value, Workbench};
use tempfile::tempdir;

fn bench() -> Workbench {
    Workbench::new(Settings::default()).unwrap()
}

fn load_csv(bench: &Workbench, content: &str) -> Table {
    let result = bench.load(&Source::content(content), LoadOptions::default());
    assert!(result.success, "load failed: {:?}", result.errors);
    result.into_table().unwrap()
}

// -------------------------------------------------------------------------
// Exact reconciliation
// -------------------------------------------------------------------------

#[test]
fn orphans_on_both_sides() {
    let bench = bench();
    let source = load_csv(&bench, "id,name\n1,Alice\n2,Bob\n");
    let target = load_csv(&bench, "id,name\n1,Alice\n3,Carl\n");

    let result = bench.compare(&source, &target, &bench.compare_request(["id"]));
    assert!(result.success);
    assert_eq!(result.totals.matched, 1);
    assert_eq!(result.totals.orphan_source, 1);
    assert_eq!(result.totals.orphan_target, 1);
    assert_eq!(result.totals.conflicts, 0);

    let statuses: Vec<_> = result.details.iter().map(|d| d.status).collect();
    assert_eq!(statuses, vec![RecordStatus::Match, RecordStatus::OrphanSource, RecordStatus::OrphanTarget]);
    assert_eq!(result.details[1].key_values, vec![Value::Int(2)]);
    assert_eq!(result.details[2].key_values, vec![Value::Int(3)]);
}

#[test]
fn changed_amount_is_a_conflict() {
    let bench = bench();
    let source = load_csv(&bench, "id,amount\n5,100\n");
    let target = load_csv(&bench, "id,amount\n5,200\n");

    let result = bench.compare(&source, &target, &bench.compare_request(["id"]));
    assert_eq!(result.totals.conflicts, 1);
    assert_eq!(result.details[0].status, RecordStatus::Conflict);
    assert_eq!(result.details[0].diff_columns, vec!["amount".to_string()]);
}

#[test]
fn case_only_difference_conflicts_when_case_sensitive() {
    let bench = bench();
    let source = load_csv(&bench, "id,name\n1,ALICE\n");
    let target = load_csv(&bench, "id,name\n1,alice\n");
    let result = bench.compare(&source, &target, &bench.compare_request(["id"]));
    assert_eq!(result.totals.conflicts, 1);

    let mut settings = Settings::default();
    settings.compare.hash.case_sensitive = false;
    let relaxed = Workbench::new(settings).unwrap();
    let result = relaxed.compare(&source, &target, &relaxed.compare_request(["id"]));
    assert_eq!(result.totals.matched, 1);
}

#[test]
fn missing_key_column_fails_without_partial_result() {
    let bench = bench();
    let source = load_csv(&bench, "id,name\n1,Alice\n");
    let target = load_csv(&bench, "code,name\n1,Alice\n");
    let result = bench.compare(&source, &target, &bench.compare_request(["id"]));
    assert!(!result.success);
    assert!(result.details.is_empty());
    assert_eq!(result.totals.matched, 0);
    assert!(result.errors[0].contains("target"));
}

// -------------------------------------------------------------------------
// Fuzzy linkage and dedupe
// -------------------------------------------------------------------------

#[test]
fn near_duplicate_names_group_under_first_spelling() {
    let result = bench().deduplicate(
        &["Jon Smith", "John Smith", "Jane Doe"],
        Some(85.0),
        Some(SimilarityMethod::TokenSortRatio),
        KeepPolicy::First,
    );
    assert!(result.success);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].master_value, "Jon Smith");
    assert_eq!(result.groups[0].members.len(), 1);
    assert_eq!(result.groups[0].members[0].value, "John Smith");
    assert_eq!(result.totals.unique, 2);
}

#[test]
fn vendor_names_link_across_systems() {
    let bench = bench();
    let erp = ["Acme Corporation", "Globex Inc", "Initech"];
    let crm = ["INITECH", "acme corporation", "Umbrella"];
    let result = bench.match_values(&erp, &crm, None, None);

    assert!(result.success);
    assert_eq!(result.totals.matched, 2);
    assert_eq!(result.totals.unmatched_source, 1);
    assert_eq!(result.totals.unmatched_target, 1);
    let pairs: Vec<_> = result.matches.iter().map(|m| (m.source_index, m.target_index)).collect();
    assert_eq!(pairs, vec![(0, 1), (2, 0)]);
}

#[test]
fn stricter_threshold_never_links_more() {
    let bench = bench();
    let source = ["Jon Smith", "Acme Ltd", "Globex", "Initech LLC"];
    let target = ["John Smith", "Acme Limited", "Globex Corp", "Initech"];
    let strict = bench.match_values(&source, &target, Some(90.0), Some(SimilarityMethod::Ratio));
    let loose = bench.match_values(&source, &target, Some(70.0), Some(SimilarityMethod::Ratio));
    assert!(strict.totals.matched <= loose.totals.matched);
}

// -------------------------------------------------------------------------
// Loading, profiling and drift
// -------------------------------------------------------------------------

#[test]
fn unknown_delimiter_falls_back_to_comma() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("accounts.csv");
    fs::write(&path, "id#name\n1#Alice\n2#Bob\n").unwrap();

    let result = bench().load(&Source::path(&path), LoadOptions::default());
    assert!(result.success);
    assert_eq!(result.columns, vec!["id#name".to_string()]);
    assert_eq!(result.rows_loaded, 2);
    assert!(result.warnings.iter().any(|w| w.contains("defaulting to ','")));
}

#[test]
fn loader_settings_cap_rows() {
    let mut settings = Settings::default();
    settings.loader.max_rows = Some(1);
    let bench = Workbench::new(settings).unwrap();

    let result = bench.load(&Source::content("id\n1\n2\n3\n"), LoadOptions::default());
    assert!(result.success);
    assert_eq!(result.rows_loaded, 1);
    assert_eq!(result.schema.get("id"), Some(&DType::Integer));
    assert!(result.warnings.iter().any(|w| w.contains("max_rows")));
}

#[test]
fn profiling_then_drift_between_snapshots() {
    let bench = bench();
    let baseline = load_csv(&bench, "id,email,region\n1,a@x.com,EU\n2,b@x.com,US\n3,c@x.com,EU\n4,d@x.com,US\n");
    let current = load_csv(&bench, "id,email,segment\n1,a@x.com,A\n2,,B\n3,,C\n4,d@x.com,D\n");

    let before = bench.profile(&baseline, None, None);
    let after = bench.profile(&current, None, None);
    assert!(before.success);
    assert_eq!(before.column("email").unwrap().patterns, vec!["email".to_string()]);
    for column in &after.columns {
        assert!((0.0..=100.0).contains(&column.quality_score));
    }

    let schemas = bench.compare_schemas(&before, &after);
    assert_eq!(schemas.only_in_first, vec!["region".to_string()]);
    assert_eq!(schemas.only_in_second, vec!["segment".to_string()]);
    assert!(!schemas.identical);

    let drift = bench.detect_drift(&before, &after);
    assert!(drift.has_drift);
    assert!(drift.drifted.iter().any(|d| d.column == "email"));
    assert!(!drift.drifted.iter().any(|d| d.column == "id"));
}

#[test]
fn results_serialize_to_json() {
    let bench = bench();
    let source = load_csv(&bench, "id,name\n1,Alice\n");
    let result = bench.compare(&source, &source.clone(), &bench.compare_request(["id"]));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["totals"]["matched"], 1);
    assert_eq!(json["details"][0]["status"], "match");
}

#[test]
fn settings_file_drives_the_workbench() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "[fuzzy]\nmethod = \"token_sort_ratio\"\nthreshold = 85\n").unwrap();

    let settings = Settings::load_from(&path).unwrap();
    let bench = Workbench::new(settings).unwrap();
    let result = bench.deduplicate(&["Smith John", "John Smith"], None, None, KeepPolicy::Last);
    assert_eq!(result.method, SimilarityMethod::TokenSortRatio);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].keep_index, 1);
}
