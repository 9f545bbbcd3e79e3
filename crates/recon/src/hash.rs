// Exact reconciliation of two tables by key and content hash

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use mdrecon_table::{Row, Table, Value};
use sha2::{Digest, Sha256};

use crate::config::{CompareRequest, HashAlgorithm, HashOptions};
use crate::error::ReconError;
use crate::model::{CompareResult, CompareTotals, RecordMatch, RecordStatus, Side};

/// Rendered in place of a null cell before hashing. A real cell holding this
/// exact text hashes the same as a null.
pub const NULL_TOKEN: &str = "<NULL>";

/// Joins normalized cells; the ASCII unit separator does not occur in
/// ordinary data.
const FIELD_SEPARATOR: char = '\u{1f}';

static NULL: Value = Value::Null;

/// Partitions two tables into matched, orphaned and conflicting records in
/// O(n + m) using key and value hashes.
#[derive(Debug, Clone, Default)]
pub struct HashComparer {
    options: HashOptions,
}

/// One keyed row, first occurrence only.
struct KeyedRow {
    index: usize,
    key_hash: String,
    value_hash: String,
    key_values: Vec<Value>,
    normalized: Vec<String>,
}

/// Column positions resolved once per side.
struct Layout {
    keys: Vec<usize>,
    values: Vec<usize>,
}

impl HashComparer {
    pub fn new(options: HashOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HashOptions {
        &self.options
    }

    /// Compare `source` against `target`. Validation failures (missing key
    /// or value columns) come back as an unsuccessful result.
    pub fn compare(&self, source: &Table, target: &Table, request: &CompareRequest) -> CompareResult {
        let started = Instant::now();
        match self.run(source, target, request, started) {
            Ok(result) => {
                log::info!(
                    "compared {} vs {} rows: {} matched, {} conflicts, {} orphan source, {} orphan target in {}ms",
                    result.source_rows,
                    result.target_rows,
                    result.totals.matched,
                    result.totals.conflicts,
                    result.totals.orphan_source,
                    result.totals.orphan_target,
                    result.compare_time_ms
                );
                result
            }
            Err(e) => {
                log::warn!("comparison failed: {e}");
                CompareResult {
                    success: false,
                    key_columns: request.key_columns.clone(),
                    value_columns: request.value_columns.clone().unwrap_or_default(),
                    totals: CompareTotals::default(),
                    match_rate: 0.0,
                    source_rows: source.row_count(),
                    target_rows: target.row_count(),
                    details: Vec::new(),
                    details_truncated: false,
                    warnings: Vec::new(),
                    errors: vec![e.to_string()],
                    compare_time_ms: started.elapsed().as_millis() as u64,
                }
            }
        }
    }

    fn run(
        &self,
        source: &Table,
        target: &Table,
        request: &CompareRequest,
        started: Instant,
    ) -> Result<CompareResult, ReconError> {
        if request.key_columns.is_empty() {
            return Err(ReconError::Validation("at least one key column is required".into()));
        }
        for (side, table) in [(Side::Source, source), (Side::Target, target)] {
            for column in &request.key_columns {
                if !table.has_column(column) {
                    return Err(ReconError::MissingColumn { side, column: column.clone() });
                }
            }
        }

        let value_columns = match &request.value_columns {
            Some(explicit) => {
                for (side, table) in [(Side::Source, source), (Side::Target, target)] {
                    for column in explicit {
                        if !table.has_column(column) {
                            return Err(ReconError::MissingColumn { side, column: column.clone() });
                        }
                    }
                }
                explicit.clone()
            }
            None => shared_value_columns(source, target, &request.key_columns),
        };
        log::debug!("keys {:?}, monitored columns {:?}", request.key_columns, value_columns);

        let mut warnings = Vec::new();
        let source_rows = self.keyed_rows(source, Side::Source, &request.key_columns, &value_columns, &mut warnings)?;
        let target_rows = self.keyed_rows(target, Side::Target, &request.key_columns, &value_columns, &mut warnings)?;

        let target_by_key: HashMap<&str, &KeyedRow> =
            target_rows.iter().map(|r| (r.key_hash.as_str(), r)).collect();
        let source_keys: HashSet<&str> = source_rows.iter().map(|r| r.key_hash.as_str()).collect();

        let mut totals = CompareTotals::default();
        let mut details = Vec::new();
        let mut details_truncated = false;
        let mut emit = |record: RecordMatch| {
            if !request.include_details {
                return;
            }
            if details.len() < request.max_details {
                details.push(record);
            } else {
                details_truncated = true;
            }
        };

        for row in &source_rows {
            match target_by_key.get(row.key_hash.as_str()).copied() {
                Some(other) if other.value_hash == row.value_hash => {
                    totals.matched += 1;
                    emit(record(RecordStatus::Match, Some(row), Some(other), Vec::new()));
                }
                Some(other) => {
                    totals.conflicts += 1;
                    let diff_columns = value_columns
                        .iter()
                        .zip(row.normalized.iter().zip(&other.normalized))
                        .filter(|(_, (a, b))| a != b)
                        .map(|(name, _)| name.clone())
                        .collect();
                    emit(record(RecordStatus::Conflict, Some(row), Some(other), diff_columns));
                }
                None => {
                    totals.orphan_source += 1;
                    emit(record(RecordStatus::OrphanSource, Some(row), None, Vec::new()));
                }
            }
        }

        for row in &target_rows {
            if !source_keys.contains(row.key_hash.as_str()) {
                totals.orphan_target += 1;
                emit(record(RecordStatus::OrphanTarget, None, Some(row), Vec::new()));
            }
        }

        // Distinct keys across both sides
        let common = totals.matched + totals.conflicts;
        let distinct = source_rows.len() + target_rows.len() - common;
        let match_rate = if distinct == 0 {
            0.0
        } else {
            totals.matched as f64 / distinct as f64 * 100.0
        };

        Ok(CompareResult {
            success: true,
            key_columns: request.key_columns.clone(),
            value_columns,
            totals,
            match_rate,
            source_rows: source.row_count(),
            target_rows: target.row_count(),
            details,
            details_truncated,
            warnings,
            errors: Vec::new(),
            compare_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Hash every row; later rows repeating a key are dropped with a warning.
    fn keyed_rows(
        &self,
        table: &Table,
        side: Side,
        key_columns: &[String],
        value_columns: &[String],
        warnings: &mut Vec<String>,
    ) -> Result<Vec<KeyedRow>, ReconError> {
        let layout = Layout {
            keys: positions(table, side, key_columns)?,
            values: positions(table, side, value_columns)?,
        };

        let mut seen: HashSet<String> = HashSet::with_capacity(table.row_count());
        let mut rows = Vec::with_capacity(table.row_count());
        let mut duplicates = 0usize;

        for row in table.rows() {
            let keyed = self.hash_row(&row, &layout);
            if !seen.insert(keyed.key_hash.clone()) {
                duplicates += 1;
                continue;
            }
            rows.push(keyed);
        }

        if duplicates > 0 {
            let warning = format!(
                "{side}: {duplicates} row(s) repeat an earlier key; only the first occurrence is compared"
            );
            log::warn!("{warning}");
            warnings.push(warning);
        }
        Ok(rows)
    }

    fn hash_row(&self, row: &Row<'_>, layout: &Layout) -> KeyedRow {
        let cell = |i: usize| row.get_index(i).unwrap_or(&NULL);

        let key_parts: Vec<String> = layout.keys.iter().map(|&i| self.normalize(cell(i))).collect();
        let normalized: Vec<String> = layout.values.iter().map(|&i| self.normalize(cell(i))).collect();

        KeyedRow {
            index: row.index(),
            key_hash: self.digest(&join(&key_parts)),
            value_hash: self.digest(&join(&normalized)),
            key_values: layout.keys.iter().map(|&i| cell(i).clone()).collect(),
            normalized,
        }
    }

    /// Canonical text of one cell.
    pub fn normalize(&self, value: &Value) -> String {
        if value.is_null() {
            return NULL_TOKEN.to_string();
        }
        let mut s = value.to_string();
        if self.options.trim_whitespace {
            s = s.trim().to_string();
        }
        if !self.options.case_sensitive {
            s = s.to_lowercase();
        }
        s
    }

    /// Hex digest of `s` under the configured algorithm.
    pub fn digest(&self, s: &str) -> String {
        match self.options.algorithm {
            HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(s.as_bytes())),
            HashAlgorithm::Blake3 => blake3::hash(s.as_bytes()).to_hex().to_string(),
        }
    }
}

fn join(parts: &[String]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        out.push_str(part);
    }
    out
}

fn positions(table: &Table, side: Side, columns: &[String]) -> Result<Vec<usize>, ReconError> {
    columns
        .iter()
        .map(|c| {
            table
                .column_index(c)
                .ok_or_else(|| ReconError::MissingColumn { side, column: c.clone() })
        })
        .collect()
}

/// Non-key source columns the target also has, in source order.
fn shared_value_columns(source: &Table, target: &Table, key_columns: &[String]) -> Vec<String> {
    source
        .columns()
        .iter()
        .filter(|c| !key_columns.contains(c) && target.has_column(c))
        .cloned()
        .collect()
}

fn record(
    status: RecordStatus,
    source: Option<&KeyedRow>,
    target: Option<&KeyedRow>,
    diff_columns: Vec<String>,
) -> RecordMatch {
    let key_values = source.or(target).map(|r| r.key_values.clone()).unwrap_or_default();
    RecordMatch {
        status,
        key_values,
        source_row: source.map(|r| r.index),
        target_row: target.map(|r| r.index),
        source_hash: source.map(|r| r.value_hash.clone()),
        target_hash: target.map(|r| r.value_hash.clone()),
        diff_columns,
    }
}
