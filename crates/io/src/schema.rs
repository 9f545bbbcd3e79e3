// Diagnostic schema inference. Never coerces the loaded values.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use mdrecon_table::{DType, Table, Value};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Column name → inferred class, over non-null values.
pub fn infer_schema(table: &Table) -> BTreeMap<String, DType> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let values = table.rows().filter_map(|r| r.get_index(i));
            (name.clone(), infer_column(values))
        })
        .collect()
}

/// Narrowest class covering every non-null value; `string` when empty.
pub fn infer_column<'a>(values: impl Iterator<Item = &'a Value>) -> DType {
    let mut dtype: Option<DType> = None;
    for value in values {
        let Some(class) = classify(value) else { continue };
        let next = match dtype {
            None => class,
            Some(prev) => prev.unify(class),
        };
        if next == DType::String {
            return DType::String;
        }
        dtype = Some(next);
    }
    dtype.unwrap_or(DType::String)
}

/// Class of one cell. Text is parsed; other variants map directly.
pub fn classify(value: &Value) -> Option<DType> {
    match value {
        Value::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(classify_text(s))
            }
        }
        other => other.dtype(),
    }
}

pub fn classify_text(s: &str) -> DType {
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return DType::Boolean;
    }
    if s.parse::<i64>().is_ok() {
        return DType::Integer;
    }
    if s.chars().any(|c| c.is_ascii_digit()) && s.parse::<f64>().is_ok() {
        return DType::Decimal;
    }
    if is_datetime(s) {
        return DType::Datetime;
    }
    DType::String
}

fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || DATETIME_FORMATS.iter().any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
        || DATE_FORMATS.iter().any(|f| NaiveDate::parse_from_str(s, f).is_ok())
}
