// JSON import: record arrays, newline-delimited records, nested paths

use std::collections::HashMap;

use mdrecon_table::{Table, Value};
use serde_json::Value as JsonValue;

use crate::error::LoadError;
use crate::options::{JsonFormat, LoadOptions};

/// One flattened record: (column, value) in key order.
type Record = Vec<(String, Value)>;

/// Parse JSON text into a table, auto-detecting the sub-format when unset.
pub fn read(content: &str, options: &LoadOptions, warnings: &mut Vec<String>) -> Result<Table, LoadError> {
    let path = options.json_path.as_deref();
    let records = match options.json_format {
        Some(JsonFormat::Lines) => read_lines(content, warnings),
        Some(JsonFormat::Records) => records_from_array(parse(content)?)?,
        Some(JsonFormat::Nested) => records_at_path(parse(content)?, path)?,
        None => match serde_json::from_str::<JsonValue>(content) {
            Ok(doc @ JsonValue::Array(_)) => records_from_array(doc)?,
            Ok(doc @ JsonValue::Object(_)) => records_at_path(doc, path)?,
            Ok(_) => {
                return Err(LoadError::Parse(
                    "top-level JSON value must be an array or an object".into(),
                ))
            }
            Err(e) => {
                let lines = content.lines().filter(|l| !l.trim().is_empty()).count();
                if lines > 1 {
                    log::debug!("document parse failed, reading as newline-delimited JSON");
                    read_lines(content, warnings)
                } else {
                    return Err(LoadError::Parse(e.to_string()));
                }
            }
        },
    };
    build_table(records)
}

fn parse(content: &str) -> Result<JsonValue, LoadError> {
    serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))
}

fn read_lines(content: &str, warnings: &mut Vec<String>) -> Vec<Record> {
    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message = match serde_json::from_str::<JsonValue>(line) {
            Ok(JsonValue::Object(map)) => {
                let mut record = Vec::new();
                flatten_object(None, &map, &mut record);
                records.push(record);
                continue;
            }
            Ok(_) => "expected a JSON object".to_string(),
            Err(e) => e.to_string(),
        };
        let warning = LoadError::MalformedRecord { line: i as u64 + 1, message };
        log::warn!("{warning}");
        warnings.push(warning.to_string());
    }
    records
}

fn records_from_array(doc: JsonValue) -> Result<Vec<Record>, LoadError> {
    let JsonValue::Array(items) = doc else {
        return Err(LoadError::Parse("expected a JSON array of records".into()));
    };
    Ok(items
        .into_iter()
        .map(|item| {
            let mut record = Vec::new();
            match item {
                JsonValue::Object(map) => flatten_object(None, &map, &mut record),
                scalar => record.push(("value".to_string(), to_value(&scalar))),
            }
            record
        })
        .collect())
}

/// Follow a dotted path (`data.items`, `results.0.rows`) to the records.
///
/// Without a path, an object holding exactly one array-of-objects field is
/// unwrapped to that field; any other object is a single record.
fn records_at_path(doc: JsonValue, path: Option<&str>) -> Result<Vec<Record>, LoadError> {
    let target = match path {
        Some(path) => {
            let mut current = doc;
            for segment in path.split('.').filter(|s| !s.is_empty()) {
                let next = match current {
                    JsonValue::Object(mut map) => map.remove(segment),
                    JsonValue::Array(mut items) => segment
                        .parse::<usize>()
                        .ok()
                        .filter(|&i| i < items.len())
                        .map(|i| items.swap_remove(i)),
                    _ => None,
                };
                current = next.ok_or_else(|| {
                    LoadError::Parse(format!("json_path '{path}': segment '{segment}' not found"))
                })?;
            }
            current
        }
        None => unwrap_single_record_array(doc),
    };

    match target {
        JsonValue::Array(_) => records_from_array(target),
        JsonValue::Object(map) => {
            let mut record = Vec::new();
            flatten_object(None, &map, &mut record);
            Ok(vec![record])
        }
        _ => Err(LoadError::Parse("json_path does not point at records".into())),
    }
}

fn unwrap_single_record_array(doc: JsonValue) -> JsonValue {
    let JsonValue::Object(mut map) = doc else {
        return doc;
    };
    let candidates: Vec<String> = map
        .iter()
        .filter(|(_, v)| match v {
            JsonValue::Array(items) => !items.is_empty() && items.iter().all(JsonValue::is_object),
            _ => false,
        })
        .map(|(k, _)| k.clone())
        .collect();

    if let [key] = candidates.as_slice() {
        log::debug!("using nested record array '{key}'");
        if let Some(records) = map.remove(key) {
            return records;
        }
    }
    JsonValue::Object(map)
}

/// Flatten nested objects to dotted column names; arrays stay as JSON text.
fn flatten_object(prefix: Option<&str>, map: &serde_json::Map<String, JsonValue>, out: &mut Record) {
    for (key, value) in map {
        let name = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            JsonValue::Object(inner) if !inner.is_empty() => flatten_object(Some(&name), inner, out),
            other => out.push((name, to_value(other))),
        }
    }
}

fn to_value(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(v.to_string()),
    }
}

/// Union of record keys in first-seen order; missing keys are Null.
fn build_table(records: Vec<Record>) -> Result<Table, LoadError> {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in &records {
        for (name, _) in record {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let mut table = Table::new(columns.iter().cloned())?;
    for record in records {
        let mut row = vec![Value::Null; columns.len()];
        for (name, value) in record {
            if let Some(&i) = positions.get(&name) {
                row[i] = value;
            }
        }
        table.push_row(row)?;
    }
    Ok(table)
}
