// Text decoding and cell typing shared by the delimited and JSON readers

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use mdrecon_table::Value;

use crate::error::LoadError;

/// Tokens read as missing values in text sources.
pub const NA_TOKENS: &[&str] = &["", "NA", "N/A", "#N/A", "NULL", "null", "NaN", "nan", "None"];

/// Read a file and convert to UTF-8.
///
/// With an explicit encoding label the bytes are decoded with it. Without
/// one, UTF-8 is tried first and Windows-1252 (common for Excel-exported
/// CSVs) is the fallback, recorded as a warning.
pub fn read_file_as_utf8(
    path: &Path,
    encoding: Option<&str>,
    warnings: &mut Vec<String>,
) -> Result<String, LoadError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::SourceNotFound(path.display().to_string()),
        _ => LoadError::Io(format!("{}: {e}", path.display())),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
    decode(bytes, encoding, warnings)
}

pub fn decode(bytes: Vec<u8>, encoding: Option<&str>, warnings: &mut Vec<String>) -> Result<String, LoadError> {
    if let Some(label) = encoding {
        let enc = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| LoadError::Decode(format!("unknown encoding '{label}'")))?;
        let (decoded, _, had_errors) = enc.decode(&bytes);
        if had_errors {
            warnings.push(format!("some bytes were not valid {}; replaced", enc.name()));
        }
        return Ok(strip_bom(decoded.into_owned()));
    }

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(strip_bom(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::warn!("input is not valid UTF-8, decoded as windows-1252");
            warnings.push("input is not valid UTF-8; decoded as windows-1252".to_string());
            Ok(strip_bom(decoded.into_owned()))
        }
    }
}

fn strip_bom(s: String) -> String {
    match s.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => s,
    }
}

/// Type one raw text field.
///
/// NA tokens become Null; integers become Int unless they carry a leading
/// zero (identifiers such as ZIP codes keep their text form); decimals become
/// Float; `true`/`false` in any case become Bool. With `typed` off, only
/// empty fields become Null.
pub fn parse_cell(raw: &str, typed: bool) -> Value {
    if !typed {
        return if raw.is_empty() { Value::Null } else { Value::Text(raw.to_string()) };
    }

    let trimmed = raw.trim();
    if NA_TOKENS.contains(&trimmed) {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if looks_numeric(trimmed) {
        if !has_leading_zero(trimmed) {
            if let Ok(n) = trimmed.parse::<i64>() {
                return Value::Int(n);
            }
        }
        if trimmed.contains(['.', 'e', 'E']) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return Value::Float(n);
            }
        }
    }
    Value::Text(raw.to_string())
}

fn looks_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

/// Turn raw header cells into unique, non-empty column names.
///
/// Empty names become `column_<n>` (1-based); repeats get `.1`, `.2`, ...
/// suffixes and a warning.
pub fn header_names(raw: Vec<String>, warnings: &mut Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.into_iter().enumerate() {
        let base = match name.trim() {
            "" => format!("column_{}", i + 1),
            trimmed => trimmed.to_string(),
        };
        let mut candidate = base.clone();
        if used.contains(&candidate) {
            let n = suffixes.entry(base.clone()).or_insert(0);
            loop {
                *n += 1;
                candidate = format!("{base}.{n}");
                if !used.contains(&candidate) {
                    break;
                }
            }
            warnings.push(format!("duplicate column '{base}' renamed to '{candidate}'"));
        }
        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}
