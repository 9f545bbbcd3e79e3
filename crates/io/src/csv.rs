// Delimited text (CSV/TSV/PSV) import

use mdrecon_table::{Table, Value};

use crate::error::LoadError;
use crate::options::LoadOptions;
use crate::text::{header_names, parse_cell};

/// Candidate delimiters, in sniffing order.
const CANDIDATES: &[u8] = &[b'\t', b';', b',', b'|'];

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field on the header line) wins.
/// Returns `None` when no candidate splits the header.
pub fn sniff_delimiter(content: &str) -> Option<u8> {
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return None;
    }

    let mut best = None;
    let mut best_score = 0u64;

    for &delim in CANDIDATES {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Ties go to the higher field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = Some(delim);
        }
    }

    best
}

/// Resolve the delimiter: explicit option, then extension hint, then sniffing.
/// Falls back to comma with a warning when sniffing finds nothing.
pub fn resolve_delimiter(
    content: &str,
    options: &LoadOptions,
    hint: Option<u8>,
    warnings: &mut Vec<String>,
) -> Result<u8, LoadError> {
    if let Some(c) = options.delimiter {
        if !c.is_ascii() {
            return Err(LoadError::UnsupportedSource(format!("delimiter '{c}' is not ASCII")));
        }
        return Ok(c as u8);
    }
    if let Some(d) = hint {
        return Ok(d);
    }
    match sniff_delimiter(content) {
        Some(d) => {
            log::debug!("sniffed delimiter {:?}", d as char);
            Ok(d)
        }
        None => {
            log::warn!("could not detect delimiter, defaulting to ','");
            warnings.push("could not detect delimiter; defaulting to ','".to_string());
            Ok(b',')
        }
    }
}

/// Parse delimited text into a table.
///
/// Rows whose field count differs from the header, and rows the parser
/// rejects, are skipped with a warning. Reading stops once `limit` rows are
/// kept.
pub fn read(
    content: &str,
    delimiter: u8,
    options: &LoadOptions,
    limit: Option<usize>,
    warnings: &mut Vec<String>,
) -> Result<Table, LoadError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let mut table: Option<Table> = None;

    if options.has_header {
        match records.next() {
            Some(Ok(header)) => {
                let raw = header.iter().map(|h| h.to_string()).collect();
                table = Some(Table::new(header_names(raw, warnings))?);
            }
            Some(Err(e)) => return Err(LoadError::Parse(format!("unreadable header: {e}"))),
            None => return Ok(Table::default()),
        }
    }

    for result in records {
        if limit.is_some_and(|max| table.as_ref().is_some_and(|t| t.row_count() >= max)) {
            break;
        }

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                let warning = LoadError::MalformedRecord { line, message: e.to_string() };
                log::warn!("{warning}");
                warnings.push(warning.to_string());
                continue;
            }
        };

        let table = table.get_or_insert_with(|| {
            let names = (1..=record.len()).map(|i| format!("column_{i}"));
            Table::new(names).unwrap_or_default()
        });

        if record.len() != table.column_count() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let warning = LoadError::MalformedRow {
                line,
                expected: table.column_count(),
                found: record.len(),
            };
            log::warn!("{warning}");
            warnings.push(warning.to_string());
            continue;
        }

        let row: Vec<Value> = record.iter().map(|f| parse_cell(f, options.typed_cells)).collect();
        table.push_row(row)?;
    }

    Ok(table.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(content: &str) -> (Table, Vec<String>) {
        let mut warnings = Vec::new();
        let options = LoadOptions::default();
        let delim = resolve_delimiter(content, &options, None, &mut warnings).unwrap();
        let table = read(content, delim, &options, None, &mut warnings).unwrap();
        (table, warnings)
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), Some(b';'));
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), Some(b','));
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), Some(b'\t'));
    }

    #[test]
    fn test_sniff_pipe_delimiter() {
        let content = "Name|Age|City\nAlice|30|Paris\nBob|25|London\n";
        assert_eq!(sniff_delimiter(content), Some(b'|'));
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        // Semicolon delimiter but commas appear inside quoted fields
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), Some(b';'));
    }

    #[test]
    fn test_unknown_delimiter_falls_back_to_comma() {
        let content = "id#name\n1#Alice\n";
        assert_eq!(sniff_delimiter(content), None);
        let (table, warnings) = read_str(content);
        assert_eq!(table.columns(), &["id#name".to_string()]);
        assert_eq!(table.row_count(), 1);
        assert!(warnings.iter().any(|w| w.contains("defaulting to ','")));
    }

    #[test]
    fn test_read_typed_rows() {
        let (table, warnings) = read_str("id,name,amount\n1,Alice,10.5\n2,Bob,\n");
        assert!(warnings.is_empty());
        assert_eq!(table.row_count(), 2);
        let row = table.row(0).unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("amount"), Some(&Value::Float(10.5)));
        assert_eq!(table.row(1).unwrap().get("amount"), Some(&Value::Null));
    }

    #[test]
    fn test_malformed_rows_skipped_with_warning() {
        let (table, warnings) = read_str("id,name\n1,Alice\n2,Bob,extra\n3,Carl\n");
        assert_eq!(table.row_count(), 2);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("expected 2 fields, found 3"));
    }

    #[test]
    fn test_no_header_generates_names() {
        let mut warnings = Vec::new();
        let options = LoadOptions { has_header: false, ..LoadOptions::default() };
        let table = read("1,Alice\n2,Bob\n", b',', &options, None, &mut warnings).unwrap();
        assert_eq!(table.columns(), &["column_1".to_string(), "column_2".to_string()]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_limit_stops_reading() {
        let mut warnings = Vec::new();
        let options = LoadOptions::default();
        let table = read("a\n1\n2\n3\n4\n", b',', &options, Some(2), &mut warnings).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_empty_content() {
        let (table, _) = read_str("");
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }
}
