use std::fmt;
use std::path::{Path, PathBuf};

use mdrecon_table::Value;
use serde::{Deserialize, Serialize};

/// Where a table comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A file on disk. Type comes from options or the extension.
    Path(PathBuf),
    /// Raw delimited or JSON text already in memory.
    Content(String),
    /// A query against a connection string, with positional `?` parameters.
    Query {
        connection: String,
        query: String,
        params: Vec<Value>,
    },
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self::Content(content.into())
    }

    pub fn query(connection: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Query {
            connection: connection.into(),
            query: query.into(),
            params: Vec::new(),
        }
    }

    /// Human-readable description for messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Content(c) => format!("<{} bytes of content>", c.len()),
            Self::Query { connection, .. } => connection.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Csv,
    Json,
    Excel,
    Sql,
}

impl SourceType {
    /// Type implied by a file extension, plus a delimiter hint for `.tsv`/`.psv`.
    pub fn from_path(path: &Path) -> Option<(SourceType, Option<u8>)> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some((SourceType::Csv, None)),
            "tsv" | "tab" => Some((SourceType::Csv, Some(b'\t'))),
            "psv" => Some((SourceType::Csv, Some(b'|'))),
            "json" | "jsonl" | "ndjson" => Some((SourceType::Json, None)),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some((SourceType::Excel, None)),
            "db" | "sqlite" | "sqlite3" => Some((SourceType::Sql, None)),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Excel => write!(f, "excel"),
            Self::Sql => write!(f, "sql"),
        }
    }
}

/// JSON sub-format. Auto-detected when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonFormat {
    /// `[{...}, {...}]`
    Records,
    /// One object per line.
    Lines,
    /// Records live under a dotted path inside a larger document.
    Nested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub source_type: Option<SourceType>,
    /// Explicit field delimiter; skips sniffing.
    pub delimiter: Option<char>,
    pub has_header: bool,
    /// Encoding label (e.g. "windows-1252"). UTF-8 when unset.
    pub encoding: Option<String>,
    /// Parse numbers, booleans and NA tokens in text sources.
    pub typed_cells: bool,
    pub json_format: Option<JsonFormat>,
    /// Dotted path to the record array, e.g. `data.items`.
    pub json_path: Option<String>,
    pub sheet: Option<SheetSelector>,
    /// Query to run when a database file is given as a path source.
    pub query: Option<String>,
    pub max_rows: Option<usize>,
    /// Restrict the loaded table to these columns, in this order.
    pub columns: Option<Vec<String>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            source_type: None,
            delimiter: None,
            has_header: true,
            encoding: None,
            typed_cells: true,
            json_format: None,
            json_path: None,
            sheet: None,
            query: None,
            max_rows: None,
            columns: None,
        }
    }
}
