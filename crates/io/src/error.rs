use std::fmt;

use mdrecon_table::TableError;

#[derive(Debug)]
pub enum LoadError {
    /// File or database does not exist or cannot be opened for reading.
    SourceNotFound(String),
    /// Source type or connection scheme this loader does not handle.
    UnsupportedSource(String),
    /// Bytes could not be decoded with the requested encoding.
    Decode(String),
    /// Whole-document parse failure (JSON, workbook).
    Parse(String),
    /// A delimited row whose field count differs from the header.
    MalformedRow { line: u64, expected: usize, found: usize },
    /// A row or record the parser rejected outright.
    MalformedRecord { line: u64, message: String },
    /// Requested sheet missing or unreadable.
    Sheet(String),
    /// Query preparation or execution failure.
    Sql(String),
    /// Explicitly requested columns that the source does not have.
    MissingColumns(Vec<String>),
    Table(TableError),
    Io(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound(src) => write!(f, "source not found: {src}"),
            Self::UnsupportedSource(msg) => write!(f, "unsupported source: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::MalformedRow { line, expected, found } => {
                write!(f, "line {line}: expected {expected} fields, found {found}; row skipped")
            }
            Self::MalformedRecord { line, message } => {
                write!(f, "line {line}: {message}; row skipped")
            }
            Self::Sheet(msg) => write!(f, "sheet error: {msg}"),
            Self::Sql(msg) => write!(f, "SQL error: {msg}"),
            Self::MissingColumns(cols) => {
                write!(f, "requested column(s) not found: {}", cols.join(", "))
            }
            Self::Table(e) => write!(f, "table error: {e}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<TableError> for LoadError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}
