use std::fmt;

use mdrecon_table::TableError;

use crate::model::Side;

#[derive(Debug)]
pub enum ReconError {
    /// Unusable matcher configuration or a scoring method the scorer lacks.
    /// Raised at construction.
    Configuration(String),
    /// Request that cannot be satisfied (no key columns, etc.).
    Validation(String),
    /// Missing key or value column on one side.
    MissingColumn { side: Side, column: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    Table(TableError),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::MissingColumn { side, column } => {
                write!(f, "{side}: missing column '{column}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::Table(e) => write!(f, "table error: {e}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<TableError> for ReconError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}
