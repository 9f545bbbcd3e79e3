use std::fmt;

use mdrecon_table::TableError;

/// Failure computing one column's profile. Recorded against that column;
/// never aborts the whole profile.
#[derive(Debug)]
pub enum ProfileError {
    /// A requested column the table does not have.
    UnknownColumn(String),
    Table(TableError),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownColumn(name) => write!(f, "column '{name}' not found"),
            Self::Table(e) => write!(f, "table error: {e}"),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<TableError> for ProfileError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::UnknownColumn(name) => Self::UnknownColumn(name),
            other => Self::Table(other),
        }
    }
}
