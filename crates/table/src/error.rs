use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A column name lookup failed.
    UnknownColumn(String),
    /// Two columns share a name.
    DuplicateColumn(String),
    /// A row does not have one cell per column.
    RowWidth { row: usize, expected: usize, found: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownColumn(name) => write!(f, "unknown column '{name}'"),
            Self::DuplicateColumn(name) => write!(f, "duplicate column '{name}'"),
            Self::RowWidth { row, expected, found } => {
                write!(f, "row {row}: expected {expected} cells, found {found}")
            }
        }
    }
}

impl std::error::Error for TableError {}
