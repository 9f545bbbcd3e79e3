use std::collections::HashMap;

use crate::error::TableError;
use crate::value::{DType, Value};

/// Ordered named columns and ordered rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with the given columns. Names must be unique.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, TableError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { columns, index, rows: Vec::new() })
    }

    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<Row<'_>> {
        self.rows.get(i).map(|cells| Row { table: self, index: i, cells })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, cells)| Row { table: self, index, cells })
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_, TableError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Projection onto `names`, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let indices = names
            .iter()
            .map(|n| {
                self.column_index(n.as_ref())
                    .ok_or_else(|| TableError::UnknownColumn(n.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Table::new(names.iter().map(|n| n.as_ref().to_string()))?;
        out.rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(out)
    }

    /// Keep only the first `n` rows.
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Column dtype derived from the non-null cell variants.
    pub fn column_dtype(&self, name: &str) -> Result<DType, TableError> {
        let mut dtype: Option<DType> = None;
        for value in self.column_values(name)? {
            if let Some(d) = value.dtype() {
                dtype = Some(match dtype {
                    None => d,
                    Some(prev) => prev.unify(d),
                });
                if dtype == Some(DType::String) {
                    break;
                }
            }
        }
        Ok(dtype.unwrap_or(DType::String))
    }
}

/// Borrowed view of one row with by-name cell access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table.column_index(column).map(|i| &self.cells[i])
    }

    pub fn get_index(&self, i: usize) -> Option<&'a Value> {
        self.cells.get(i)
    }

    pub fn values(&self) -> &'a [Value] {
        self.cells
    }
}
