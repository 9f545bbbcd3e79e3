use std::collections::BTreeMap;
use std::time::Instant;

use mdrecon_table::{DType, Table};
use serde::Serialize;

use crate::error::LoadError;
use crate::options::SourceType;
use crate::schema::infer_schema;

/// Outcome of one load. Failures are carried here, never raised.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResult {
    pub success: bool,
    #[serde(skip)]
    pub table: Option<Table>,
    pub rows_loaded: usize,
    pub columns: Vec<String>,
    pub source_type: Option<SourceType>,
    pub schema: BTreeMap<String, DType>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub load_time_ms: u64,
}

impl LoadResult {
    pub(crate) fn loaded(
        table: Table,
        source_type: SourceType,
        warnings: Vec<String>,
        started: Instant,
    ) -> Self {
        Self {
            success: true,
            rows_loaded: table.row_count(),
            columns: table.columns().to_vec(),
            source_type: Some(source_type),
            schema: infer_schema(&table),
            table: Some(table),
            warnings,
            errors: Vec::new(),
            load_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    pub(crate) fn failed(
        source_type: Option<SourceType>,
        error: LoadError,
        warnings: Vec<String>,
        started: Instant,
    ) -> Self {
        Self {
            success: false,
            table: None,
            rows_loaded: 0,
            columns: Vec::new(),
            source_type,
            schema: BTreeMap::new(),
            warnings,
            errors: vec![error.to_string()],
            load_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Take the loaded table, if any.
    pub fn into_table(self) -> Option<Table> {
        self.table
    }
}
