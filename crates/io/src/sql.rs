// Parametrized queries against SQLite connection strings

use std::path::Path;

use mdrecon_table::{Table, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};

use crate::error::LoadError;
use crate::text::header_names;

const MEMORY: &str = "sqlite::memory:";

/// Open a connection string read-only.
///
/// Accepted forms: `sqlite://relative.db`, `sqlite:///abs/path.db`,
/// `sqlite::memory:` and a bare file path.
pub fn open(connection: &str) -> Result<Connection, LoadError> {
    if connection == MEMORY || connection == ":memory:" {
        return Connection::open_in_memory().map_err(|e| LoadError::Sql(e.to_string()));
    }

    let path = match connection.strip_prefix("sqlite://") {
        Some(rest) => rest,
        None if connection.contains("://") => {
            let scheme = connection.split("://").next().unwrap_or_default();
            return Err(LoadError::UnsupportedSource(format!(
                "connection scheme '{scheme}' (only sqlite is supported)"
            )));
        }
        None => connection,
    };

    if !Path::new(path).exists() {
        return Err(LoadError::SourceNotFound(path.to_string()));
    }

    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| LoadError::SourceNotFound(format!("{path}: {e}")))
}

/// Run `query` with positional parameters and collect the result set.
pub fn read(
    connection: &str,
    query: &str,
    params: &[Value],
    limit: Option<usize>,
    warnings: &mut Vec<String>,
) -> Result<Table, LoadError> {
    let conn = open(connection)?;
    query_table(&conn, query, params, limit, warnings)
}

pub fn query_table(
    conn: &Connection,
    query: &str,
    params: &[Value],
    limit: Option<usize>,
    warnings: &mut Vec<String>,
) -> Result<Table, LoadError> {
    let mut stmt = conn.prepare(query).map_err(|e| LoadError::Sql(e.to_string()))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = names.len();
    let mut table = Table::new(header_names(names, warnings))?;

    let bound: Vec<SqlValue> = params.iter().map(to_sql).collect();
    let mut rows = stmt
        .query(params_from_iter(bound.iter()))
        .map_err(|e| LoadError::Sql(e.to_string()))?;

    while let Some(row) = rows.next().map_err(|e| LoadError::Sql(e.to_string()))? {
        if limit.is_some_and(|max| table.row_count() >= max) {
            break;
        }
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let cell = row.get_ref(i).map_err(|e| LoadError::Sql(e.to_string()))?;
            cells.push(from_sql(cell));
        }
        table.push_row(cells)?;
    }

    Ok(table)
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(n) => SqlValue::Real(*n),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::DateTime(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(n) => Value::Float(n),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Text(format!("<{} bytes>", bytes.len())),
    }
}
