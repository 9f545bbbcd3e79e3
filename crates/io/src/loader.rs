// Load entry point: resolve the source type, dispatch to a reader, then
// apply the column projection and row cap.

use std::path::Path;
use std::time::Instant;

use mdrecon_table::Table;

use crate::error::LoadError;
use crate::options::{LoadOptions, Source, SourceType};
use crate::result::LoadResult;
use crate::text::read_file_as_utf8;

/// Load a table. Never fails: unreachable sources and parse failures come
/// back as an unsuccessful [`LoadResult`] carrying the error text.
pub fn load(source: &Source, options: &LoadOptions) -> LoadResult {
    let started = Instant::now();
    let mut warnings = Vec::new();

    let (source_type, hint) = match resolve_type(source, options) {
        Ok(resolved) => resolved,
        Err(e) => {
            log::warn!("load {} failed: {e}", source.describe());
            return LoadResult::failed(None, e, warnings, started);
        }
    };

    log::debug!("loading {} as {source_type}", source.describe());

    match read_table(source, source_type, hint, options, &mut warnings)
        .and_then(|table| finish(table, options, &mut warnings))
    {
        Ok(table) => {
            let result = LoadResult::loaded(table, source_type, warnings, started);
            log::info!(
                "loaded {} rows x {} columns from {} in {}ms ({} warnings)",
                result.rows_loaded,
                result.columns.len(),
                source.describe(),
                result.load_time_ms,
                result.warnings.len()
            );
            result
        }
        Err(e) => {
            log::warn!("load {} failed: {e}", source.describe());
            LoadResult::failed(Some(source_type), e, warnings, started)
        }
    }
}

/// Source type and delimiter hint. Explicit option wins, then the file
/// extension, then content sniffing.
fn resolve_type(source: &Source, options: &LoadOptions) -> Result<(SourceType, Option<u8>), LoadError> {
    let from_ext = match source {
        Source::Path(path) => SourceType::from_path(path),
        _ => None,
    };

    if let Some(explicit) = options.source_type {
        let hint = from_ext.and_then(|(t, hint)| (t == explicit).then_some(hint).flatten());
        return Ok((explicit, hint));
    }

    match source {
        Source::Query { .. } => Ok((SourceType::Sql, None)),
        Source::Content(content) => Ok((sniff_content(content), None)),
        Source::Path(path) => from_ext.ok_or_else(|| {
            if path.exists() {
                LoadError::UnsupportedSource(format!(
                    "cannot infer source type of '{}'; set source_type",
                    path.display()
                ))
            } else {
                LoadError::SourceNotFound(path.display().to_string())
            }
        }),
    }
}

fn sniff_content(content: &str) -> SourceType {
    match content.trim_start().chars().next() {
        Some('[') | Some('{') => SourceType::Json,
        _ => SourceType::Csv,
    }
}

fn read_table(
    source: &Source,
    source_type: SourceType,
    hint: Option<u8>,
    options: &LoadOptions,
    warnings: &mut Vec<String>,
) -> Result<Table, LoadError> {
    // One extra row so truncation can tell whether anything was dropped
    let limit = options.max_rows.map(|n| n.saturating_add(1));

    match source_type {
        SourceType::Csv => {
            let content = text_of(source, options, warnings)?;
            let delimiter = crate::csv::resolve_delimiter(&content, options, hint, warnings)?;
            crate::csv::read(&content, delimiter, options, limit, warnings)
        }
        SourceType::Json => {
            let content = text_of(source, options, warnings)?;
            crate::json::read(&content, options, warnings)
        }
        SourceType::Excel => match source {
            Source::Path(path) => crate::xlsx::read(path, options, limit, warnings),
            _ => Err(LoadError::UnsupportedSource(
                "spreadsheets can only be loaded from a file path".into(),
            )),
        },
        SourceType::Sql => match source {
            Source::Query { connection, query, params } => {
                crate::sql::read(connection, query, params, limit, warnings)
            }
            Source::Path(path) => {
                let query = options.query.as_deref().ok_or_else(|| {
                    LoadError::UnsupportedSource(format!(
                        "database file '{}' needs a query",
                        path.display()
                    ))
                })?;
                crate::sql::read(&path_str(path)?, query, &[], limit, warnings)
            }
            Source::Content(_) => Err(LoadError::UnsupportedSource(
                "SQL sources need a connection string".into(),
            )),
        },
    }
}

fn text_of(source: &Source, options: &LoadOptions, warnings: &mut Vec<String>) -> Result<String, LoadError> {
    match source {
        Source::Path(path) => read_file_as_utf8(path, options.encoding.as_deref(), warnings),
        Source::Content(content) => Ok(content.clone()),
        Source::Query { .. } => Err(LoadError::UnsupportedSource(
            "query sources cannot be read as text".into(),
        )),
    }
}

fn path_str(path: &Path) -> Result<String, LoadError> {
    path.to_str()
        .map(String::from)
        .ok_or_else(|| LoadError::Io(format!("path is not valid UTF-8: {}", path.display())))
}

/// Apply the column projection and row cap.
fn finish(table: Table, options: &LoadOptions, warnings: &mut Vec<String>) -> Result<Table, LoadError> {
    let mut table = match &options.columns {
        Some(requested) => {
            let missing: Vec<String> = requested
                .iter()
                .filter(|c| !table.has_column(c))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(LoadError::MissingColumns(missing));
            }
            table.select(requested.as_slice())?
        }
        None => table,
    };

    if let Some(max) = options.max_rows {
        if table.row_count() > max {
            table.truncate(max);
            let warning = format!("results truncated to max_rows = {max}");
            log::warn!("{warning}");
            warnings.push(warning);
        }
    }

    Ok(table)
}
