//! `mdrecon` — Master-data reconciliation workbench.
//!
//! Loads tables from files, content or SQLite queries, profiles them for
//! quality and drift, and reconciles pairs exactly (by key hashing) or
//! approximately (by string similarity). Every operation returns a result
//! envelope with `success`, `errors` and `warnings`.

pub mod error;
pub mod workbench;

pub use error::WorkbenchError;
pub use workbench::Workbench;

pub use mdrecon_config::Settings;
pub use mdrecon_io::{LoadOptions, LoadResult, Source, SourceType};
pub use mdrecon_profile::{DriftReport, ProfileResult, SchemaComparison};
pub use mdrecon_recon::{
    CompareRequest, CompareResult, DedupeResult, KeepPolicy, MatchResult, RecordStatus, SimilarityMethod,
};
pub use mdrecon_table::{DType, Table, Value};
