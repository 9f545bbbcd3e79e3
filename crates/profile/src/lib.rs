//! Column profiling for loaded tables.
//!
//! A full scan computes null, uniqueness, numeric and string statistics and a
//! top-N histogram per column; pattern detection runs over a bounded, seeded
//! sample. Two profiles can be compared for schema differences and drift.

pub mod compare;
pub mod error;
pub mod model;
pub mod options;
pub mod patterns;
pub mod profiler;
pub mod quality;
pub mod stats;

pub use compare::{compare_schemas, detect_drift, ColumnDrift, DriftKind, DriftReport, SchemaComparison, TypeMismatch};
pub use error::ProfileError;
pub use model::{ColumnProfile, NumericStats, ProfileResult, StringStats, ValueCount};
pub use options::{DriftThresholds, ProfileOptions};
pub use profiler::Profiler;
