// Loader: builds tables from files, raw content and SQLite queries

pub mod csv;
pub mod error;
pub mod json;
pub mod loader;
pub mod options;
pub mod result;
pub mod schema;
pub mod sql;
pub mod text;
pub mod xlsx;

pub use error::LoadError;
pub use loader::load;
pub use options::{JsonFormat, LoadOptions, SheetSelector, Source, SourceType};
pub use result::LoadResult;
