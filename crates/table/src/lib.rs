//! `mdrecon-table` — the in-memory table every other crate exchanges.
//!
//! Column order is fixed at construction and row order is insertion order.
//! Cells are typed `Value`s; nothing here coerces or validates content beyond
//! the table's shape.

pub mod error;
pub mod table;
pub mod value;

pub use error::TableError;
pub use table::{Row, Table};
pub use value::{DType, Value};
