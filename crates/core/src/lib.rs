//! # sheetseek-core
//!
//! Core types for sheetseek.
//!
//! This crate provides:
//! - The table/record data model shared by every other crate
//! - Search constraint and detected-field value types
//! - Error types

/// Error types and result aliases.
pub mod error;
/// Table, record and search value types.
pub mod table;

/// Re-export core error types.
pub use error::{SeekError, SeekResult};
/// Re-export the data model.
pub use table::{
    ConstraintParseError, DetectedFields, FieldConstraint, Grid, Record, SheetInfo, Table,
};
