//! Sheet normalization and record matching for sheetseek
//!
//! Turns a raw grid fetched from a spreadsheet into a [`Table`], proposes
//! which columns identify a person or entity, and resolves a set of
//! `field = value` constraints to at most one record. Everything here is
//! synchronous and pure.
//!
//! # Examples
//!
//! ## Normalizing a grid
//!
//! ```
//! use sheetseek_sheet::normalize;
//!
//! let grid = vec![
//!     vec!["ID".to_string(), "Name".to_string()],
//!     vec!["1".to_string(), "Alice".to_string()],
//!     vec!["2".to_string(), "Bob".to_string()],
//! ];
//! let table = normalize("Customers", &grid);
//!
//! assert_eq!(table.headers, vec!["ID", "Name"]);
//! assert_eq!(table.record_count(), 2);
//! ```
//!
//! ## Detecting identifying fields
//!
//! ```
//! use sheetseek_sheet::detect_fields;
//!
//! let fields = detect_fields(&["ID", "Full Name", "DOB"]);
//! assert_eq!(fields.primary, "Full Name");
//! assert_eq!(fields.secondary, "DOB");
//! ```
//!
//! ## Finding a record
//!
//! ```
//! use sheetseek_core::FieldConstraint;
//! use sheetseek_sheet::{find_match, normalize};
//!
//! let grid = vec![
//!     vec!["ID".to_string(), "Name".to_string()],
//!     vec!["1".to_string(), "Alice".to_string()],
//! ];
//! let table = normalize("Customers", &grid);
//!
//! let record = find_match(&table, &[FieldConstraint::new("Name", "alice")]).unwrap();
//! assert_eq!(record.get("ID"), Some("1"));
//! ```

mod detect;
mod matcher;
mod normalize;

/// Re-export field detection.
pub use detect::{detect_fields, FieldDetector, DOB_INDICATORS, NAME_INDICATORS};
/// Re-export record matching.
pub use matcher::{find_by_id, find_match};
/// Re-export grid normalization.
pub use normalize::normalize;
/// Re-export the data model for convenience.
pub use sheetseek_core::{DetectedFields, FieldConstraint, Grid, Record, Table};
