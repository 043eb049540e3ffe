//! Table, record and search value types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw rows of cell strings as returned by a fetcher. Rows may be jagged.
pub type Grid = Vec<Vec<String>>;

/// A sheet advertised by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub id: String,
    pub name: String,
}

/// One data row, keyed by header name in header order.
///
/// Every header of the owning table has an entry; a missing cell is stored
/// as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Set the value for a header. An existing header keeps its position.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.0.insert(header.into(), value.into());
    }

    /// Cell value for a header, `None` if the header is unknown.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0.get(header).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, header: &str) -> bool {
        self.0.contains_key(header)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Header names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A normalized sheet: header row plus one record per data row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// A table with no headers and no records.
    #[must_use]
    pub fn empty(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            headers: Vec::new(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// A single `field = value` search criterion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub field: String,
    pub value: String,
}

impl FieldConstraint {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for FieldConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Error parsing a `FIELD=VALUE` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintParseError {
    #[error("Invalid constraint '{0}'. Expected FIELD=VALUE format")]
    MissingSeparator(String),

    #[error("Invalid constraint '{0}': field name is empty")]
    EmptyField(String),
}

impl FromStr for FieldConstraint {
    type Err = ConstraintParseError;

    /// Splits on the first `=`; the value may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| ConstraintParseError::MissingSeparator(s.to_string()))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(ConstraintParseError::EmptyField(s.to_string()));
        }
        Ok(Self::new(field, value))
    }
}

/// Best-guess identifying columns for a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedFields {
    pub primary: String,
    pub secondary: String,
}

impl DetectedFields {
    /// False when detection ran over an empty header row; search should be
    /// disabled in that case.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.primary.is_empty()
    }

    /// The detected fields in order, without repeating a field chosen twice.
    #[must_use]
    pub fn as_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(2);
        for f in [&self.primary, &self.secondary] {
            if !f.is_empty() && !fields.contains(f) {
                fields.push(f.clone());
            }
        }
        fields
    }
}
