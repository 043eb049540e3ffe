use serde::Serialize;
use sheetseek_core::{DetectedFields, Record, Table};
use std::fmt;

/// A normalized sheet together with the fields detected for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedSheet {
    pub table: Table,
    pub detected: DetectedFields,
}

/// Result of a search. Not finding a record is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "record", rename_all = "camelCase")]
pub enum SearchOutcome {
    Found(Record),
    NotFound,
}

impl SearchOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

/// Where a search session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SheetLoading { sheet: String },
    SheetReady,
    Searching,
    Resolved(SearchOutcome),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::SheetLoading { sheet } => write!(f, "loading '{sheet}'"),
            Self::SheetReady => write!(f, "ready"),
            Self::Searching => write!(f, "searching"),
            Self::Resolved(SearchOutcome::Found(_)) => write!(f, "found"),
            Self::Resolved(SearchOutcome::NotFound) => write!(f, "not found"),
        }
    }
}

/// Handle for one sheet load. Only the most recently issued ticket can
/// complete a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) generation: u64,
    pub(crate) sheet: String,
}

impl LoadTicket {
    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}

/// How a completed load affected the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The sheet is loaded and searchable.
    Ready,
    /// The sheet no longer exists; an empty table stands in for it.
    Unavailable { sheet: String },
    /// A newer load was requested; this result was discarded.
    Stale,
}
