//! # sheetseek-session
//!
//! Search sessions over a remote spreadsheet.
//!
//! A session threads the source identifier and the selected sheet
//! explicitly; nothing is kept in process-wide state.
//!
//! ```text
//! Idle -> SheetLoading -> SheetReady -> Searching -> Resolved(Found | NotFound)
//! ```
//!
//! A failed load returns to `Idle`. Selecting another sheet from any state
//! starts a new load and the last requested sheet wins.

mod connect;
mod session;
mod state;

pub use connect::{detector_for, fetcher_for};
pub use session::SearchSession;
pub use state::{LoadOutcome, LoadTicket, LoadedSheet, SearchOutcome, SessionState};
