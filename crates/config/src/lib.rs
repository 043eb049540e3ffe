//! Configuration for sheetseek
//!
//! Connection parameters (source identifier, credential reference, last
//! chosen search fields) and the stores that persist them.

pub mod source;
pub mod store;

pub use source::{ConfigPatch, SourceConfig, ENV_PREFIX};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
