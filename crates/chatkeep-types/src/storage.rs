//! Storage types for the conversation store.

use std::path::PathBuf;

/// Suffix of every conversation file in the storage directory.
pub const CONVERSATION_FILE_SUFFIX: &str = ".json";

/// A file that was ignored while rehydrating the store.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of scanning the storage directory at startup.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Number of records loaded into memory.
    pub loaded: usize,
    /// Files that could not be read or parsed.
    pub skipped: Vec<SkippedFile>,
}
