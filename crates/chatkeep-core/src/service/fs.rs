//! FileSystem trait for abstracting file I/O.
//!
//! Defined in chatkeep-core so the conversation store can be written against
//! an interface rather than `tokio::fs` directly. The `LocalFileSystem`
//! adapter lives in chatkeep-infra; tests substitute failing implementations.

use std::path::{Path, PathBuf};

/// Abstraction over the filesystem operations the conversation store needs.
pub trait FileSystem: Send + Sync {
    /// Write string content to a file, replacing it whole.
    fn write_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Read a file's content as a string.
    fn read_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<String, std::io::Error>> + Send;

    /// Create a directory and all parent directories.
    fn create_dir_all(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// List the regular files directly inside a directory.
    fn list_files(
        &self,
        dir: &Path,
    ) -> impl std::future::Future<Output = Result<Vec<PathBuf>, std::io::Error>> + Send;

    /// Remove a single file.
    fn remove_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;
}
