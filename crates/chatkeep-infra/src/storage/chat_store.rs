//! Directory-backed conversation store.
//!
//! Implements the `ChatRepository` trait from `chatkeep-core`. Records are
//! held in a `DashMap` keyed by conversation id and mirrored to one JSON file
//! per conversation:
//!
//! ```text
//! {data_dir}/chats/
//!   chat_1718000000000_k3j9x2a1b.json
//!   chat_1718000055000_p0q8r7s6t.json
//! ```
//!
//! Every mutation updates memory first, then disk. A failed disk step is
//! reported to the caller but memory is not rolled back.
//!
//! Each id keeps the sequence number of its first insertion. `list()` uses it
//! to order records whose timestamps are equal.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use chatkeep_core::chat::repository::ChatRepository;
use chatkeep_core::service::fs::FileSystem;
use chatkeep_types::chat::{ConversationId, ConversationRecord};
use chatkeep_types::error::StoreError;
use chatkeep_types::storage::{CONVERSATION_FILE_SUFFIX, LoadReport, SkippedFile};

use crate::filesystem::LocalFileSystem;

/// Conversation store backed by a directory of JSON files.
pub struct FileChatStore<F: FileSystem = LocalFileSystem> {
    dir: PathBuf,
    fs: F,
    records: DashMap<ConversationId, Slot>,
    next_seq: AtomicU64,
}

/// A stored record with its insertion sequence.
struct Slot {
    seq: u64,
    record: ConversationRecord,
}

impl FileChatStore<LocalFileSystem> {
    /// Create a store over `dir` using the local filesystem.
    ///
    /// The store is empty until [`FileChatStore::initialize`] is called.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_file_system(dir, LocalFileSystem::new())
    }
}

impl<F: FileSystem> FileChatStore<F> {
    pub fn with_file_system(dir: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            dir: dir.into(),
            fs,
            records: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &ConversationId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Replace the record for its id. A new id takes the next sequence
    /// number; an existing id keeps its own.
    fn insert(&self, record: ConversationRecord) {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().record = record,
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Slot { seq, record });
            }
        }
    }

    /// Rebuild the in-memory mapping from the storage directory.
    ///
    /// Creates the directory when absent. Files that cannot be read, do not
    /// parse as a record, or whose name does not match the record id are
    /// skipped and listed in the returned report.
    pub async fn initialize(&self) -> Result<LoadReport, StoreError> {
        self.fs
            .create_dir_all(&self.dir)
            .await
            .map_err(|e| self.directory_error(e))?;
        let files = self
            .fs
            .list_files(&self.dir)
            .await
            .map_err(|e| self.directory_error(e))?;

        self.records.clear();
        let mut report = LoadReport::default();

        for path in files {
            if !is_conversation_file(&path) {
                continue;
            }
            match self.load_file(&path).await {
                Ok(record) => {
                    tracing::debug!(id = %record.id, title = ?record.title, "loaded conversation");
                    self.insert(record);
                    report.loaded += 1;
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipping conversation file");
                    report.skipped.push(SkippedFile { path, reason });
                }
            }
        }

        tracing::info!(
            dir = %self.dir.display(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "conversation store initialized"
        );
        Ok(report)
    }

    async fn load_file(&self, path: &Path) -> Result<ConversationRecord, String> {
        let content = self
            .fs
            .read_file(path)
            .await
            .map_err(|e| format!("read failed: {e}"))?;
        let record: ConversationRecord =
            serde_json::from_str(&content).map_err(|e| format!("invalid record: {e}"))?;

        let actual = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if record.id.file_name() != actual {
            return Err(format!("file name does not match id '{}'", record.id));
        }
        Ok(record)
    }

    fn directory_error(&self, e: std::io::Error) -> StoreError {
        tracing::error!(dir = %self.dir.display(), error = %e, "conversation directory unavailable");
        StoreError::Directory {
            path: self.dir.display().to_string(),
            message: e.to_string(),
        }
    }
}

/// Visible `*.json` files only; temp files start with a dot.
fn is_conversation_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(CONVERSATION_FILE_SUFFIX) && !n.starts_with('.'))
}

impl<F: FileSystem> ChatRepository for FileChatStore<F> {
    async fn upsert(&self, record: ConversationRecord) -> Result<(), StoreError> {
        let id = record.id.clone();
        let path = self.record_path(&id);
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.insert(record);

        if let Err(e) = self.fs.write_file(&path, &content).await {
            tracing::error!(
                operation = "upsert",
                id = %id,
                path = %path.display(),
                error = %e,
                "conversation updated in memory but not written to disk"
            );
            return Err(StoreError::Write {
                id: id.to_string(),
                message: e.to_string(),
            });
        }

        tracing::debug!(id = %id, path = %path.display(), "conversation written");
        Ok(())
    }

    async fn get(&self, id: &ConversationId) -> Option<ConversationRecord> {
        self.records.get(id).map(|slot| slot.record.clone())
    }

    async fn list(&self) -> Vec<ConversationRecord> {
        let mut slots: Vec<(u64, ConversationRecord)> = self
            .records
            .iter()
            .map(|slot| (slot.seq, slot.record.clone()))
            .collect();
        // Insertion order, then a stable sort on the timestamp.
        slots.sort_by_key(|(seq, _)| *seq);
        slots.sort_by(|(_, a), (_, b)| b.last_updated.cmp(&a.last_updated));
        slots.into_iter().map(|(_, record)| record).collect()
    }

    async fn delete(&self, id: &ConversationId) -> Result<(), StoreError> {
        let path = self.record_path(id);
        self.records.remove(id);

        match self.fs.remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(id = %id, "conversation file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!(
                    operation = "delete",
                    id = %id,
                    path = %path.display(),
                    error = %e,
                    "conversation removed from memory but file remains"
                );
                Err(StoreError::Delete {
                    id: id.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    async fn count(&self) -> usize {
        self.records.len()
    }
}
