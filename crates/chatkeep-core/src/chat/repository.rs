//! ChatRepository trait definition.
//!
//! Keyed storage of whole conversation records. Uses native async fn in
//! traits (RPITIT, Rust 2024 edition).

use chatkeep_types::chat::{ConversationId, ConversationRecord};
use chatkeep_types::error::StoreError;

/// Repository trait for conversation persistence.
///
/// Implementations live in chatkeep-infra (e.g., `FileChatStore`).
pub trait ChatRepository: Send + Sync {
    /// Insert or replace the record for `record.id` wholesale.
    fn upsert(
        &self,
        record: ConversationRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Look up a single record.
    fn get(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Option<ConversationRecord>> + Send;

    /// All records, most recently updated first.
    fn list(&self) -> impl std::future::Future<Output = Vec<ConversationRecord>> + Send;

    /// Remove a record. Removing an unknown id succeeds.
    fn delete(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Number of records currently held.
    fn count(&self) -> impl std::future::Future<Output = usize> + Send;
}
