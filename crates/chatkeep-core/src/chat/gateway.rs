//! ChatGateway: request validation in front of a [`ChatRepository`].
//!
//! The gateway is the only path from request handlers to the store. Payloads
//! are validated here and rejected before the repository is called, so a
//! malformed request can never mutate stored state.

use chrono::{DateTime, Utc};

use chatkeep_types::chat::{ChatMessage, ConversationId, ConversationPayload, ConversationRecord};
use chatkeep_types::error::{GatewayError, ValidationError};

use super::repository::ChatRepository;

/// Validating facade over a conversation repository.
pub struct ChatGateway<R: ChatRepository> {
    repo: R,
}

impl<R: ChatRepository> ChatGateway<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validate a save request and upsert the resulting record.
    pub async fn save_conversation(
        &self,
        payload: ConversationPayload,
    ) -> Result<ConversationId, GatewayError> {
        let record = validate_payload(payload, Utc::now())?;
        let id = record.id.clone();
        let message_count = record.messages.len();

        self.repo.upsert(record).await.map_err(|e| {
            tracing::error!(operation = "upsert", id = %id, error = %e, "failed to save conversation");
            GatewayError::Storage(e)
        })?;

        tracing::debug!(id = %id, messages = message_count, "conversation saved");
        Ok(id)
    }

    /// Every stored conversation, most recently updated first.
    pub async fn list_conversations(&self) -> Vec<ConversationRecord> {
        self.repo.list().await
    }

    /// Fetch one conversation by its raw id.
    pub async fn get_conversation(&self, raw_id: &str) -> Result<ConversationRecord, GatewayError> {
        let id = ConversationId::parse(raw_id)?;
        self.repo
            .get(&id)
            .await
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    /// Delete a conversation. Unknown ids succeed.
    pub async fn delete_conversation(&self, raw_id: &str) -> Result<(), GatewayError> {
        let id = ConversationId::parse(raw_id)?;
        self.repo.delete(&id).await.map_err(|e| {
            tracing::error!(operation = "delete", id = %id, error = %e, "failed to delete conversation");
            GatewayError::Storage(e)
        })?;
        tracing::debug!(id = %id, "conversation deleted");
        Ok(())
    }

    pub async fn conversation_count(&self) -> usize {
        self.repo.count().await
    }
}

/// Turn a loosely typed payload into a record, or explain what is wrong.
///
/// `now` stamps records whose payload omits `lastUpdated`.
pub fn validate_payload(
    payload: ConversationPayload,
    now: DateTime<Utc>,
) -> Result<ConversationRecord, ValidationError> {
    let raw_id = payload
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ValidationError::new("missing conversation id"))?;
    let id = ConversationId::parse(&raw_id)?;

    let raw_messages = payload
        .messages
        .ok_or_else(|| ValidationError::new("missing messages"))?;
    if !raw_messages.is_array() {
        return Err(ValidationError::new("messages must be an array"));
    }
    let messages: Vec<ChatMessage> = serde_json::from_value(raw_messages).map_err(|e| {
        ValidationError::new(format!(
            "messages must be a sequence of {{role, content}} pairs: {e}"
        ))
    })?;

    let last_updated = match payload.last_updated {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| ValidationError::new(format!("invalid lastUpdated '{raw}': {e}")))?,
        None => now,
    };

    Ok(ConversationRecord {
        id,
        title: payload.title,
        messages,
        last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chatkeep_types::error::StoreError;
    use serde_json::json;

    /// In-memory repository that counts mutating calls.
    #[derive(Default)]
    struct MemoryRepo {
        records: Mutex<HashMap<ConversationId, ConversationRecord>>,
        mutations: AtomicUsize,
        fail_writes: bool,
    }

    impl ChatRepository for MemoryRepo {
        async fn upsert(&self, record: ConversationRecord) -> Result<(), StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            let id = record.id.to_string();
            self.records.lock().unwrap().insert(record.id.clone(), record);
            if self.fail_writes {
                return Err(StoreError::Write {
                    id,
                    message: "disk full".to_string(),
                });
            }
            Ok(())
        }

        async fn get(&self, id: &ConversationId) -> Option<ConversationRecord> {
            self.records.lock().unwrap().get(id).cloned()
        }

        async fn list(&self) -> Vec<ConversationRecord> {
            let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
            all
        }

        async fn delete(&self, id: &ConversationId) -> Result<(), StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().remove(id);
            Ok(())
        }

        async fn count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    fn payload(value: serde_json::Value) -> ConversationPayload {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn validate_payload_builds_record() {
        let record = validate_payload(
            payload(json!({
                "id": "c1",
                "title": "Hello",
                "messages": [{"role": "user", "content": "Hi"}],
                "lastUpdated": "2024-01-01T00:00:00Z"
            })),
            now(),
        )
        .unwrap();
        assert_eq!(record.id.as_str(), "c1");
        assert_eq!(record.title.as_deref(), Some("Hello"));
        assert_eq!(record.messages, vec![ChatMessage::user("Hi")]);
        assert_eq!(record.last_updated, "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn validate_payload_stamps_missing_timestamp() {
        let record = validate_payload(
            payload(json!({"chatId": "c1", "messages": []})),
            now(),
        )
        .unwrap();
        assert_eq!(record.last_updated, now());
        assert!(record.title.is_none());
    }

    #[test]
    fn validate_payload_normalizes_offsets() {
        let record = validate_payload(
            payload(json!({"id": "c1", "messages": [], "lastUpdated": "2024-01-01T02:00:00+02:00"})),
            now(),
        )
        .unwrap();
        assert_eq!(record.last_updated, "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn validate_payload_rejects_missing_or_empty_id() {
        assert!(validate_payload(payload(json!({"messages": []})), now()).is_err());
        assert!(validate_payload(payload(json!({"id": "", "messages": []})), now()).is_err());
        assert!(validate_payload(payload(json!({"id": "../x", "messages": []})), now()).is_err());
    }

    #[test]
    fn validate_payload_rejects_malformed_messages() {
        for messages in [
            json!("hello"),
            json!({"role": "user", "content": "Hi"}),
            json!([{"role": "user"}]),
            json!([{"role": "wizard", "content": "Hi"}]),
            json!([{"role": "user", "content": 42}]),
        ] {
            let result = validate_payload(payload(json!({"id": "c1", "messages": messages})), now());
            assert!(result.is_err(), "accepted {messages}");
        }
        assert!(validate_payload(payload(json!({"id": "c1"})), now()).is_err());
    }

    #[test]
    fn validate_payload_rejects_bad_timestamp() {
        let err = validate_payload(
            payload(json!({"id": "c1", "messages": [], "lastUpdated": "yesterday"})),
            now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("lastUpdated"));
    }

    #[tokio::test]
    async fn save_rejects_invalid_payload_without_touching_store() {
        let gateway = ChatGateway::new(MemoryRepo::default());
        let result = gateway
            .save_conversation(payload(json!({"id": "c1", "messages": "nope"})))
            .await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert_eq!(gateway.repository().mutations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn save_then_get_returns_record() {
        let gateway = ChatGateway::new(MemoryRepo::default());
        let id = gateway
            .save_conversation(payload(json!({
                "id": "c1",
                "title": "Hello",
                "messages": [{"role": "user", "content": "Hi"}],
                "lastUpdated": "2024-01-01T00:00:00Z"
            })))
            .await
            .unwrap();
        assert_eq!(id.as_str(), "c1");

        let record = gateway.get_conversation("c1").await.unwrap();
        assert_eq!(record.title.as_deref(), Some("Hello"));
        assert_eq!(gateway.conversation_count().await, 1);
    }

    #[tokio::test]
    async fn save_reports_storage_failure() {
        let repo = MemoryRepo {
            fail_writes: true,
            ..MemoryRepo::default()
        };
        let gateway = ChatGateway::new(repo);
        let result = gateway
            .save_conversation(payload(json!({"id": "c1", "messages": []})))
            .await;
        assert!(matches!(result, Err(GatewayError::Storage(StoreError::Write { .. }))));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let gateway = ChatGateway::new(MemoryRepo::default());
        assert!(matches!(
            gateway.get_conversation("missing").await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_unknown_succeeds_and_invalid_is_rejected() {
        let gateway = ChatGateway::new(MemoryRepo::default());
        gateway.delete_conversation("missing").await.unwrap();
        assert!(matches!(
            gateway.delete_conversation("../../etc").await,
            Err(GatewayError::Validation(_))
        ));
        assert_eq!(gateway.repository().mutations.load(Ordering::SeqCst), 1);
    }
}
