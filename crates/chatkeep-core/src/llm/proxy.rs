//! Completion proxy: forwards a conversation to the remote service with the
//! configured system instruction prepended.
//!
//! Stateless, single attempt. Errors from the provider are returned as-is so
//! the caller can surface the remote message.

use chatkeep_types::chat::ChatMessage;
use chatkeep_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message};

use super::provider::CompletionProvider;

/// Fallback instruction used when no system prompt file can be read.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

pub struct CompletionProxy<P: CompletionProvider> {
    provider: P,
    system_prompt: String,
    model: String,
    max_tokens: u32,
}

impl<P: CompletionProvider> CompletionProxy<P> {
    pub fn new(
        provider: P,
        system_prompt: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            model: model.into(),
            max_tokens,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Build the outgoing request: system instruction first, then the
    /// conversation in its original order.
    pub fn build_request(&self, messages: Vec<ChatMessage>) -> CompletionRequest {
        let mut outgoing = Vec::with_capacity(messages.len() + 1);
        outgoing.push(Message::system(self.system_prompt.clone()));
        outgoing.extend(messages.into_iter().map(Message::from));

        CompletionRequest {
            model: self.model.clone(),
            messages: outgoing,
            max_tokens: self.max_tokens,
        }
    }

    /// Forward a conversation to the provider.
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<CompletionResponse, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }

        let request = self.build_request(messages);
        tracing::debug!(
            provider = self.provider.name(),
            model = %request.model,
            messages = request.messages.len(),
            "forwarding completion request"
        );

        match self.provider.complete(&request).await {
            Ok(response) => {
                tracing::info!(
                    provider = self.provider.name(),
                    model = %response.model,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "completion succeeded"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "completion failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use chatkeep_types::llm::{Role, StopReason, Usage};

    /// Records the last request and replies with a canned answer or error.
    struct StubProvider {
        seen: Mutex<Option<CompletionRequest>>,
        fail: Option<LlmError>,
    }

    impl StubProvider {
        fn ok() -> Self {
            Self { seen: Mutex::new(None), fail: None }
        }
    }

    impl CompletionProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            Ok(CompletionResponse {
                id: "chatcmpl-1".to_string(),
                content: "Hello!".to_string(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage { input_tokens: 12, output_tokens: 3 },
            })
        }
    }

    #[tokio::test]
    async fn injects_system_prompt_first() {
        let proxy = CompletionProxy::new(StubProvider::ok(), "Be brief.", "gpt-4o", 6000);
        let response = proxy
            .complete(vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hey"), ChatMessage::user("Bye")])
            .await
            .unwrap();
        assert_eq!(response.content, "Hello!");

        let seen = proxy.provider().seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model, "gpt-4o");
        assert_eq!(seen.max_tokens, 6000);
        let roles: Vec<Role> = seen.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(seen.messages[0].content, "Be brief.");
        assert_eq!(seen.messages[3].content, "Bye");
    }

    #[tokio::test]
    async fn rejects_empty_conversation() {
        let proxy = CompletionProxy::new(StubProvider::ok(), DEFAULT_SYSTEM_PROMPT, "gpt-4o", 100);
        let err = proxy.complete(Vec::new()).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
        assert!(proxy.provider().seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn surfaces_provider_error() {
        let provider = StubProvider {
            seen: Mutex::new(None),
            fail: Some(LlmError::MissingApiKey),
        };
        let proxy = CompletionProxy::new(provider, DEFAULT_SYSTEM_PROMPT, "gpt-4o", 100);
        let err = proxy.complete(vec![ChatMessage::user("Hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
