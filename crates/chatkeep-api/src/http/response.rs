//! Response bodies shared by the handlers.
//!
//! Mutations answer `{"success": true}`. Completions answer in the OpenAI
//! chat-completions shape the browser UI reads:
//! ```json
//! {
//!   "id": "chatcmpl-...",
//!   "model": "gpt-4o",
//!   "choices": [{ "index": 0, "message": { "role": "assistant", "content": "..." }, "finish_reason": "stop" }],
//!   "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
//! }
//! ```

use serde::Serialize;

use chatkeep_types::llm::{CompletionResponse, StopReason};

/// Acknowledgement for successful mutations.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionReply {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: CompletionUsage,
}

#[derive(Debug, Serialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: ReplyMessage,
    pub finish_reason: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReplyMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

fn finish_reason(reason: &StopReason) -> &'static str {
    match reason {
        StopReason::EndTurn => "stop",
        StopReason::MaxTokens => "length",
        StopReason::ContentFilter => "content_filter",
        StopReason::ToolUse => "tool_calls",
    }
}

impl CompletionReply {
    pub fn from_response(response: CompletionResponse, created: i64) -> Self {
        // Providers that return no id still get a unique one.
        let id = if response.id.is_empty() {
            format!("chatcmpl-{}", uuid::Uuid::now_v7().simple())
        } else {
            response.id
        };

        Self {
            id,
            object: "chat.completion",
            created,
            model: response.model,
            choices: vec![CompletionChoice {
                index: 0,
                message: ReplyMessage {
                    role: "assistant",
                    content: response.content,
                },
                finish_reason: finish_reason(&response.stop_reason),
            }],
            usage: CompletionUsage {
                prompt_tokens: response.usage.input_tokens,
                completion_tokens: response.usage.output_tokens,
                total_tokens: response.usage.input_tokens.saturating_add(response.usage.output_tokens),
            },
        }
    }
}
