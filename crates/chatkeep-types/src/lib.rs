//! Shared domain types for chatkeep.
//!
//! Conversation records, LLM request/response shapes, configuration and the
//! error enums shared by every layer.
//!
//! No infrastructure dependencies: only serde, serde_json, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod storage;
