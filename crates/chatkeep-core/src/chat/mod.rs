//! Conversation persistence abstractions for chatkeep.
//!
//! `ChatRepository` is the port the file-backed store implements;
//! `ChatGateway` validates request payloads and delegates to it.

pub mod gateway;
pub mod repository;
