//! File-backed conversation storage.

pub mod chat_store;

pub use chat_store::FileChatStore;
