//! Infrastructure layer for chatkeep.
//!
//! Contains implementations of the traits defined in `chatkeep-core`: the
//! JSON-file conversation store, the local filesystem adapter, the OpenAI
//! completion provider, API key storage and configuration loading.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod storage;
