//! Business logic and port definitions for chatkeep.
//!
//! This crate defines the traits (conversation repository, filesystem,
//! completion provider) that the infrastructure layer implements, plus the
//! services built on top of them. It depends only on `chatkeep-types`.

pub mod chat;
pub mod llm;
pub mod service;
