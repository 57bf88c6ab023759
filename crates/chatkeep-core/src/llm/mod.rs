//! Completion provider abstractions for chatkeep.
//!
//! - `CompletionProvider`: RPITIT trait for concrete provider implementations
//! - `BoxCompletionProvider`: object-safe wrapper for dynamic dispatch
//! - `CompletionProxy`: injects the system instruction and forwards requests

pub mod box_provider;
pub mod provider;
pub mod proxy;
