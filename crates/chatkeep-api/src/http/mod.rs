//! HTTP/REST API layer for chatkeep.
//!
//! Axum-based JSON API under `/api/` with optional admin token
//! authentication, `{error}` error bodies and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
