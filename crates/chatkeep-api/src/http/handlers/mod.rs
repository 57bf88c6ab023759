//! Route handlers, one module per resource.

pub mod admin;
pub mod completion;
pub mod conversation;
