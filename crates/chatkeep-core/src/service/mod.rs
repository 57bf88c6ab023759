//! Service-level abstractions shared by the core and infra layers.

pub mod fs;
