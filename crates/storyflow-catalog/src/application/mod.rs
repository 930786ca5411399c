//! Application layer for the Catalog context.

pub mod cache;
pub mod source;
pub mod yaml_source;
