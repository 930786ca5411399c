//! Application layer for the Narrative Flow context.

pub mod app_bridge;
pub mod engine;
pub mod query_handlers;
