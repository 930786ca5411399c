//! Storyflow — infrastructure adapters.
//!
//! PostgreSQL implementations of the catalog read port and the player-state
//! store, the schema they expect, and an in-memory player-state store for
//! development runs without a database.

pub mod memory_player_store;
pub mod pg_catalog_source;
pub mod pg_player_store;
pub mod rows;
pub mod schema;
