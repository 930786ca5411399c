//! Shared test mocks and utilities for the Storyflow engine.

mod catalog;
mod clock;
pub mod fixtures;
mod player_store;

pub use catalog::{FailingCatalogSource, InMemoryCatalogSource};
pub use clock::{FixedClock, ManualClock};
pub use player_store::{FailingPlayerStore, RecordingPlayerStore};
