//! Domain layer for the Catalog context.

pub mod coercion;
pub mod media;
pub mod records;
pub mod reward;
pub mod step;
pub mod story;
