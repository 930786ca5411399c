//! Domain layer for the Reward Ledger context.

pub mod achievements;
pub mod events;
pub mod level;
pub mod stats;
