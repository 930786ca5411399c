//! Application layer for the Reward Ledger context.

pub mod ledger;
pub mod notifier;
pub mod ports;
pub mod query_handlers;
