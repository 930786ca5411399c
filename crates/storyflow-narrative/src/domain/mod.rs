//! Domain layer for the Narrative Flow context.

pub mod bridge;
pub mod commands;
pub mod gate;
pub mod locks;
pub mod protocol;
pub mod session;
pub mod tracker;
