//! Storyflow Core — shared domain abstractions.
//!
//! This crate defines the identifiers, error type, clock and event envelope
//! that every bounded context depends on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
