//! Storyflow — Reward Ledger bounded context.
//!
//! The only writer of player progression: XP deltas, inventory grants, story
//! completion, known characters and achievements. Every mutation is persisted
//! through a [`PlayerStateStore`](application::ports::PlayerStateStore) before
//! it becomes visible, and announced afterwards as [`LedgerEvent`]s.
//!
//! [`LedgerEvent`]: domain::events::LedgerEvent

pub mod application;
pub mod domain;
