//! Storyflow — Narrative Flow bounded context.
//!
//! Drives a player through the step graph of a story. A [`FlowSession`] owns
//! everything that changes while playing (active story and step, discovered
//! hotspots, media gate, child-app bridge); the [`FlowEngine`] is stateless
//! apart from its collaborators and applies one command at a time to a
//! session.
//!
//! [`FlowSession`]: domain::session::FlowSession
//! [`FlowEngine`]: application::engine::FlowEngine

pub mod application;
pub mod domain;
