//! Storyflow — Catalog bounded context.
//!
//! Read-only view of the authored content: stories, their ordered flow steps,
//! media resources (including 3D hotspot layouts and embedded app
//! configuration), rewards and characters. Loosely typed rows coming from the
//! content store are validated and coerced into tagged shapes here, at the
//! load boundary, so nothing downstream inspects raw JSON.

pub mod application;
pub mod domain;
