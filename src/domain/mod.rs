//! Channel-agnostic alert domain: events, entities, keyword expansion,
//! layered preferences and message templates.
//!
//! Nothing in this module performs I/O or suspends.

pub mod entity;
pub mod event;
pub mod keyword;
pub mod settings;
pub mod template;

pub use entity::{EntityId, EntitySnapshot};
pub use event::EventType;
