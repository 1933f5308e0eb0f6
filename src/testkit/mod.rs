//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`channel`] - `ScriptedChannel`, a channel whose outcome per event is
//!   scripted, with a probe recording lifecycle calls.
//! - [`config`] - Canonical configuration fixtures.
//! - [`domain`] - Builders for entities, snapshots and stores.
//! - [`transport`] - `RecordingTransport`, an in-memory HTTP transport.

pub mod channel;
pub mod config;
pub mod domain;
pub mod transport;
