//! Streamwatch - alert dispatch and preference resolution for tracked streams.
//!
//! Alerts about tracked entities (went live, changed title, was banned...)
//! are fanned out to every enabled notification channel. Each channel decides
//! independently whether to send, using layered preferences: per-entity
//! settings override global ones, and per-event values override plain ones.
//!
//! # Architecture
//!
//! - **`domain`** - Event types, entity snapshots, `Alerts` keyword
//!   expansion, settings layers and the message template renderer
//! - **`port`** - The `Channel` contract plus the entity store and HTTP
//!   transport seams
//! - **`application`** - Shared channel settings handling (validation,
//!   cooldowns) and the `AlertDispatcher`
//! - **`adapter`** - Discord, Pushover, Telegram and log channels, the
//!   reqwest transport, and the CLI
//! - **`infrastructure`** - TOML configuration, logging, wiring
//!
//! # Features
//!
//! - `telegram` - Enable the Telegram channel (default)
//! - `testkit` - Expose test doubles to integration tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use streamwatch::adapter::outbound::http::HttpTransport;
//! use streamwatch::domain::{EntityId, EventType};
//! use streamwatch::infrastructure::bootstrap::wire;
//! use streamwatch::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> streamwatch::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let mut wired = wire(&config, Arc::new(HttpTransport::new()?))?;
//! wired.dispatcher.start(tokio::runtime::Handle::current());
//! wired.dispatcher.submit(EntityId::new("alice"), EventType::Live);
//! wired.dispatcher.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
