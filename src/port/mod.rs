//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (notification services, HTTP, the polling collaborator).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  (dispatcher, channel   │
//!     ┌──────────────┤   settings, cooldowns)  ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Entity  │            │  Transport  │              │  Channel  │
//! │  Store  │            │   Adapter   │              │  Adapters │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Channel`] - Notification channels (Discord, Pushover, Telegram, log)
//! - [`EntityStore`] - Last-known display attributes of tracked entities
//! - [`Transport`] - Outbound HTTP used by channels

pub mod outbound;

pub use outbound::channel::{Channel, Delivery, SkipReason};
pub use outbound::entity::EntityStore;
pub use outbound::transport::Transport;
