//! Notification channel port.
//!
//! A channel is one notification transport (chat webhook, push service,
//! log sink). The dispatcher drives every channel through the same
//! lifecycle: `validate` → `init` → `send_alert`* → `terminate`. Each phase
//! has a no-op default so a channel only implements what it needs.

use async_trait::async_trait;

use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::Result;

/// Why a channel decided not to deliver an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entity's preferences disable this event on this channel.
    Disabled,
    /// A throttled event arrived inside the channel's cooldown window.
    Cooldown,
    /// The channel does not send alerts at all.
    Unsupported,
}

/// Outcome of a successful `send_alert` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The alert was handed to the transport.
    Sent,
    /// The alert was deliberately not sent. Not an error.
    Skipped(SkipReason),
}

/// Trait for notification channels.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`); many delivery
///   units call `send_alert` concurrently.
/// - Per-entity state such as cooldowns belongs to the channel instance and
///   must never be shared with other channels.
/// - `send_alert` must surface transport failures as errors rather than
///   logging and swallowing them.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name, also its configuration namespace key.
    fn name(&self) -> &'static str;

    /// Check this channel's configuration.
    ///
    /// Returns human-readable warnings. A missing or mistyped mandatory
    /// field is a hard error, found by simulating every event type.
    fn validate(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Precompute settings layers for the tracked entities.
    fn init(&mut self, _entities: &[EntityId]) -> Result<()> {
        Ok(())
    }

    /// Deliver one alert.
    async fn send_alert(&self, _entity: &EntitySnapshot, _event: EventType) -> Result<Delivery> {
        Ok(Delivery::Skipped(SkipReason::Unsupported))
    }

    /// Release channel resources. Errors are logged by the caller and
    /// otherwise ignored.
    async fn terminate(&self) -> Result<()> {
        Ok(())
    }
}

/// A channel that implements none of the optional phases.
pub struct NullChannel;

#[async_trait]
impl Channel for NullChannel {
    fn name(&self) -> &'static str {
        "null"
    }
}
