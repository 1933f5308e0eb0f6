//! Alert event types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of state transitions that can trigger an alert.
///
/// The configuration name of each variant is the short form used in
/// `Alerts` keywords and rendered by the `{message}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    /// Entity went live.
    Live,
    /// Stream title changed.
    TitleChanged,
    /// Category / game changed.
    GameChanged,
    /// Entity went offline.
    Offline,
    /// Entity was banned.
    Banned,
    /// Entity was unbanned.
    Unbanned,
}

impl EventType {
    /// Every event type, in canonical order.
    pub const ALL: [EventType; 6] = [
        EventType::Live,
        EventType::TitleChanged,
        EventType::GameChanged,
        EventType::Offline,
        EventType::Banned,
        EventType::Unbanned,
    ];

    /// Configuration name of this event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::Live => "live",
            EventType::TitleChanged => "title",
            EventType::GameChanged => "game",
            EventType::Offline => "offline",
            EventType::Banned => "ban",
            EventType::Unbanned => "unban",
        }
    }

    /// Title and game changes tend to come in bursts and are rate limited
    /// per channel by the `Soon Cooldown` setting.
    #[must_use]
    pub const fn is_throttled(self) -> bool {
        matches!(self, EventType::TitleChanged | EventType::GameChanged)
    }

    /// Parse a configuration name or its long alias, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "live" => Some(EventType::Live),
            "title" | "title-changed" => Some(EventType::TitleChanged),
            "game" | "game-changed" => Some(EventType::GameChanged),
            "offline" => Some(EventType::Offline),
            "ban" | "banned" => Some(EventType::Banned),
            "unban" | "unbanned" => Some(EventType::Unbanned),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown event type '{s}'"))
    }
}

impl TryFrom<String> for EventType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        event.as_str().to_string()
    }
}
