//! Dispatcher configuration: enabled channels and poll cadence.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// A channel implementation the dispatcher can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Discord,
    Pushover,
    Telegram,
    Log,
}

impl ChannelKind {
    /// Namespace key of this channel's configuration tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Pushover => "pushover",
            Self::Telegram => "telegram",
            Self::Log => "log",
        }
    }

    /// Whether the channel works without a `[channels.<name>]` table.
    #[must_use]
    pub const fn needs_table(self) -> bool {
        !matches!(self, Self::Log)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[dispatcher]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Enabled channels, in registration order.
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelKind>,
    /// How often `run` polls `check_tasks`.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
}

fn default_channels() -> Vec<ChannelKind> {
    vec![ChannelKind::Log]
}

const fn default_check_interval_ms() -> u64 {
    1000
}

impl DispatcherConfig {
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            check_interval_ms: default_check_interval_ms(),
        }
    }
}
