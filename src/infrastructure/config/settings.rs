//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct. Configuration is a TOML file; secrets
//! may be supplied through the environment (see `.env`).
//!
//! # Example
//!
//! ```no_run
//! use streamwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::dispatcher::{ChannelKind, DispatcherConfig};
use super::logging::LoggingConfig;
use crate::application::channel::ChannelConfig;
use crate::domain::EntityId;
use crate::error::{ConfigError, Result};

/// Raw settings table for one channel, in file order.
pub type ChannelTable = Map<String, Value>;

/// `[entities.<id>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityConfig {
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Per-channel overrides, keyed by channel name.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelTable>,
}

/// Main application configuration.
///
/// Load from a file with [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Enabled channels and poll cadence.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Global settings layer per channel, keyed by channel name.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelTable>,

    /// Tracked entities, keyed by id.
    #[serde(default)]
    pub entities: BTreeMap<String, EntityConfig>,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check structure that does not depend on any one channel.
    ///
    /// Channel contents are checked by each channel's own dry run.
    fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(ConfigError::invalid("entities", "at least one entity must be configured").into());
        }
        if self.dispatcher.check_interval_ms == 0 {
            return Err(ConfigError::invalid("dispatcher.check_interval_ms", "must be greater than 0").into());
        }

        let mut seen = HashSet::new();
        for kind in &self.dispatcher.channels {
            if !seen.insert(*kind) {
                return Err(ConfigError::invalid(
                    "dispatcher.channels",
                    format!("channel '{kind}' is listed more than once"),
                )
                .into());
            }
            if kind.needs_table() && !self.channels.contains_key(kind.as_str()) {
                return Err(ConfigError::invalid(
                    format!("channels.{kind}"),
                    "enabled channel has no configuration table",
                )
                .into());
            }
        }

        for name in self.channels.keys() {
            if !self.dispatcher.channels.iter().any(|k| k.as_str() == name) {
                warn!(channel = %name, "Channel configured but not enabled");
            }
        }
        Ok(())
    }

    /// Install the tracing subscriber described by `[logging]`.
    pub fn init_logging(&self) -> bool {
        self.logging.init()
    }

    /// Tracked entity ids, sorted.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().map(EntityId::new).collect()
    }

    /// Display name of `id`.
    #[must_use]
    pub fn display_name(&self, id: &EntityId) -> String {
        self.entities
            .get(id.as_str())
            .and_then(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Both settings layers for `kind`, taken out of their namespace.
    #[must_use]
    pub fn channel_config(&self, kind: ChannelKind) -> ChannelConfig {
        let name = kind.as_str();
        let entities = self
            .entities
            .iter()
            .map(|(id, entity)| {
                let table = entity.channels.get(name).cloned().unwrap_or_default();
                (EntityId::new(id.as_str()), table)
            })
            .collect();
        ChannelConfig {
            global: self.channels.get(name).cloned().unwrap_or_default(),
            entities,
        }
    }
}
