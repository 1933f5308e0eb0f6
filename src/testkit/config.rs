//! Canonical test configurations.
//!
//! Single source of truth for channel tables and config files used across
//! tests.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::application::channel::ChannelConfig;
use crate::domain::EntityId;

/// Turn a `json!` object into a table; anything else becomes empty.
pub fn table(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Channel configuration from a global table and per-entity overrides.
pub fn channel_config(global: Value, entities: &[(&str, Value)]) -> ChannelConfig {
    let entities: BTreeMap<EntityId, Map<String, Value>> = entities
        .iter()
        .map(|(id, raw)| (EntityId::new(*id), table(raw.clone())))
        .collect();
    ChannelConfig {
        global: table(global),
        entities,
    }
}

/// A complete config file enabling the log and discord channels.
pub const SAMPLE_TOML: &str = r#"
[logging]
level = "debug"
format = "pretty"

[dispatcher]
channels = ["log", "discord"]
check_interval_ms = 250

[channels.log]
"Message Text" = { all = "{name}: {message}", live = "{name} went live: {title}" }

[channels.discord]
Alerts = "all,!bans"
"Soon Cooldown" = 60
"Webhook URL" = "https://discord.example/api/webhooks/1"
"Message Text" = "{name} changed: {message}"

[entities.alice]
name = "Alice"

[entities.alice.channels.discord]
Alerts = "!live"

[entities.bob]
"#;
