//! Machinery shared by every channel adapter.
//!
//! [`ChannelSettings`] owns a channel's raw configuration and the layers
//! compiled from it, answers preference lookups, renders templates and runs
//! the dry-run validation. [`Cooldown`] tracks per-entity throttling.

mod cooldown;
mod validate;

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use crate::domain::settings::{resolve, SettingsLayer, ALERTS_KEY};
use crate::domain::template::{self, TemplateContext};
use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::{ConfigError, Result};
use crate::port::SkipReason;

pub use cooldown::Cooldown;
pub use validate::{Field, FieldKind};

/// Setting holding the throttle window, in seconds, for title/game alerts.
pub const COOLDOWN_KEY: &str = "Soon Cooldown";

/// Raw configuration for one channel, already taken out of its namespace.
///
/// `entities` lists every tracked entity; entities without overrides map to
/// an empty table.
#[derive(Debug, Clone, Default)]
pub struct ChannelConfig {
    pub global: Map<String, Value>,
    pub entities: BTreeMap<EntityId, Map<String, Value>>,
}

/// Compiled preferences for one channel.
#[derive(Debug)]
pub struct ChannelSettings {
    channel: &'static str,
    raw: ChannelConfig,
    default_enabled: bool,
    global: SettingsLayer,
    entities: HashMap<EntityId, SettingsLayer>,
    empty: SettingsLayer,
}

impl ChannelSettings {
    /// Wrap raw configuration. Layers are compiled by [`init`](Self::init).
    #[must_use]
    pub fn new(channel: &'static str, raw: ChannelConfig) -> Self {
        Self {
            channel,
            raw,
            default_enabled: false,
            global: SettingsLayer::new(),
            entities: HashMap::new(),
            empty: SettingsLayer::new(),
        }
    }

    /// Treat events as enabled when `Alerts` is not configured anywhere.
    #[must_use]
    pub fn enabled_by_default(mut self) -> Self {
        self.default_enabled = true;
        self
    }

    #[must_use]
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    #[must_use]
    pub fn raw(&self) -> &ChannelConfig {
        &self.raw
    }

    /// Compile the global layer and one layer per entity.
    pub fn init(&mut self, entities: &[EntityId]) {
        self.global = SettingsLayer::from_raw(&self.raw.global, true);
        self.entities = entities
            .iter()
            .chain(self.raw.entities.keys())
            .map(|id| {
                let layer = self
                    .raw
                    .entities
                    .get(id)
                    .map(|raw| SettingsLayer::from_raw(raw, false))
                    .unwrap_or_default();
                (id.clone(), layer)
            })
            .collect();
    }

    fn entity_layer(&self, entity: &EntityId) -> &SettingsLayer {
        self.entities.get(entity).unwrap_or(&self.empty)
    }

    /// Effective value of `key` for `entity` and `event`.
    #[must_use]
    pub fn resolve(&self, key: &str, entity: &EntityId, event: Option<EventType>) -> Option<&Value> {
        resolve(key, event, &self.global, self.entity_layer(entity))
    }

    /// Effective `Alerts` toggle, if configured.
    #[must_use]
    pub fn alerts(&self, entity: &EntityId, event: EventType) -> Option<bool> {
        self.resolve(ALERTS_KEY, entity, Some(event))
            .and_then(Value::as_bool)
    }

    /// Whether `event` is enabled for `entity` on this channel.
    #[must_use]
    pub fn wants(&self, entity: &EntityId, event: EventType) -> bool {
        self.alerts(entity, event).unwrap_or(self.default_enabled)
    }

    /// Throttle window for `event`; zero when unconfigured. Values too
    /// large for a `Duration` saturate at `Duration::MAX`.
    #[must_use]
    pub fn cooldown_window(&self, entity: &EntityId, event: EventType) -> Duration {
        self.resolve(COOLDOWN_KEY, entity, Some(event))
            .and_then(Value::as_f64)
            .filter(|secs| *secs > 0.0)
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
            .unwrap_or(Duration::ZERO)
    }

    /// Decide whether an alert goes out, consuming the cooldown slot for
    /// throttled events that do.
    pub fn admit(&self, cooldown: &Cooldown, entity: &EntityId, event: EventType) -> Option<SkipReason> {
        if !self.wants(entity, event) {
            return Some(SkipReason::Disabled);
        }
        if event.is_throttled() {
            let window = self.cooldown_window(entity, event);
            if !cooldown.try_acquire(entity, window, Instant::now()) {
                return Some(SkipReason::Cooldown);
            }
        }
        None
    }

    /// Resolve `key` as text and substitute its placeholders.
    pub fn render(
        &self,
        key: &str,
        entity: &EntitySnapshot,
        event: EventType,
        ctx: &TemplateContext,
    ) -> Result<Option<String>> {
        match self.resolve(key, &entity.id, Some(event)).and_then(value_text) {
            Some(text) => Ok(Some(template::render(&text, ctx)?)),
            None => Ok(None),
        }
    }

    /// Like [`render`](Self::render), but a missing value is a
    /// configuration error.
    pub fn require(
        &self,
        key: &'static str,
        entity: &EntitySnapshot,
        event: EventType,
        ctx: &TemplateContext,
    ) -> Result<String> {
        self.render(key, entity, event, ctx)?.ok_or_else(|| {
            ConfigError::MissingField {
                channel: self.channel,
                scope: format!("entity {}", entity.id),
                event: event.to_string(),
                field: key,
            }
            .into()
        })
    }
}

/// String form of a scalar setting. `null` counts as unset.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
