//! Compiled settings layers.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::expand::{expand_alerts, expand_setting, ALERTS_KEY};
use crate::domain::event::EventType;

/// A single setting after keyword expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    /// Applies to every event.
    Scalar(Value),
    /// Applies per event; events missing from the map fall through to the
    /// next layer.
    PerEvent(BTreeMap<EventType, Value>),
}

/// One tier of configuration (channel-wide or entity-specific).
///
/// Layers are built once when a channel initializes and only read after
/// that, so delivery units can share them freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsLayer {
    entries: HashMap<String, Setting>,
}

impl SettingsLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a raw configuration table.
    ///
    /// `fill_defaults` is set for the global layer: every event gets an
    /// explicit `Alerts` value (false unless configured). Entity layers only
    /// carry what they mention.
    #[must_use]
    pub fn from_raw(raw: &Map<String, Value>, fill_defaults: bool) -> Self {
        let mut layer = Self::new();

        for (key, value) in raw {
            if key == ALERTS_KEY {
                continue;
            }
            layer.insert(key.clone(), expand_setting(value));
        }

        if let Some(alerts) = raw.get(ALERTS_KEY) {
            let toggles = expand_alerts(Some(alerts), fill_defaults)
                .into_iter()
                .map(|(event, on)| (event, Value::Bool(on)))
                .collect();
            layer.insert(ALERTS_KEY.to_string(), Setting::PerEvent(toggles));
        }

        layer
    }

    /// Insert or replace a setting.
    pub fn insert(&mut self, key: impl Into<String>, setting: Setting) {
        self.entries.insert(key.into(), setting);
    }

    /// Look up a setting by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test tables are objects"),
        }
    }

    #[test]
    fn test_from_raw_expands_alerts_and_per_event_settings() {
        let raw = table(json!({
            "Alerts": "live,soon",
            "Message Text": {"all": "{name} changed", "live": "{name} is live"},
            "Webhook URL": "https://example.com/hook",
        }));

        let layer = SettingsLayer::from_raw(&raw, true);
        assert_eq!(layer.len(), 3);

        match layer.get("Alerts") {
            Some(Setting::PerEvent(map)) => {
                assert_eq!(map.len(), 6);
                assert_eq!(map[&EventType::Live], json!(true));
                assert_eq!(map[&EventType::Offline], json!(false));
            }
            other => panic!("unexpected alerts setting: {other:?}"),
        }

        match layer.get("Message Text") {
            Some(Setting::PerEvent(map)) => {
                assert_eq!(map[&EventType::Live], json!("{name} is live"));
                assert_eq!(map[&EventType::Banned], json!("{name} changed"));
            }
            other => panic!("unexpected message setting: {other:?}"),
        }

        assert_eq!(
            layer.get("Webhook URL"),
            Some(&Setting::Scalar(json!("https://example.com/hook")))
        );
    }

    #[test]
    fn test_entity_layer_without_alerts_has_no_alerts_entry() {
        let raw = table(json!({"Bot Username": "watcher"}));
        let layer = SettingsLayer::from_raw(&raw, false);
        assert!(!layer.contains("Alerts"));
        assert!(layer.contains("Bot Username"));
    }
}
