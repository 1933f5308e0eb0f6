//! Dry-run validation of a channel's configuration.
//!
//! Every tracked entity is simulated against every event type; whenever
//! the event is enabled, each required field must resolve to a value of the
//! right kind. Unknown keys and keywords only produce warnings.

use std::time::Duration;

use serde_json::{Map, Value};
use url::Url;

use super::{ChannelSettings, COOLDOWN_KEY};
use crate::domain::keyword::{expand_keyword, normalize_key};
use crate::domain::settings::{resolve, SettingsLayer, ALERTS_KEY};
use crate::domain::{EntityId, EventType};
use crate::error::{ConfigError, Result};

/// Accepted JSON shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Strings, plus numbers and booleans which render as text.
    Text,
    /// A string that parses as an absolute URL once rendered. Templated
    /// values are only checked at send time.
    Url,
    Number,
    Bool,
    List,
}

impl FieldKind {
    fn check(self, value: &Value) -> std::result::Result<(), String> {
        let ok = match self {
            Self::Text => matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)),
            Self::Url => match value {
                Value::String(text) if text.contains('{') => true,
                Value::String(text) => {
                    return Url::parse(text)
                        .map(drop)
                        .map_err(|e| format!("'{text}' is not a valid URL: {e}"));
                }
                _ => false,
            },
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::List => value.is_array(),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("expected {}, got {value}", self.describe()))
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Url => "a URL",
            Self::Number => "a number",
            Self::Bool => "a boolean",
            Self::List => "a list",
        }
    }
}

/// A configuration key a channel understands.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    #[must_use]
    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: false,
        }
    }
}

impl ChannelSettings {
    /// Check the raw configuration against `fields`.
    ///
    /// Works on freshly compiled layers, so it can run before
    /// [`init`](Self::init).
    pub fn validate(&self, fields: &[Field]) -> Result<Vec<String>> {
        let channel = self.channel;
        let mut warnings = Vec::new();

        check_table(channel, "global", &self.raw.global, fields, &mut warnings)?;
        for (id, table) in &self.raw.entities {
            check_table(channel, &scope_name(id), table, fields, &mut warnings)?;
        }

        let global = SettingsLayer::from_raw(&self.raw.global, true);
        for (id, table) in &self.raw.entities {
            let entity = SettingsLayer::from_raw(table, false);
            self.simulate(&scope_name(id), &global, &entity, fields)?;
        }

        Ok(warnings)
    }

    fn simulate(
        &self,
        scope: &str,
        global: &SettingsLayer,
        entity: &SettingsLayer,
        fields: &[Field],
    ) -> Result<()> {
        for event in EventType::ALL {
            let enabled = resolve(ALERTS_KEY, Some(event), global, entity)
                .and_then(Value::as_bool)
                .unwrap_or(self.default_enabled);
            if !enabled {
                continue;
            }

            for field in fields {
                match resolve(field.key, Some(event), global, entity) {
                    None | Some(Value::Null) if field.required => {
                        return Err(ConfigError::MissingField {
                            channel: self.channel,
                            scope: scope.to_string(),
                            event: event.to_string(),
                            field: field.key,
                        }
                        .into());
                    }
                    Some(value) if !value.is_null() => {
                        if let Err(reason) = field.kind.check(value) {
                            return Err(ConfigError::invalid(
                                format!("{}/{scope}/{}", self.channel, field.key),
                                format!("{reason} ({event} alerts)"),
                            )
                            .into());
                        }
                    }
                    _ => {}
                }
            }

            if let Some(value) = resolve(COOLDOWN_KEY, Some(event), global, entity) {
                let fits = value
                    .as_f64()
                    .is_some_and(|secs| secs >= 0.0 && Duration::try_from_secs_f64(secs).is_ok());
                if !fits {
                    return Err(ConfigError::invalid(
                        format!("{}/{scope}/{COOLDOWN_KEY}", self.channel),
                        format!("expected a non-negative number of seconds within duration range, got {value}"),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

fn scope_name(id: &EntityId) -> String {
    format!("entity {id}")
}

/// Shape checks on one raw table that don't depend on the event.
fn check_table(
    channel: &str,
    scope: &str,
    table: &Map<String, Value>,
    fields: &[Field],
    warnings: &mut Vec<String>,
) -> Result<()> {
    for key in table.keys() {
        let known = key == ALERTS_KEY || key == COOLDOWN_KEY || fields.iter().any(|f| f.key == key);
        if !known {
            warnings.push(format!("Unrecognized key in \"{channel}/{scope}\": {key}"));
        }
    }

    let keywords: Vec<&str> = match table.get(ALERTS_KEY) {
        None => return Ok(()),
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .collect(),
        Some(Value::Object(map)) => {
            if let Some((key, value)) = map.iter().find(|(_, v)| !v.is_boolean()) {
                return Err(ConfigError::invalid(
                    format!("{channel}/{scope}/{ALERTS_KEY}"),
                    format!("value for '{key}' must be a boolean, got {value}"),
                )
                .into());
            }
            map.keys().map(String::as_str).collect()
        }
        Some(other) => {
            return Err(ConfigError::invalid(
                format!("{channel}/{scope}/{ALERTS_KEY}"),
                format!("expected a keyword list or a table of booleans, got {other}"),
            )
            .into());
        }
    };

    for word in keywords {
        let (normalized, _) = normalize_key(word);
        if expand_keyword(&normalized, true).is_none() {
            warnings.push(format!(
                "Unrecognized keyword in \"{channel}/{scope}/{ALERTS_KEY}\": {word}"
            ));
        }
    }
    Ok(())
}
