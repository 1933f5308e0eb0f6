//! Keyword expansion for raw configuration fragments.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::layer::Setting;
use crate::domain::event::EventType;
use crate::domain::keyword::{expand_keyword, normalize_key};

/// Name of the per-event enablement setting.
pub const ALERTS_KEY: &str = "Alerts";

/// Expanded `Alerts` toggles, keyed by event.
pub type AlertToggles = BTreeMap<EventType, bool>;

/// Expand an `Alerts` fragment into per-event toggles.
///
/// Accepts a comma-separated keyword string, a table of keyword to bool, or
/// nothing. Later keys overwrite earlier ones, so `all` followed by `!live`
/// enables everything but `live`. Unrecognized keywords and non-boolean
/// table values are ignored here; validation reports them.
#[must_use]
pub fn expand_alerts(raw: Option<&Value>, fill_defaults: bool) -> AlertToggles {
    let mut out = AlertToggles::new();
    if fill_defaults {
        out.extend(EventType::ALL.map(|event| (event, false)));
    }

    let entries: Vec<(&str, bool)> = match raw {
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| (token, true))
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, value)| value.as_bool().map(|on| (key.as_str(), on)))
            .collect(),
        _ => Vec::new(),
    };

    for (raw_key, value) in entries {
        let (word, negated) = normalize_key(raw_key);
        let value = value != negated;

        if let Some(expansion) = expand_keyword(&word, true) {
            let value = value != expansion.inverted;
            for event in expansion.members {
                out.insert(event, value);
            }
        }
    }

    out
}

/// Whether a raw value is a per-event table (mentions at least one event
/// keyword) rather than a plain table value.
#[must_use]
pub fn is_event_specific(raw: &Value) -> bool {
    match raw {
        Value::Object(map) => map
            .keys()
            .any(|key| expand_keyword(&key.trim().to_ascii_lowercase(), false).is_some()),
        _ => false,
    }
}

/// Expand a general (non-`Alerts`) setting.
///
/// Per-event tables get the same keyword expansion as `Alerts`, with
/// values of any type. Everything else passes through unchanged.
#[must_use]
pub fn expand_setting(raw: &Value) -> Setting {
    match raw {
        Value::Object(map) if is_event_specific(raw) => Setting::PerEvent(expand_table(map)),
        other => Setting::Scalar(other.clone()),
    }
}

fn expand_table(map: &Map<String, Value>) -> BTreeMap<EventType, Value> {
    let mut out = BTreeMap::new();
    for (key, value) in map {
        let word = key.trim().to_ascii_lowercase();
        if let Some(expansion) = expand_keyword(&word, false) {
            for event in expansion.members {
                out.insert(event, value.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enabled(toggles: &AlertToggles) -> Vec<EventType> {
        toggles
            .iter()
            .filter(|(_, on)| **on)
            .map(|(event, _)| *event)
            .collect()
    }

    #[test]
    fn test_all_except_bans() {
        let toggles = expand_alerts(Some(&json!("all,!bans")), true);
        assert_eq!(
            enabled(&toggles),
            vec![
                EventType::Live,
                EventType::TitleChanged,
                EventType::GameChanged,
                EventType::Offline
            ]
        );
        assert!(!toggles[&EventType::Banned]);
        assert!(!toggles[&EventType::Unbanned]);
    }

    #[test]
    fn test_singular_ban_keyword_leaves_unbanned_enabled() {
        // `ban` names only the banned event; `bans` is the group with unbanned.
        let toggles = expand_alerts(Some(&json!("all,!ban")), true);
        assert!(!toggles[&EventType::Banned]);
        assert!(toggles[&EventType::Unbanned]);
        assert!(toggles[&EventType::TitleChanged]);
    }

    #[test]
    fn test_later_keys_override_groups() {
        let toggles = expand_alerts(Some(&json!({"all": true, "live": false})), true);
        assert!(!toggles[&EventType::Live]);
        assert_eq!(enabled(&toggles).len(), 5);
    }

    #[test]
    fn test_none_negates_everything() {
        let toggles = expand_alerts(Some(&json!("none")), false);
        assert_eq!(toggles.len(), 6);
        assert!(toggles.values().all(|on| !on));

        let toggles = expand_alerts(Some(&json!({"!none": true})), false);
        assert!(toggles.values().all(|on| *on));
    }

    #[test]
    fn test_negated_table_key_inverts_value() {
        let toggles = expand_alerts(Some(&json!({"!soon": false})), false);
        assert_eq!(toggles.len(), 2);
        assert!(toggles[&EventType::TitleChanged]);
        assert!(toggles[&EventType::GameChanged]);
    }

    #[test]
    fn test_partial_without_defaults() {
        let toggles = expand_alerts(Some(&json!("!live")), false);
        assert_eq!(toggles.len(), 1);
        assert!(!toggles[&EventType::Live]);

        assert!(expand_alerts(None, false).is_empty());
        assert_eq!(expand_alerts(None, true).len(), 6);
    }

    #[test]
    fn test_expanded_table_is_stable_apart_from_key_case() {
        let raw = json!({"LIVE": true, "Title": false, "offline": true});
        let once = expand_alerts(Some(&raw), false);

        let normalized: Map<String, Value> = once
            .iter()
            .map(|(event, on)| (event.to_string(), Value::Bool(*on)))
            .collect();
        let twice = expand_alerts(Some(&Value::Object(normalized)), false);

        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_unknown_keywords_are_ignored() {
        let toggles = expand_alerts(Some(&json!("live, raid ,")), false);
        assert_eq!(toggles.len(), 1);
    }

    #[test]
    fn test_general_setting_expansion() {
        let setting = expand_setting(&json!({"all": 30, "soon": 120}));
        match setting {
            Setting::PerEvent(map) => {
                assert_eq!(map[&EventType::Live], json!(30));
                assert_eq!(map[&EventType::GameChanged], json!(120));
            }
            Setting::Scalar(v) => panic!("expected per-event setting, got {v}"),
        }

        // `none` is not a general keyword, so this table is a plain value.
        assert_eq!(
            expand_setting(&json!({"none": 1})),
            Setting::Scalar(json!({"none": 1}))
        );
        assert_eq!(expand_setting(&json!("text")), Setting::Scalar(json!("text")));
    }
}
