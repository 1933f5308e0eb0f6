//! Preference resolution through the public settings API.

use serde_json::{json, Value};

use streamwatch::application::channel::ChannelSettings;
use streamwatch::domain::settings::{expand_alerts, resolve, SettingsLayer};
use streamwatch::domain::EventType;
use streamwatch::testkit::config::{channel_config, table};
use streamwatch::testkit::domain::entity;

fn enabled(settings: &ChannelSettings, id: &str) -> Vec<EventType> {
    EventType::ALL
        .into_iter()
        .filter(|event| settings.wants(&entity(id), *event))
        .collect()
}

fn prepared(global: Value, entities: &[(&str, Value)]) -> ChannelSettings {
    let ids: Vec<_> = entities.iter().map(|(id, _)| entity(id)).collect();
    let mut settings = ChannelSettings::new("test", channel_config(global, entities));
    settings.init(&ids);
    settings
}

#[test]
fn entity_negation_overrides_global_keywords() {
    let settings = prepared(
        json!({ "Alerts": "live,offline" }),
        &[("alice", json!({ "Alerts": "!live" }))],
    );

    assert_eq!(settings.alerts(&entity("alice"), EventType::Live), Some(false));
    assert_eq!(enabled(&settings, "alice"), vec![EventType::Offline]);
}

#[test]
fn entities_without_overrides_follow_global() {
    let settings = prepared(
        json!({ "Alerts": "live,offline" }),
        &[("alice", json!({ "Alerts": "!live" })), ("bob", json!({}))],
    );

    assert_eq!(enabled(&settings, "bob"), vec![EventType::Live, EventType::Offline]);
}

#[test]
fn later_keywords_overwrite_earlier_ones() {
    let toggles = expand_alerts(Some(&json!({ "all": true, "live": false })), true);

    assert_eq!(toggles[&EventType::Live], false);
    assert!(EventType::ALL
        .into_iter()
        .filter(|event| *event != EventType::Live)
        .all(|event| toggles[&event]));
}

#[test]
fn all_except_bans_leaves_both_ban_events_off() {
    let toggles = expand_alerts(Some(&json!("all,!bans")), true);

    assert!(!toggles[&EventType::Banned]);
    assert!(!toggles[&EventType::Unbanned]);
    assert!(toggles[&EventType::Live]);
    assert!(toggles[&EventType::TitleChanged]);
}

#[test]
fn single_ban_keyword_only_touches_banned() {
    let toggles = expand_alerts(Some(&json!("all,!ban")), true);

    assert!(!toggles[&EventType::Banned]);
    assert!(toggles[&EventType::Unbanned]);
}

#[test]
fn none_is_all_inverted() {
    let toggles = expand_alerts(Some(&json!("none,live")), true);

    assert!(toggles[&EventType::Live]);
    assert!(!toggles[&EventType::Offline]);
    assert!(!toggles[&EventType::Unbanned]);
}

#[test]
fn unconfigured_alerts_disable_everything() {
    let settings = prepared(json!({}), &[("alice", json!({}))]);

    assert_eq!(settings.alerts(&entity("alice"), EventType::Live), None);
    assert!(enabled(&settings, "alice").is_empty());
}

#[test]
fn per_event_values_fall_through_to_global_scalar() {
    let global = SettingsLayer::from_raw(&table(json!({ "Message Text": "{name} did a thing" })), true);
    let alice = SettingsLayer::from_raw(
        &table(json!({ "Message Text": { "live": "{name} is live!" } })),
        false,
    );

    assert_eq!(
        resolve("Message Text", Some(EventType::Live), &global, &alice),
        Some(&json!("{name} is live!"))
    );
    assert_eq!(
        resolve("Message Text", Some(EventType::Offline), &global, &alice),
        Some(&json!("{name} did a thing"))
    );
}

#[test]
fn per_event_tables_expand_keywords() {
    let settings = prepared(
        json!({
            "Alerts": "all",
            "Priority": { "all": 0, "bans": 2 },
        }),
        &[("alice", json!({}))],
    );

    assert_eq!(
        settings.resolve("Priority", &entity("alice"), Some(EventType::Live)),
        Some(&json!(0))
    );
    assert_eq!(
        settings.resolve("Priority", &entity("alice"), Some(EventType::Unbanned)),
        Some(&json!(2))
    );
}

#[test]
fn scalar_settings_ignore_the_event() {
    let settings = prepared(json!({ "Webhook URL": "https://hooks.example/a" }), &[("alice", json!({}))]);

    let url = json!("https://hooks.example/a");
    assert_eq!(settings.resolve("Webhook URL", &entity("alice"), None), Some(&url));
    assert_eq!(
        settings.resolve("Webhook URL", &entity("alice"), Some(EventType::Banned)),
        Some(&url)
    );
}

#[test]
fn per_event_setting_without_event_is_unconfigured() {
    let settings = prepared(
        json!({ "Message Text": { "live": "hi" } }),
        &[("alice", json!({}))],
    );

    assert_eq!(settings.resolve("Message Text", &entity("alice"), None), None);
    assert_eq!(
        settings.resolve("Message Text", &entity("alice"), Some(EventType::Offline)),
        None
    );
}

#[test]
fn unknown_keys_resolve_to_nothing() {
    let settings = prepared(json!({ "Alerts": "all" }), &[("alice", json!({}))]);

    assert_eq!(settings.resolve("Colour", &entity("alice"), Some(EventType::Live)), None);
}
