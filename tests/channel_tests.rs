//! Channel adapters driven through the `Channel` port.

use std::sync::Arc;

use serde_json::{json, Value};

use streamwatch::adapter::outbound::channel::{DiscordChannel, PushoverChannel, TelegramChannel};
use streamwatch::domain::EventType;
use streamwatch::error::{ConfigError, Error};
use streamwatch::port::{Channel, Delivery, SkipReason, Transport};
use streamwatch::testkit::config::channel_config;
use streamwatch::testkit::domain::{entity, snapshot};
use streamwatch::testkit::transport::{RecordingTransport, Request};

fn recording() -> (Arc<RecordingTransport>, Arc<dyn Transport>) {
    let transport = Arc::new(RecordingTransport::new());
    let shared = Arc::clone(&transport) as Arc<dyn Transport>;
    (transport, shared)
}

fn pushover(global: Value, entities: &[(&str, Value)], transport: Arc<dyn Transport>) -> PushoverChannel {
    let ids: Vec<_> = entities.iter().map(|(id, _)| entity(id)).collect();
    let mut channel = PushoverChannel::new(channel_config(global, entities), transport);
    channel.validate().expect("valid pushover config");
    channel.init(&ids).expect("init");
    channel
}

fn missing_field(err: Error) -> (String, String, &'static str) {
    match err {
        Error::Config(ConfigError::MissingField {
            scope, event, field, ..
        }) => (scope, event, field),
        other => panic!("expected a missing field, got {other}"),
    }
}

#[tokio::test]
async fn pushover_entity_overrides_reach_the_request() {
    let (transport, shared) = recording();
    let channel = pushover(
        json!({
            "Alerts": "all",
            "API Token": "app-token",
            "Group Key": "group",
            "Message Text": { "all": "{name}: {message}", "live": "{name} is live: {title}" },
            "Priority": 0,
        }),
        &[("alice", json!({ "Priority": { "live": 1 }, "Sound": "cosmic" })), ("bob", json!({}))],
        shared,
    );

    let alice = snapshot("alice", "Alice", "Speedrun", "Celeste");
    assert_eq!(channel.send_alert(&alice, EventType::Live).await.unwrap(), Delivery::Sent);

    let request = transport.last().unwrap();
    assert!(matches!(request, Request::Form { .. }));
    assert_eq!(request.param("token"), Some("app-token"));
    assert_eq!(request.param("user"), Some("group"));
    assert_eq!(request.param("message"), Some("Alice is live: Speedrun"));
    assert_eq!(request.param("priority"), Some("1"));
    assert_eq!(request.param("sound"), Some("cosmic"));

    let bob = snapshot("bob", "Bob", "", "");
    channel.send_alert(&bob, EventType::Offline).await.unwrap();
    let request = transport.last().unwrap();
    assert_eq!(request.param("message"), Some("Bob: offline"));
    assert_eq!(request.param("priority"), Some("0"));
    assert_eq!(request.param("sound"), None);
}

#[tokio::test]
async fn cooldown_is_per_entity() {
    let (transport, shared) = recording();
    let channel = pushover(
        json!({
            "Alerts": "soon",
            "API Token": "t",
            "Group Key": "g",
            "Message Text": "{name} {message}",
            "Soon Cooldown": 300,
        }),
        &[("alice", json!({})), ("bob", json!({}))],
        shared,
    );

    let alice = snapshot("alice", "Alice", "", "");
    let bob = snapshot("bob", "Bob", "", "");
    assert_eq!(channel.send_alert(&alice, EventType::GameChanged).await.unwrap(), Delivery::Sent);
    assert_eq!(
        channel.send_alert(&alice, EventType::TitleChanged).await.unwrap(),
        Delivery::Skipped(SkipReason::Cooldown)
    );
    assert_eq!(channel.send_alert(&bob, EventType::TitleChanged).await.unwrap(), Delivery::Sent);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn zero_cooldown_never_throttles() {
    let (transport, shared) = recording();
    let channel = pushover(
        json!({
            "Alerts": "soon",
            "API Token": "t",
            "Group Key": "g",
            "Message Text": "{name} {message}",
            "Soon Cooldown": 0,
        }),
        &[("alice", json!({}))],
        shared,
    );

    let alice = snapshot("alice", "Alice", "", "");
    for _ in 0..3 {
        channel.send_alert(&alice, EventType::TitleChanged).await.unwrap();
    }
    assert_eq!(transport.requests().len(), 3);
}

#[test]
fn discord_dry_run_names_the_missing_field() {
    let (_, shared) = recording();
    let channel = DiscordChannel::new(
        channel_config(
            json!({
                "Alerts": "live",
                "Message Text": "{name} is live",
                "Webhook URL": { "live": null },
            }),
            &[("alice", json!({ "Webhook URL": "https://discord.example/a" })), ("bob", json!({}))],
        ),
        shared,
    );

    let (scope, event, field) = missing_field(channel.validate().unwrap_err());
    assert_eq!(scope, "entity bob");
    assert_eq!(event, "live");
    assert_eq!(field, "Webhook URL");
}

#[test]
fn discord_dry_run_skips_disabled_events() {
    let (_, shared) = recording();
    let channel = DiscordChannel::new(
        channel_config(
            json!({
                "Alerts": "live",
                "Webhook URL": "https://discord.example/a",
                "Message Text": { "live": "{name} is live" },
            }),
            &[("alice", json!({}))],
        ),
        shared,
    );

    assert!(channel.validate().unwrap().is_empty());
}

#[test]
fn discord_dry_run_rejects_bad_urls() {
    let (_, shared) = recording();
    let channel = DiscordChannel::new(
        channel_config(
            json!({
                "Alerts": "all",
                "Webhook URL": "not a url",
                "Message Text": "{name}",
            }),
            &[("alice", json!({}))],
        ),
        shared,
    );

    match channel.validate().unwrap_err() {
        Error::Config(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "discord/entity alice/Webhook URL");
        }
        other => panic!("expected an invalid value, got {other}"),
    }
}

#[tokio::test]
async fn discord_renders_null_id_and_embeds() {
    let (transport, shared) = recording();
    let mut channel = DiscordChannel::new(
        channel_config(
            json!({
                "Alerts": "all",
                "Webhook URL": "https://discord.example/a",
                "Message Text": "{discord_id} {name} {message}",
                "Embeds": [{ "title": "{title}", "color": 5814783 }],
            }),
            &[("alice", json!({}))],
        ),
        shared,
    );
    channel.init(&[entity("alice")]).unwrap();

    let alice = snapshot("alice", "Alice", "Speedrun", "");
    channel.send_alert(&alice, EventType::Live).await.unwrap();

    let body = transport.last().and_then(|r| r.body().cloned()).unwrap();
    assert_eq!(body["content"], "[Null ID] Alice live");
    assert_eq!(body["embeds"][0]["title"], "Speedrun");
    assert_eq!(body["embeds"][0]["color"], 5814783);
}

#[test]
fn telegram_requires_chat_id_for_enabled_events() {
    let (_, shared) = recording();
    let channel = TelegramChannel::new(
        channel_config(
            json!({
                "Alerts": "offline",
                "Bot Token": "123:abc",
                "Message Text": "{name} went offline",
            }),
            &[("alice", json!({}))],
        ),
        shared,
    );

    let (_, event, field) = missing_field(channel.validate().unwrap_err());
    assert_eq!(event, "offline");
    assert_eq!(field, "Chat ID");
}

#[tokio::test]
async fn transport_failures_propagate_from_send() {
    let transport = Arc::new(RecordingTransport::new().with_statuses(&[401]));
    let channel = pushover(
        json!({
            "Alerts": "all",
            "API Token": "t",
            "Group Key": "g",
            "Message Text": "{name}",
        }),
        &[("alice", json!({}))],
        Arc::clone(&transport) as Arc<dyn Transport>,
    );

    let err = channel
        .send_alert(&snapshot("alice", "Alice", "", ""), EventType::Live)
        .await
        .unwrap_err();
    assert!(err.is_fatal());
}
