//! Telegram bot channel.
//!
//! Talks to the Bot API directly over the shared [`Transport`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::application::channel::{value_text, ChannelConfig, ChannelSettings, Cooldown, Field, FieldKind};
use crate::domain::template::TemplateContext;
use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::Result;
use crate::port::{Channel, Delivery, Transport};

pub const NAME: &str = "telegram";

/// Setting holding the bot token; may also come from the environment.
pub const TOKEN_KEY: &str = "Bot Token";

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

const API_BASE: &str = "https://api.telegram.org";

const FIELDS: &[Field] = &[
    Field::required(TOKEN_KEY, FieldKind::Text),
    Field::required("Chat ID", FieldKind::Text),
    Field::required("Message Text", FieldKind::Text),
    Field::optional("Parse Mode", FieldKind::Text),
    Field::optional("Silent", FieldKind::Bool),
];

#[derive(Serialize)]
struct SendMessage {
    chat_id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disable_notification: bool,
}

/// Sends alerts as Telegram bot messages.
pub struct TelegramChannel {
    settings: ChannelSettings,
    cooldown: Cooldown,
    transport: Arc<dyn Transport>,
}

impl TelegramChannel {
    pub fn new(config: ChannelConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: ChannelSettings::new(NAME, config),
            cooldown: Cooldown::new(),
            transport,
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self) -> Result<Vec<String>> {
        self.settings.validate(FIELDS)
    }

    fn init(&mut self, entities: &[EntityId]) -> Result<()> {
        self.settings.init(entities);
        Ok(())
    }

    async fn send_alert(&self, entity: &EntitySnapshot, event: EventType) -> Result<Delivery> {
        if let Some(reason) = self.settings.admit(&self.cooldown, &entity.id, event) {
            return Ok(Delivery::Skipped(reason));
        }

        let ctx = TemplateContext::for_alert(entity, event);
        let token = self.settings.require(TOKEN_KEY, entity, event, &ctx)?;
        let message = SendMessage {
            chat_id: self.settings.require("Chat ID", entity, event, &ctx)?,
            text: self.settings.require("Message Text", entity, event, &ctx)?,
            parse_mode: self.settings.render("Parse Mode", entity, event, &ctx)?,
            disable_notification: self
                .settings
                .resolve("Silent", &entity.id, Some(event))
                .and_then(Value::as_bool)
                .unwrap_or(false),
        };

        let url = format!("{API_BASE}/bot{token}/sendMessage");
        let body = serde_json::to_value(&message)?;
        self.transport.post_json(NAME, &url, &body).await?;
        Ok(Delivery::Sent)
    }
}

/// Fill in the bot token from `env_token` when the global table lacks one.
pub fn apply_token_fallback(config: &mut ChannelConfig, env_token: Option<String>) {
    let configured = config.global.get(TOKEN_KEY).and_then(value_text).is_some();
    if configured {
        return;
    }
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        config.global.insert(TOKEN_KEY.to_string(), Value::String(token));
    }
}
