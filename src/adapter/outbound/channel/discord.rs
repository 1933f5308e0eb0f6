//! Discord webhook channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::application::channel::{value_text, ChannelConfig, ChannelSettings, Cooldown, Field, FieldKind};
use crate::domain::template::{self, TemplateContext};
use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::Result;
use crate::port::{Channel, Delivery, Transport};

pub const NAME: &str = "discord";

/// Rendered in `{discord_id}` when no `Discord ID` is configured.
const NULL_ID: &str = "[Null ID]";

const FIELDS: &[Field] = &[
    Field::required("Webhook URL", FieldKind::Url),
    Field::required("Message Text", FieldKind::Text),
    Field::optional("Discord ID", FieldKind::Text),
    Field::optional("Bot Username", FieldKind::Text),
    Field::optional("Avatar URL", FieldKind::Url),
    Field::optional("Embeds", FieldKind::List),
];

#[derive(Serialize)]
struct WebhookPayload {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embeds: Option<Vec<Value>>,
    allowed_mentions: AllowedMentions,
}

#[derive(Serialize)]
struct AllowedMentions {
    parse: [&'static str; 1],
}

/// Posts alerts to a Discord webhook.
pub struct DiscordChannel {
    settings: ChannelSettings,
    cooldown: Cooldown,
    transport: Arc<dyn Transport>,
}

impl DiscordChannel {
    pub fn new(config: ChannelConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: ChannelSettings::new(NAME, config),
            cooldown: Cooldown::new(),
            transport,
        }
    }

    /// Render the top-level string fields of each embed.
    fn embeds(&self, entity: &EntitySnapshot, event: EventType, ctx: &TemplateContext) -> Result<Option<Vec<Value>>> {
        let Some(Value::Array(embeds)) = self.settings.resolve("Embeds", &entity.id, Some(event)) else {
            return Ok(None);
        };

        let mut rendered = Vec::with_capacity(embeds.len());
        for embed in embeds {
            let mut embed = embed.clone();
            if let Value::Object(fields) = &mut embed {
                for value in fields.values_mut() {
                    if let Value::String(text) = value {
                        *text = template::render(text.as_str(), ctx)?;
                    }
                }
            }
            rendered.push(embed);
        }
        Ok(Some(rendered))
    }
}

#[async_trait]
impl Channel for DiscordChannel {
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

        let discord_id = self
            .settings
            .resolve("Discord ID", &entity.id, Some(event))
            .and_then(value_text)
            .unwrap_or_else(|| NULL_ID.to_string());
        let ctx = TemplateContext::for_alert(entity, event).with("discord_id", discord_id);

        let url = self.settings.require("Webhook URL", entity, event, &ctx)?;
        let payload = WebhookPayload {
            content: self.settings.require("Message Text", entity, event, &ctx)?,
            username: self.settings.render("Bot Username", entity, event, &ctx)?,
            avatar_url: self.settings.render("Avatar URL", entity, event, &ctx)?,
            embeds: self.embeds(entity, event, &ctx)?,
            allowed_mentions: AllowedMentions { parse: ["everyone"] },
        };

        let body = serde_json::to_value(&payload)?;
        self.transport.post_json(NAME, &url, &body).await?;
        Ok(Delivery::Sent)
    }
}
