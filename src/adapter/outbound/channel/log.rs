//! Log-sink channel.
//!
//! Writes alerts through `tracing` under the `streamwatch::alert` target, so
//! the subscriber decides where they end up.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::application::channel::{ChannelConfig, ChannelSettings, Cooldown, Field, FieldKind};
use crate::domain::template::TemplateContext;
use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::Result;
use crate::port::{Channel, Delivery, SkipReason};

pub const NAME: &str = "log";

const MESSAGE_KEY: &str = "Message Text";

/// Used when the channel has no `Message Text` at all.
const DEFAULT_TEXT: &str = "{name}: {message}";

const FIELDS: &[Field] = &[Field::optional(MESSAGE_KEY, FieldKind::Text)];

/// Logs every enabled alert.
///
/// Every event is enabled unless `Alerts` says otherwise. An event whose
/// `Message Text` does not resolve is not logged.
pub struct LogChannel {
    settings: ChannelSettings,
    cooldown: Cooldown,
}

impl LogChannel {
    pub fn new(mut config: ChannelConfig) -> Self {
        if !config.global.contains_key(MESSAGE_KEY) {
            config
                .global
                .insert(MESSAGE_KEY.to_string(), Value::String(DEFAULT_TEXT.to_string()));
        }
        Self {
            settings: ChannelSettings::new(NAME, config).enabled_by_default(),
            cooldown: Cooldown::new(),
        }
    }
}

#[async_trait]
impl Channel for LogChannel {
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
        let Some(text) = self.settings.render(MESSAGE_KEY, entity, event, &ctx)? else {
            return Ok(Delivery::Skipped(SkipReason::Disabled));
        };

        info!(target: "streamwatch::alert", entity = %entity.id, %event, "{text}");
        Ok(Delivery::Sent)
    }
}
