//! Pushover push-notification channel.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::channel::{value_text, ChannelConfig, ChannelSettings, Cooldown, Field, FieldKind};
use crate::domain::template::TemplateContext;
use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::Result;
use crate::port::{Channel, Delivery, Transport};

pub const NAME: &str = "pushover";

const API_URL: &str = "https://api.pushover.net/1/messages.json";

const FIELDS: &[Field] = &[
    Field::required("API Token", FieldKind::Text),
    Field::required("Group Key", FieldKind::Text),
    Field::required("Message Text", FieldKind::Text),
    Field::optional("Embed URL", FieldKind::Url),
    Field::optional("URL Title", FieldKind::Text),
    Field::optional("Devices", FieldKind::Text),
    Field::optional("Message Title", FieldKind::Text),
    Field::optional("Priority", FieldKind::Number),
    Field::optional("Sound", FieldKind::Text),
];

/// Optional settings and the form parameter each one fills.
const OPTIONAL_PARAMS: &[(&str, &str)] = &[
    ("Embed URL", "url"),
    ("URL Title", "url_title"),
    ("Devices", "device"),
    ("Message Title", "title"),
    ("Sound", "sound"),
];

/// Sends alerts through the Pushover messages API.
pub struct PushoverChannel {
    settings: ChannelSettings,
    cooldown: Cooldown,
    transport: Arc<dyn Transport>,
}

impl PushoverChannel {
    pub fn new(config: ChannelConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: ChannelSettings::new(NAME, config),
            cooldown: Cooldown::new(),
            transport,
        }
    }
}

#[async_trait]
impl Channel for PushoverChannel {
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
        let mut params = vec![
            ("token".to_string(), self.settings.require("API Token", entity, event, &ctx)?),
            ("user".to_string(), self.settings.require("Group Key", entity, event, &ctx)?),
            ("message".to_string(), self.settings.require("Message Text", entity, event, &ctx)?),
        ];

        for (key, param) in OPTIONAL_PARAMS {
            if let Some(value) = self.settings.render(key, entity, event, &ctx)? {
                params.push(((*param).to_string(), value));
            }
        }
        if let Some(priority) = self
            .settings
            .resolve("Priority", &entity.id, Some(event))
            .and_then(value_text)
        {
            params.push(("priority".to_string(), priority));
        }

        self.transport.post_form(NAME, API_URL, &params).await?;
        Ok(Delivery::Sent)
    }
}
