//! Channel construction.
//!
//! Builds the enabled channels from configuration, handing each one its
//! settings layers and the shared transport.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::channel::{DiscordChannel, LogChannel, PushoverChannel};
use crate::error::Result;
use crate::infrastructure::config::dispatcher::ChannelKind;
use crate::infrastructure::config::settings::Config;
use crate::port::{Channel, Transport};

#[cfg(feature = "telegram")]
use crate::adapter::outbound::channel::telegram::{apply_token_fallback, TelegramChannel, TOKEN_ENV};

/// Build one channel.
pub fn build_channel(config: &Config, kind: ChannelKind, transport: &Arc<dyn Transport>) -> Result<Box<dyn Channel>> {
    let settings = config.channel_config(kind);
    let channel: Box<dyn Channel> = match kind {
        ChannelKind::Discord => Box::new(DiscordChannel::new(settings, Arc::clone(transport))),
        ChannelKind::Pushover => Box::new(PushoverChannel::new(settings, Arc::clone(transport))),
        ChannelKind::Log => Box::new(LogChannel::new(settings)),
        ChannelKind::Telegram => build_telegram(settings, transport)?,
    };
    Ok(channel)
}

#[cfg(feature = "telegram")]
fn build_telegram(
    mut settings: crate::application::channel::ChannelConfig,
    transport: &Arc<dyn Transport>,
) -> Result<Box<dyn Channel>> {
    apply_token_fallback(&mut settings, std::env::var(TOKEN_ENV).ok());
    Ok(Box::new(TelegramChannel::new(settings, Arc::clone(transport))))
}

#[cfg(not(feature = "telegram"))]
fn build_telegram(
    _settings: crate::application::channel::ChannelConfig,
    _transport: &Arc<dyn Transport>,
) -> Result<Box<dyn Channel>> {
    Err(crate::error::ConfigError::invalid(
        "dispatcher.channels",
        "telegram support requires the telegram feature",
    )
    .into())
}

/// Build every enabled channel, in configuration order.
pub fn build_channels(config: &Config, transport: Arc<dyn Transport>) -> Result<Vec<Box<dyn Channel>>> {
    let channels = config
        .dispatcher
        .channels
        .iter()
        .map(|kind| build_channel(config, *kind, &transport))
        .collect::<Result<Vec<_>>>()?;

    info!(
        channels = ?config.dispatcher.channels.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
        "Channels built"
    );
    Ok(channels)
}
