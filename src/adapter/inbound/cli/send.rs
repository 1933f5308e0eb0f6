//! Handler for the `send` command.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::warn;

use crate::adapter::inbound::cli::command::SendArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::http::HttpTransport;
use crate::domain::EntityId;
use crate::error::Result;
use crate::infrastructure::bootstrap::{wire, Wired};
use crate::infrastructure::config::settings::Config;
use crate::port::{Delivery, SkipReason, Transport};

/// Deliver one alert through every enabled channel and report the outcome.
pub async fn execute(config: &Config, args: &SendArgs) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
    let Wired {
        mut dispatcher,
        entities,
        warnings,
    } = wire(config, transport)?;
    for warning in &warnings {
        output::warning(warning);
    }

    let entity = EntityId::new(args.entity.as_str());
    if !config.entities.contains_key(entity.as_str()) {
        warn!(%entity, "Entity is not configured, using global settings only");
    }
    if let Some(title) = &args.title {
        entities.set_title(&entity, title.as_str());
    }
    if let Some(game) = &args.game {
        entities.set_game(&entity, game.as_str());
    }

    dispatcher.start(Handle::current());
    dispatcher.submit(entity, args.event);
    let reports = dispatcher.flush().await;
    let outcome = dispatcher.check_tasks();
    dispatcher.stop().await;

    output::section("Delivery");
    for report in &reports {
        for (channel, delivery) in &report.outcomes {
            output::field(channel, describe(*delivery));
        }
    }
    outcome?;
    Ok(())
}

fn describe(delivery: Delivery) -> &'static str {
    match delivery {
        Delivery::Sent => "sent",
        Delivery::Skipped(SkipReason::Disabled) => "skipped (disabled)",
        Delivery::Skipped(SkipReason::Cooldown) => "skipped (cooldown)",
        Delivery::Skipped(SkipReason::Unsupported) => "skipped (unsupported)",
    }
}
