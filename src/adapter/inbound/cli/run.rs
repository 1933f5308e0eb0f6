//! Handler for the `run` command.
//!
//! Reads one instruction per line from stdin:
//!
//! ```text
//! alert <entity> <event>
//! title <entity> <new title...>
//! game <entity> <new game...>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Delivery failures are
//! polled on a fixed interval; a fatal one stops the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::http::HttpTransport;
use crate::application::dispatcher::AlertDispatcher;
use crate::domain::{EntityId, EventType};
use crate::error::{DeliveryError, Error, Result};
use crate::infrastructure::bootstrap::{wire, Wired};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::entity::InMemoryEntityStore;
use crate::port::Transport;

/// A parsed stdin instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Alert(EntityId, EventType),
    Title(EntityId, String),
    Game(EntityId, String),
}

impl Input {
    /// Parse one line. `Ok(None)` for blank lines and comments.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let (entity, rest) = split_word(rest);
        if entity.is_empty() {
            return Err(format!("missing entity in '{line}'"));
        }
        let entity = EntityId::new(entity);

        let input = match verb {
            "alert" => {
                let event = rest.trim().parse::<EventType>()?;
                Input::Alert(entity, event)
            }
            "title" => Input::Title(entity, rest.trim().to_string()),
            "game" => Input::Game(entity, rest.trim().to_string()),
            other => return Err(format!("unknown instruction '{other}'")),
        };
        Ok(Some(input))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(at) => (&s[..at], &s[at..]),
        None => (s, ""),
    }
}

/// Execute the run command.
pub async fn execute(config: &Config, args: &RunArgs) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
    let Wired {
        mut dispatcher,
        entities,
        warnings,
    } = wire(config, transport)?;
    for warning in &warnings {
        output::warning(warning);
    }

    let interval = args
        .check_interval_ms
        .filter(|ms| *ms > 0)
        .map_or_else(|| config.dispatcher.check_interval(), Duration::from_millis);

    dispatcher.start(Handle::current());
    info!(channels = ?dispatcher.channel_names(), "streamwatch running");

    let result = event_loop(&mut dispatcher, &entities, interval).await;

    let summary = dispatcher.stop().await;
    info!(
        completed = summary.completed,
        failed = summary.failed,
        cancelled = summary.cancelled,
        undrained = summary.undrained,
        "streamwatch stopped"
    );
    result
}

async fn event_loop(
    dispatcher: &mut AlertDispatcher,
    entities: &InMemoryEntityStore,
    interval: Duration,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => apply(dispatcher, entities, &line),
                None => {
                    info!("Input closed, delivering outstanding alerts");
                    dispatcher.flush().await;
                    return drain(dispatcher);
                }
            },
            _ = ticker.tick() => {
                if let Err(err) = dispatcher.check_tasks() {
                    if let Some(fatal) = surface(err) {
                        return Err(fatal);
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                return Ok(());
            }
        }
    }
}

fn apply(dispatcher: &mut AlertDispatcher, entities: &InMemoryEntityStore, line: &str) {
    match Input::parse(line) {
        Ok(Some(Input::Alert(entity, event))) => dispatcher.submit(entity, event),
        Ok(Some(Input::Title(entity, title))) => entities.set_title(&entity, title),
        Ok(Some(Input::Game(entity, game))) => entities.set_game(&entity, game),
        Ok(None) => {}
        Err(reason) => warn!(%reason, "Ignoring input line"),
    }
}

/// Surface every queued failure, returning the first fatal one.
fn drain(dispatcher: &mut AlertDispatcher) -> Result<()> {
    let mut fatal = None;
    while let Err(err) = dispatcher.check_tasks() {
        if let Some(err) = surface(err) {
            fatal.get_or_insert(err);
        }
    }
    fatal.map_or(Ok(()), Err)
}

fn surface(err: DeliveryError) -> Option<Error> {
    if err.is_fatal() {
        error!(error = %err, "Fatal delivery failure");
        Some(err.into())
    } else {
        warn!(error = %err, "Alert delivery failed");
        None
    }
}
