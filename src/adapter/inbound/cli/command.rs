//! Command-line interface definitions.
//!
//! Defines the CLI structure for the streamwatch application using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::EventType;

/// Stream alert dispatcher CLI
#[derive(Parser, Debug)]
#[command(name = "streamwatch")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate channel configuration without sending anything
    Check,

    /// Deliver a single alert and wait for the result
    Send(SendArgs),

    /// Read alerts from stdin until EOF or Ctrl+C
    Run(RunArgs),
}

/// Arguments for `streamwatch send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Entity identifier as configured under `[entities]`
    pub entity: String,

    /// Event type (live, title, game, offline, ban, unban)
    pub event: EventType,

    /// Stream title to render into templates
    #[arg(long)]
    pub title: Option<String>,

    /// Game or category to render into templates
    #[arg(long)]
    pub game: Option<String>,
}

/// Arguments for `streamwatch run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured failure polling interval (milliseconds)
    #[arg(long)]
    pub check_interval_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_with_overrides() {
        let cli = Cli::parse_from([
            "streamwatch",
            "--config",
            "alerts.toml",
            "send",
            "alice",
            "title",
            "--title",
            "Speedrun",
        ]);

        assert_eq!(cli.config, PathBuf::from("alerts.toml"));
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.entity, "alice");
                assert_eq!(args.event, EventType::TitleChanged);
                assert_eq!(args.title.as_deref(), Some("Speedrun"));
                assert!(args.game.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_event() {
        let parsed = Cli::try_parse_from(["streamwatch", "send", "alice", "raid"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn defaults_config_path() {
        let cli = Cli::parse_from(["streamwatch", "check"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(!cli.json);
    }
}
