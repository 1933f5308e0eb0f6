use clap::Parser;
use tracing::{error, info};

use streamwatch::adapter::inbound::cli::command::{Cli, Commands};
use streamwatch::adapter::inbound::cli::output::{self, OutputConfig};
use streamwatch::adapter::inbound::cli::{check, run, send};
use streamwatch::infrastructure::config::settings::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!("Failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!(config = %cli.config.display(), "streamwatch starting");

    let result = match &cli.command {
        Commands::Check => check::execute(&cli.config, &config),
        Commands::Send(args) => send::execute(&config, args).await,
        Commands::Run(args) => run::execute(&config, args).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Fatal error");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
