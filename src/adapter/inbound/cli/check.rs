//! Handler for the `check` command.

use std::path::Path;
use std::sync::Arc;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::http::HttpTransport;
use crate::error::Result;
use crate::infrastructure::bootstrap::wire;
use crate::infrastructure::config::settings::Config;
use crate::port::Transport;

/// Dry-run every enabled channel against every tracked entity.
///
/// Nothing is sent. Any configuration error is returned before the summary
/// is printed.
pub fn execute(path: &Path, config: &Config) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
    let wired = wire(config, transport)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::field("Entities", config.entities.len());
    output::field("Channels", wired.dispatcher.channel_names().join(", "));

    for warning in &wired.warnings {
        output::warning(warning);
    }
    if wired.warnings.is_empty() {
        output::success("Configuration is valid");
    } else {
        output::success(&format!(
            "Configuration is valid ({} warning{})",
            wired.warnings.len(),
            if wired.warnings.len() == 1 { "" } else { "s" }
        ));
    }
    Ok(())
}
