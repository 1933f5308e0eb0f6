//! Composition root: wires configuration into a ready dispatcher.

use std::sync::Arc;

use tracing::info;

use crate::application::dispatcher::AlertDispatcher;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::entity::InMemoryEntityStore;
use crate::infrastructure::factory::channel::build_channels;
use crate::port::{EntityStore, Transport};

/// Everything a command needs to deliver alerts.
pub struct Wired {
    pub dispatcher: AlertDispatcher,
    pub entities: Arc<InMemoryEntityStore>,
    /// Validation warnings from every channel.
    pub warnings: Vec<String>,
}

/// Seed an entity store with the configured entities.
#[must_use]
pub fn build_entity_store(config: &Config) -> Arc<InMemoryEntityStore> {
    let store = InMemoryEntityStore::new();
    for id in config.entity_ids() {
        let name = config.display_name(&id);
        store.upsert(id, name);
    }
    Arc::new(store)
}

/// Build, register and prepare every enabled channel.
///
/// Configuration errors surface here, before anything is sent.
pub fn wire(config: &Config, transport: Arc<dyn Transport>) -> Result<Wired> {
    let entities = build_entity_store(config);
    let mut dispatcher = AlertDispatcher::new(Arc::clone(&entities) as Arc<dyn EntityStore>);

    for channel in build_channels(config, transport)? {
        dispatcher.register(channel)?;
    }
    let warnings = dispatcher.prepare(&config.entity_ids())?;

    info!(
        entities = config.entities.len(),
        warnings = warnings.len(),
        "Dispatcher wired"
    );
    Ok(Wired {
        dispatcher,
        entities,
        warnings,
    })
}
