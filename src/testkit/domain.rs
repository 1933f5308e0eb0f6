//! Builders for domain primitives used across tests.

use std::sync::Arc;

use crate::domain::{EntityId, EntitySnapshot};
use crate::infrastructure::entity::InMemoryEntityStore;

/// Create an [`EntityId`] from a string.
pub fn entity(id: &str) -> EntityId {
    EntityId::new(id)
}

/// A snapshot with display name, title and game filled in.
pub fn snapshot(id: &str, name: &str, title: &str, game: &str) -> EntitySnapshot {
    EntitySnapshot::unknown(EntityId::new(id))
        .with_name(name)
        .with_title(title)
        .with_game(game)
}

/// A store tracking `ids`, each named after its id.
pub fn store(ids: &[&str]) -> Arc<InMemoryEntityStore> {
    let store = InMemoryEntityStore::new();
    for id in ids {
        store.upsert(EntityId::new(*id), *id);
    }
    Arc::new(store)
}
