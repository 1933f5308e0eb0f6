//! In-memory entity store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{EntityId, EntitySnapshot};
use crate::port::EntityStore;

/// Last-known attributes of every tracked entity.
///
/// The polling side writes through `upsert`/`set_title`/`set_game`; the
/// dispatcher reads a snapshot per submission.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: RwLock<HashMap<EntityId, EntitySnapshot>>,
}

impl InMemoryEntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `id` under display `name`, keeping any known title and game.
    pub fn upsert(&self, id: EntityId, name: impl Into<String>) {
        let name = name.into();
        let mut entities = self.entities.write();
        entities
            .entry(id.clone())
            .and_modify(|e| e.name.clone_from(&name))
            .or_insert_with(|| EntitySnapshot {
                id,
                name,
                title: String::new(),
                game: String::new(),
            });
    }

    pub fn set_title(&self, id: &EntityId, title: impl Into<String>) {
        let title = title.into();
        self.update(id, |e| e.title = title);
    }

    pub fn set_game(&self, id: &EntityId, game: impl Into<String>) {
        let game = game.into();
        self.update(id, |e| e.game = game);
    }

    fn update(&self, id: &EntityId, apply: impl FnOnce(&mut EntitySnapshot)) {
        let mut entities = self.entities.write();
        let entry = entities
            .entry(id.clone())
            .or_insert_with(|| EntitySnapshot::unknown(id.clone()));
        apply(entry);
    }

    /// Tracked ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl EntityStore for InMemoryEntityStore {
    fn snapshot(&self, id: &EntityId) -> Option<EntitySnapshot> {
        self.entities.read().get(id).cloned()
    }
}
