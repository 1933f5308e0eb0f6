//! Read access to tracked entities.

use crate::domain::{EntityId, EntitySnapshot};

/// Source of an entity's last-known display attributes.
///
/// The polling collaborator owns and updates this data; the dispatcher
/// only snapshots it when an alert is submitted.
pub trait EntityStore: Send + Sync {
    /// Current attributes of `id`, if the entity is known.
    fn snapshot(&self, id: &EntityId) -> Option<EntitySnapshot>;
}
