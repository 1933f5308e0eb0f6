//! Layered preference resolution.

use serde_json::Value;

use super::layer::{Setting, SettingsLayer};
use crate::domain::event::EventType;

/// Resolve the effective value of `name` for `event`.
///
/// The entity layer is consulted first, then the global layer. A scalar
/// setting matches regardless of `event`. A per-event setting only matches
/// when it has an entry for `event`; otherwise the search continues with
/// the next layer. `None` means the setting is unconfigured, which callers
/// must keep distinct from a falsy value.
#[must_use]
pub fn resolve<'a>(
    name: &str,
    event: Option<EventType>,
    global: &'a SettingsLayer,
    entity: &'a SettingsLayer,
) -> Option<&'a Value> {
    [entity, global]
        .into_iter()
        .find_map(|layer| match layer.get(name)? {
            Setting::Scalar(value) => Some(value),
            Setting::PerEvent(map) => map.get(&event?),
        })
}
