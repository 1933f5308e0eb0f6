//! Hierarchical alert preferences.
//!
//! Raw configuration tables are compiled into [`SettingsLayer`]s by
//! expanding shorthand keywords (`all`, `none`, `soon`, `bans`, negation).
//! [`resolve`] then merges an entity layer over a global layer for a given
//! setting and event. Everything here is pure and synchronous.

pub mod expand;
pub mod layer;
pub mod resolve;

pub use expand::{expand_alerts, expand_setting, is_event_specific, AlertToggles, ALERTS_KEY};
pub use layer::{Setting, SettingsLayer};
pub use resolve::resolve;
