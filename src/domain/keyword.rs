//! Shorthand keywords that expand to sets of event types.

use super::event::EventType;

/// Marker that inverts a keyword's value in `Alerts`.
pub const NEGATION: char = '!';

/// A named group of event types.
#[derive(Debug, Clone, Copy)]
pub struct KeywordGroup {
    pub name: &'static str,
    pub members: &'static [EventType],
    /// The group applies the negated value to its members.
    pub inverted: bool,
    /// Only meaningful inside `Alerts`.
    pub alerts_only: bool,
}

/// The static keyword table.
pub const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        name: "all",
        members: &EventType::ALL,
        inverted: false,
        alerts_only: false,
    },
    KeywordGroup {
        name: "none",
        members: &EventType::ALL,
        inverted: true,
        alerts_only: true,
    },
    KeywordGroup {
        name: "soon",
        members: &[EventType::TitleChanged, EventType::GameChanged],
        inverted: false,
        alerts_only: false,
    },
    KeywordGroup {
        name: "bans",
        members: &[EventType::Banned, EventType::Unbanned],
        inverted: false,
        alerts_only: false,
    },
];

/// Result of looking up one keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub members: Vec<EventType>,
    pub inverted: bool,
}

/// Look up a keyword or bare event name.
///
/// `in_alerts` enables the alerts-only groups. The word must already be
/// lowercased and stripped of any negation marker.
#[must_use]
pub fn expand_keyword(word: &str, in_alerts: bool) -> Option<Expansion> {
    if let Some(group) = KEYWORD_GROUPS
        .iter()
        .find(|g| g.name == word && (in_alerts || !g.alerts_only))
    {
        return Some(Expansion {
            members: group.members.to_vec(),
            inverted: group.inverted,
        });
    }

    EventType::parse(word).map(|event| Expansion {
        members: vec![event],
        inverted: false,
    })
}

/// Lowercase a raw key and split off a leading negation marker.
#[must_use]
pub fn normalize_key(raw: &str) -> (String, bool) {
    let key = raw.trim().to_ascii_lowercase();
    match key.strip_prefix(NEGATION) {
        Some(rest) => (rest.trim().to_string(), true),
        None => (key, false),
    }
}
