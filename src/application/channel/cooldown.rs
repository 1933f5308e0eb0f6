//! Per-entity cooldown tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::domain::EntityId;

/// Last-triggered instants for throttled alerts, one per entity.
///
/// Each channel owns its own `Cooldown`; one channel's window never gates
/// another's.
#[derive(Debug, Default)]
pub struct Cooldown {
    last: Mutex<HashMap<EntityId, Instant>>,
}

impl Cooldown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `entity` if `window` has elapsed since the last
    /// claim. A refused claim leaves the timestamp untouched.
    pub fn try_acquire(&self, entity: &EntityId, window: Duration, now: Instant) -> bool {
        let mut last = self.last.lock();
        match last.get(entity) {
            Some(prev) if now.saturating_duration_since(*prev) < window => false,
            _ => {
                last.insert(entity.clone(), now);
                true
            }
        }
    }

    /// When `entity` last claimed the slot.
    #[must_use]
    pub fn last_triggered(&self, entity: &EntityId) -> Option<Instant> {
        self.last.lock().get(entity).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_always_succeeds() {
        let cooldown = Cooldown::new();
        let alice = EntityId::new("alice");
        assert!(cooldown.try_acquire(&alice, Duration::from_secs(3600), Instant::now()));
    }

    #[test]
    fn test_claim_inside_window_is_refused_and_keeps_timestamp() {
        let cooldown = Cooldown::new();
        let alice = EntityId::new("alice");
        let start = Instant::now();

        assert!(cooldown.try_acquire(&alice, Duration::from_secs(60), start));
        assert!(!cooldown.try_acquire(&alice, Duration::from_secs(60), start + Duration::from_secs(59)));
        assert_eq!(cooldown.last_triggered(&alice), Some(start));

        let later = start + Duration::from_secs(60);
        assert!(cooldown.try_acquire(&alice, Duration::from_secs(60), later));
        assert_eq!(cooldown.last_triggered(&alice), Some(later));
    }

    #[test]
    fn test_entities_are_independent() {
        let cooldown = Cooldown::new();
        let now = Instant::now();
        assert!(cooldown.try_acquire(&EntityId::new("alice"), Duration::from_secs(60), now));
        assert!(cooldown.try_acquire(&EntityId::new("bob"), Duration::from_secs(60), now));
    }

    #[test]
    fn test_zero_window_never_throttles() {
        let cooldown = Cooldown::new();
        let alice = EntityId::new("alice");
        let now = Instant::now();
        assert!(cooldown.try_acquire(&alice, Duration::ZERO, now));
        assert!(cooldown.try_acquire(&alice, Duration::ZERO, now));
    }
}
