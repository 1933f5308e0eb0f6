//! Scripted [`Channel`] for dispatcher tests.
//!
//! [`ScriptedChannel`] answers every `send_alert` according to a
//! [`Behavior`], optionally overridden per event, and records what it saw in
//! a shared [`ChannelProbe`] the test keeps after handing the channel to a
//! dispatcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::{ConfigError, Error, Result, TransportError};
use crate::port::{Channel, Delivery, SkipReason};

/// What a scripted send does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    /// Fail as if the remote answered with this HTTP status.
    Fail(u16),
    Skip(SkipReason),
    /// Wait this long, then succeed.
    Delay(Duration),
    /// Never complete.
    Stall,
}

/// Shared record of a scripted channel's activity.
#[derive(Debug, Default)]
pub struct ChannelProbe {
    sends: Mutex<Vec<(EntitySnapshot, EventType)>>,
    started: AtomicUsize,
    inits: Mutex<Vec<Vec<EntityId>>>,
    terminated: AtomicBool,
}

impl ChannelProbe {
    /// Alerts that completed `send_alert` (successfully or not).
    pub fn sends(&self) -> Vec<(EntitySnapshot, EventType)> {
        self.sends.lock().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().len()
    }

    /// Number of `send_alert` calls entered, including stalled ones.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn inits(&self) -> Vec<Vec<EntityId>> {
        self.inits.lock().clone()
    }

    pub fn terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// A channel whose behavior is set by the test.
pub struct ScriptedChannel {
    name: &'static str,
    behavior: Behavior,
    overrides: HashMap<EventType, Behavior>,
    warnings: Vec<String>,
    invalid: bool,
    failing_terminate: bool,
    probe: Arc<ChannelProbe>,
}

impl ScriptedChannel {
    pub fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            overrides: HashMap::new(),
            warnings: Vec::new(),
            invalid: false,
            failing_terminate: false,
            probe: Arc::new(ChannelProbe::default()),
        }
    }

    pub fn succeeding(name: &'static str) -> Self {
        Self::new(name, Behavior::Succeed)
    }

    pub fn failing(name: &'static str, status: u16) -> Self {
        Self::new(name, Behavior::Fail(status))
    }

    pub fn stalling(name: &'static str) -> Self {
        Self::new(name, Behavior::Stall)
    }

    /// Use `behavior` for `event` only.
    pub fn on(mut self, event: EventType, behavior: Behavior) -> Self {
        self.overrides.insert(event, behavior);
        self
    }

    pub fn with_warnings(mut self, warnings: &[&str]) -> Self {
        self.warnings = warnings.iter().map(|w| (*w).to_string()).collect();
        self
    }

    /// Make `validate` report a missing field.
    pub fn invalid(mut self) -> Self {
        self.invalid = true;
        self
    }

    pub fn failing_terminate(mut self) -> Self {
        self.failing_terminate = true;
        self
    }

    pub fn probe(&self) -> Arc<ChannelProbe> {
        Arc::clone(&self.probe)
    }

    pub fn boxed(self) -> Box<dyn Channel> {
        Box::new(self)
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self) -> Result<Vec<String>> {
        if self.invalid {
            return Err(ConfigError::MissingField {
                channel: self.name,
                scope: "global".into(),
                event: EventType::Live.to_string(),
                field: "Message Text",
            }
            .into());
        }
        Ok(self.warnings.clone())
    }

    fn init(&mut self, entities: &[EntityId]) -> Result<()> {
        self.probe.inits.lock().push(entities.to_vec());
        Ok(())
    }

    async fn send_alert(&self, entity: &EntitySnapshot, event: EventType) -> Result<Delivery> {
        self.probe.started.fetch_add(1, Ordering::SeqCst);
        let behavior = self.overrides.get(&event).copied().unwrap_or(self.behavior);

        let outcome = match behavior {
            Behavior::Succeed => Ok(Delivery::Sent),
            Behavior::Skip(reason) => Ok(Delivery::Skipped(reason)),
            Behavior::Fail(status) => Err(Error::from(TransportError::BadStatus {
                channel: self.name.to_string(),
                status,
                body: "scripted failure".into(),
            })),
            Behavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(Delivery::Sent)
            }
            Behavior::Stall => {
                std::future::pending::<()>().await;
                Ok(Delivery::Sent)
            }
        };

        self.probe.sends.lock().push((entity.clone(), event));
        outcome
    }

    async fn terminate(&self) -> Result<()> {
        self.probe.terminated.store(true, Ordering::SeqCst);
        if self.failing_terminate {
            return Err(Error::Task(format!("{} refused to terminate", self.name)));
        }
        Ok(())
    }
}
