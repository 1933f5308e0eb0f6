//! Delivery units and their lifecycle state.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::{ChannelFailure, DeliveryError, Error};
use crate::port::{Channel, Delivery};

/// The sealed set of channels every delivery unit fans out to.
pub(crate) type ChannelSet = Arc<[Arc<dyn Channel>]>;

/// Channel label used when a unit fails outside any channel.
const DISPATCHER_LABEL: &str = "dispatcher";

/// Lifecycle of one delivery unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskState {
    Pending = 0,
    Running = 1,
    Completed = 2,
    Failed = 3,
    Cancelled = 4,
}

impl TaskState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Failed,
            _ => Self::Cancelled,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Shared, lock-free holder of a unit's [`TaskState`].
///
/// Written by the unit itself while it runs and by the dispatcher when it
/// reaps or cancels. Terminal states are final.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(TaskState::Pending as u8)))
    }

    pub(crate) fn get(&self) -> TaskState {
        TaskState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next`. Returns false if the transition is not allowed.
    pub(crate) fn advance(&self, next: TaskState) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                let current = TaskState::from_u8(raw);
                let allowed = match next {
                    TaskState::Pending => false,
                    TaskState::Running => current == TaskState::Pending,
                    _ => !current.is_terminal(),
                };
                allowed.then_some(next as u8)
            })
            .is_ok()
    }
}

/// Per-channel outcomes of a delivery unit that finished without errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub entity: EntityId,
    pub event: EventType,
    pub outcomes: Vec<(&'static str, Delivery)>,
}

impl DeliveryReport {
    /// Number of channels that actually sent the alert.
    #[must_use]
    pub fn sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, delivery)| *delivery == Delivery::Sent)
            .count()
    }
}

/// A submitted alert whose unit has not been scheduled yet.
pub(crate) struct Backlogged {
    pub(crate) seq: u64,
    pub(crate) snapshot: EntitySnapshot,
    pub(crate) event: EventType,
    pub(crate) state: Arc<StateCell>,
}

/// A scheduled delivery unit.
pub(crate) struct AlertTask {
    pub(crate) seq: u64,
    pub(crate) entity: EntityId,
    pub(crate) event: EventType,
    pub(crate) state: Arc<StateCell>,
    pub(crate) handle: JoinHandle<Result<DeliveryReport, DeliveryError>>,
}

/// How a unit ended, once its handle has been joined.
pub(crate) enum Settled {
    Delivered(DeliveryReport),
    Failed(DeliveryError),
    Cancelled,
}

impl Backlogged {
    /// Spawn the unit on `runtime`.
    pub(crate) fn spawn(
        self,
        runtime: &tokio::runtime::Handle,
        ready: watch::Receiver<Option<ChannelSet>>,
    ) -> AlertTask {
        let Self {
            seq,
            snapshot,
            event,
            state,
        } = self;
        let entity = snapshot.id.clone();
        let handle = runtime.spawn(deliver(ready, snapshot, event, Arc::clone(&state)));
        AlertTask {
            seq,
            entity,
            event,
            state,
            handle,
        }
    }
}

impl AlertTask {
    /// Classify a joined result and record the final state.
    pub(crate) fn settle(
        &self,
        joined: Result<Result<DeliveryReport, DeliveryError>, JoinError>,
    ) -> Settled {
        match joined {
            Ok(Ok(report)) => {
                self.state.advance(TaskState::Completed);
                Settled::Delivered(report)
            }
            Ok(Err(err)) => {
                self.state.advance(TaskState::Failed);
                Settled::Failed(err)
            }
            Err(err) if err.is_cancelled() => {
                self.state.advance(TaskState::Cancelled);
                Settled::Cancelled
            }
            Err(err) => {
                self.state.advance(TaskState::Failed);
                warn!(entity = %self.entity, event = %self.event, "Delivery unit panicked");
                Settled::Failed(DeliveryError {
                    entity: self.entity.clone(),
                    event: self.event,
                    failures: vec![ChannelFailure {
                        channel: DISPATCHER_LABEL.to_string(),
                        error: Error::Task(err.to_string()),
                    }],
                })
            }
        }
    }
}

/// Body of a delivery unit: wait for the channels, then fan out.
async fn deliver(
    mut ready: watch::Receiver<Option<ChannelSet>>,
    snapshot: EntitySnapshot,
    event: EventType,
    state: Arc<StateCell>,
) -> Result<DeliveryReport, DeliveryError> {
    let channels = {
        let sealed = ready.wait_for(Option::is_some).await;
        sealed.ok().and_then(|set| set.clone())
    };

    let Some(channels) = channels else {
        return Err(DeliveryError {
            entity: snapshot.id,
            event,
            failures: vec![ChannelFailure {
                channel: DISPATCHER_LABEL.to_string(),
                error: Error::Task("dispatcher dropped before channels were ready".into()),
            }],
        });
    };

    state.advance(TaskState::Running);

    let results = join_all(channels.iter().map(|channel| {
        let snapshot = &snapshot;
        async move { (channel.name(), channel.send_alert(snapshot, event).await) }
    }))
    .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (channel, result) in results {
        match result {
            Ok(delivery) => {
                if let Delivery::Skipped(reason) = delivery {
                    debug!(channel, entity = %snapshot.id, %event, ?reason, "Alert skipped");
                } else {
                    debug!(channel, entity = %snapshot.id, %event, "Alert sent");
                }
                outcomes.push((channel, delivery));
            }
            Err(error) => failures.push(ChannelFailure {
                channel: channel.to_string(),
                error,
            }),
        }
    }

    if failures.is_empty() {
        state.advance(TaskState::Completed);
        Ok(DeliveryReport {
            entity: snapshot.id,
            event,
            outcomes,
        })
    } else {
        state.advance(TaskState::Failed);
        Err(DeliveryError {
            entity: snapshot.id,
            event,
            failures,
        })
    }
}
