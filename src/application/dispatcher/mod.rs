//! Alert dispatcher.
//!
//! Accepts `(entity, event)` submissions from the polling path and fans
//! each one out to every registered channel on its own delivery unit. The
//! process lifecycle drives it:
//!
//! 1. [`register`](AlertDispatcher::register) the enabled channels
//! 2. [`prepare`](AlertDispatcher::prepare) them (validate, init, fire the
//!    ready barrier)
//! 3. [`start`](AlertDispatcher::start) with a runtime handle
//! 4. [`submit`](AlertDispatcher::submit) alerts and poll
//!    [`check_tasks`](AlertDispatcher::check_tasks) once per cycle
//! 5. [`stop`](AlertDispatcher::stop) during shutdown
//!
//! Submissions are accepted at any point before `stop`. Units submitted
//! before `start` wait in a backlog; units spawned before `prepare` wait on
//! the ready barrier.

mod task;


use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{EntityId, EntitySnapshot, EventType};
use crate::error::{ConfigError, DeliveryError, Result};
use crate::port::{Channel, EntityStore};

pub use task::{DeliveryReport, TaskState};
use task::{AlertTask, Backlogged, ChannelSet, Settled, StateCell};

/// What [`AlertDispatcher::stop`] found while draining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownSummary {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Failures reaped earlier but never returned by `check_tasks`.
    pub undrained: usize,
}

/// Fans alerts out to channels and tracks the resulting delivery units.
pub struct AlertDispatcher {
    entities: Arc<dyn EntityStore>,
    pending: Vec<Box<dyn Channel>>,
    ready: watch::Sender<Option<ChannelSet>>,
    runtime: Option<Handle>,
    backlog: Vec<Backlogged>,
    tasks: Vec<AlertTask>,
    failures: BTreeMap<u64, DeliveryError>,
    next_seq: u64,
    stopped: bool,
}

impl AlertDispatcher {
    /// Create a dispatcher reading entity attributes from `entities`.
    #[must_use]
    pub fn new(entities: Arc<dyn EntityStore>) -> Self {
        let (ready, _) = watch::channel(None);
        Self {
            entities,
            pending: Vec::new(),
            ready,
            runtime: None,
            backlog: Vec::new(),
            tasks: Vec::new(),
            failures: BTreeMap::new(),
            next_seq: 0,
            stopped: false,
        }
    }

    /// Add a channel. Only allowed before [`prepare`](Self::prepare).
    pub fn register(&mut self, channel: Box<dyn Channel>) -> Result<()> {
        if self.is_ready() {
            return Err(ConfigError::Other(format!(
                "cannot register channel '{}' after channels were prepared",
                channel.name()
            ))
            .into());
        }
        debug!(channel = channel.name(), "Channel registered");
        self.pending.push(channel);
        Ok(())
    }

    /// Names of the registered channels, in registration order.
    #[must_use]
    pub fn channel_names(&self) -> Vec<&'static str> {
        match self.ready.borrow().as_ref() {
            Some(set) => set.iter().map(|c| c.name()).collect(),
            None => self.pending.iter().map(|c| c.name()).collect(),
        }
    }

    /// Validate and initialize every channel, then release waiting units.
    ///
    /// Returns validation warnings. A configuration error aborts before any
    /// channel is initialized, and the barrier stays closed.
    pub fn prepare(&mut self, entities: &[EntityId]) -> Result<Vec<String>> {
        if self.is_ready() {
            return Err(ConfigError::Other("channels already prepared".into()).into());
        }

        let mut warnings = Vec::new();
        for channel in &self.pending {
            let found = channel.validate()?;
            for warning in &found {
                warn!(channel = channel.name(), "{warning}");
            }
            warnings.extend(found);
        }

        for channel in &mut self.pending {
            channel.init(entities)?;
        }

        let sealed: ChannelSet = mem::take(&mut self.pending)
            .into_iter()
            .map(Arc::from)
            .collect();
        info!(
            channels = sealed.len(),
            entities = entities.len(),
            "Channels ready"
        );
        self.ready.send_replace(Some(sealed));
        Ok(warnings)
    }

    /// Whether the ready barrier has fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.borrow().is_some()
    }

    /// Begin scheduling delivery units on `runtime`, releasing the backlog.
    pub fn start(&mut self, runtime: Handle) {
        if self.stopped {
            warn!("Dispatcher already stopped, ignoring start");
            return;
        }
        let backlog = mem::take(&mut self.backlog);
        if !backlog.is_empty() {
            debug!(count = backlog.len(), "Releasing backlogged alerts");
        }
        for unit in backlog {
            self.tasks.push(unit.spawn(&runtime, self.ready.subscribe()));
        }
        self.runtime = Some(runtime);
    }

    /// Queue an alert for delivery. Never blocks.
    pub fn submit(&mut self, entity: EntityId, event: EventType) {
        if self.stopped {
            warn!(%entity, %event, "Dispatcher stopped, dropping alert");
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let snapshot = self
            .entities
            .snapshot(&entity)
            .unwrap_or_else(|| EntitySnapshot::unknown(entity));
        debug!(entity = %snapshot.id, %event, seq, "Alert submitted");

        let unit = Backlogged {
            seq,
            snapshot,
            event,
            state: StateCell::new(),
        };
        match &self.runtime {
            Some(runtime) => self.tasks.push(unit.spawn(runtime, self.ready.subscribe())),
            None => self.backlog.push(unit),
        }
    }

    /// Reap finished units and surface at most one failure.
    ///
    /// Never awaits. Failures are queued by submission order; each call
    /// returns the oldest one still queued.
    pub fn check_tasks(&mut self) -> std::result::Result<(), DeliveryError> {
        let mut running = Vec::with_capacity(self.tasks.len());
        for mut task in mem::take(&mut self.tasks) {
            if !task.handle.is_finished() {
                running.push(task);
                continue;
            }
            let Some(joined) = (&mut task.handle).now_or_never() else {
                running.push(task);
                continue;
            };
            match task.settle(joined) {
                Settled::Delivered(report) => {
                    debug!(entity = %report.entity, event = %report.event, sent = report.sent(), "Task reaped");
                }
                Settled::Failed(err) => {
                    self.failures.insert(task.seq, err);
                }
                Settled::Cancelled => {}
            }
        }
        self.tasks = running;

        match self.failures.pop_first() {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }

    /// Wait for every scheduled unit to finish without cancelling any.
    ///
    /// Failures join the queue drained by [`check_tasks`](Self::check_tasks).
    /// Units still waiting on the ready barrier keep this pending until
    /// [`prepare`](Self::prepare) runs.
    pub async fn flush(&mut self) -> Vec<DeliveryReport> {
        let tasks = mem::take(&mut self.tasks);
        let settled = join_all(tasks.into_iter().map(|mut task| async move {
            let joined = (&mut task.handle).await;
            let settled = task.settle(joined);
            (task.seq, settled)
        }))
        .await;

        let mut reports = Vec::new();
        for (seq, outcome) in settled {
            match outcome {
                Settled::Delivered(report) => reports.push(report),
                Settled::Failed(err) => {
                    self.failures.insert(seq, err);
                }
                Settled::Cancelled => {}
            }
        }
        reports
    }

    /// Cancel outstanding units, wait for all of them, then terminate the
    /// channels. Safe to call more than once; later calls do nothing.
    pub async fn stop(&mut self) -> ShutdownSummary {
        let mut summary = ShutdownSummary::default();
        if self.stopped {
            return summary;
        }
        self.stopped = true;

        for unit in mem::take(&mut self.backlog) {
            unit.state.advance(TaskState::Cancelled);
            summary.cancelled += 1;
        }

        let tasks = mem::take(&mut self.tasks);
        let aborted = tasks.iter().filter(|t| !t.handle.is_finished()).count();
        for task in &tasks {
            task.handle.abort();
        }
        info!(tasks = tasks.len(), aborted, "Stopping dispatcher");

        let settled = join_all(tasks.into_iter().map(|mut task| async move {
            let joined = (&mut task.handle).await;
            task.settle(joined)
        }))
        .await;
        for outcome in settled {
            match outcome {
                Settled::Delivered(_) => summary.completed += 1,
                Settled::Cancelled => summary.cancelled += 1,
                Settled::Failed(err) => {
                    warn!(error = %err, "Delivery failed during shutdown");
                    summary.failed += 1;
                }
            }
        }

        for (_, err) in mem::take(&mut self.failures) {
            warn!(error = %err, "Undrained delivery failure at shutdown");
            summary.undrained += 1;
        }

        let sealed = self.ready.borrow().clone();
        let mut channels: Vec<Arc<dyn Channel>> = sealed.map(|set| set.to_vec()).unwrap_or_default();
        channels.extend(mem::take(&mut self.pending).into_iter().map(Arc::from));

        let terminated = join_all(channels.iter().map(|channel| async move {
            (channel.name(), channel.terminate().await)
        }))
        .await;
        for (channel, result) in terminated {
            if let Err(err) = result {
                warn!(channel, error = %err, "Channel failed to terminate");
            }
        }
        info!(
            completed = summary.completed,
            failed = summary.failed,
            cancelled = summary.cancelled,
            undrained = summary.undrained,
            "Dispatcher stopped"
        );
        summary
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Units not yet reaped, including backlogged ones.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.backlog.len() + self.tasks.len()
    }

    /// State of every outstanding unit, in submission order.
    #[must_use]
    pub fn task_states(&self) -> Vec<TaskState> {
        let mut states: Vec<(u64, TaskState)> = self
            .backlog
            .iter()
            .map(|u| (u.seq, u.state.get()))
            .chain(self.tasks.iter().map(|t| (t.seq, t.state.get())))
            .collect();
        states.sort_by_key(|(seq, _)| *seq);
        states.into_iter().map(|(_, state)| state).collect()
    }

    /// Failures reaped but not yet returned by `check_tasks`.
    #[must_use]
    pub fn queued_failures(&self) -> usize {
        self.failures.len()
    }

    /// No unit is backlogged or still running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.backlog.is_empty() && self.tasks.iter().all(|t| t.handle.is_finished())
    }
}

impl Drop for AlertDispatcher {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.handle.abort();
        }
    }
}
