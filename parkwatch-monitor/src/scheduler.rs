//! Periodic driver for the reconciliation cycle.
//!
//! `Stopped -> Running -> Stopped`. Starting runs a cycle immediately and then
//! once per period. Cycles never overlap: the timer task awaits each cycle
//! before waiting for the next tick, and the cycle itself admits one run at
//! a time, so a restart or a manual check never overlaps a running cycle.
//! Stopping cancels the timer only; a cycle that is already running is
//! allowed to finish.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use parkwatch_core::{Capabilities, Clock, RemoteProcedures};

use crate::cycle::ReconciliationCycle;
use crate::report::CycleReport;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub period: Duration,
    pub capabilities: Capabilities,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            capabilities: Capabilities::default(),
        }
    }
}

struct Inner {
    state: MonitorState,
    cancel: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

pub struct MonitorScheduler {
    cycle: Arc<ReconciliationCycle>,
    period: Duration,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for MonitorScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorScheduler")
            .field("period", &self.period)
            .field("state", &self.state())
            .finish()
    }
}

impl MonitorScheduler {
    pub fn new(
        procedures: Arc<dyn RemoteProcedures>,
        clock: Arc<dyn Clock>,
        settings: MonitorSettings,
    ) -> Self {
        let period = if settings.period.is_zero() {
            DEFAULT_PERIOD
        } else {
            settings.period
        };

        Self {
            cycle: Arc::new(ReconciliationCycle::new(
                procedures,
                clock,
                settings.capabilities,
            )),
            period,
            inner: Mutex::new(Inner {
                state: MonitorState::Stopped,
                cancel: None,
                task: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> MonitorState {
        self.lock().state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Begin periodic reconciliation. No-op while already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut inner = self.lock();
        if inner.state == MonitorState::Running {
            debug!("Monitor already running, ignoring start");
            return;
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let cycle = Arc::clone(&self.cycle);
        let period = self.period;
        let task = tokio::spawn(run_loop(cycle, period, cancel_rx));

        inner.state = MonitorState::Running;
        inner.cancel = Some(cancel_tx);
        inner.task = Some(task);

        info!("Booking monitor started (period={}s)", period.as_secs());
    }

    /// Cancel the timer. A cycle already in flight runs to completion.
    pub fn stop(&self) {
        self.halt();
    }

    /// Like [`stop`](Self::stop), but waits for an in-flight cycle to finish.
    /// Also waits when the monitor was already stopped by [`stop`](Self::stop).
    pub async fn shutdown(&self) {
        self.halt();
        let task = self.lock().task.take();
        if let Some(task) = task {
            let _ = task.await;
        }
        self.cycle.wait_idle().await;
    }

    fn halt(&self) {
        let mut inner = self.lock();
        if inner.state == MonitorState::Stopped {
            return;
        }

        if let Some(cancel) = inner.cancel.take() {
            let _ = cancel.send(true);
        }
        inner.state = MonitorState::Stopped;
        info!("Booking monitor stopped");
    }

    /// Run one cycle now, independent of the timer. Waits for a timer cycle
    /// already in flight.
    pub async fn manual_check(&self) -> CycleReport {
        info!("Manual reconciliation requested");
        self.cycle.run().await
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycle.cycles_started()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycle.cycles_completed()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<CycleReport>> {
        self.cycle.subscribe()
    }
}

impl Drop for MonitorScheduler {
    fn drop(&mut self) {
        if let Some(cancel) = self.lock().cancel.take() {
            let _ = cancel.send(true);
        }
    }
}

async fn run_loop(
    cycle: Arc<ReconciliationCycle>,
    period: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(period);
    // A slow cycle pushes the schedule back instead of triggering a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }
        cycle.run().await;
    }

    debug!("Monitor timer task exited");
}
