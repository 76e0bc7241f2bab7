//! One reconciliation cycle: overstay sweep, upcoming preflight, then spot
//! availability, in that order. A failing pass never prevents the next one.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use parkwatch_core::{Capabilities, Clock, CoreResult, RemoteProcedures};

use crate::report::{CycleReport, PassOutcome};

pub struct ReconciliationCycle {
    procedures: Arc<dyn RemoteProcedures>,
    capabilities: Capabilities,
    clock: Arc<dyn Clock>,
    started: AtomicU64,
    completed: AtomicU64,
    reports: watch::Sender<Option<CycleReport>>,
    // Held for a whole cycle; callers queue behind a cycle in flight
    turn: Mutex<()>,
}

impl std::fmt::Debug for ReconciliationCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationCycle")
            .field("capabilities", &self.capabilities)
            .field("started", &self.cycles_started())
            .field("completed", &self.cycles_completed())
            .finish()
    }
}

impl ReconciliationCycle {
    pub fn new(
        procedures: Arc<dyn RemoteProcedures>,
        clock: Arc<dyn Clock>,
        capabilities: Capabilities,
    ) -> Self {
        let (reports, _) = watch::channel(None);
        Self {
            procedures,
            capabilities,
            clock,
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            reports,
            turn: Mutex::new(()),
        }
    }

    pub fn cycles_started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    pub fn cycles_completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Latest report, `None` until the first cycle finishes
    pub fn subscribe(&self) -> watch::Receiver<Option<CycleReport>> {
        self.reports.subscribe()
    }

    /// Resolves once no cycle is running
    pub async fn wait_idle(&self) {
        drop(self.turn.lock().await);
    }

    pub async fn run(&self) -> CycleReport {
        let _turn = self.turn.lock().await;
        let cycle_no = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = self.clock.now();
        debug!("Reconciliation cycle #{} started", cycle_no);

        let overstay = if self.capabilities.overstay_sweep {
            isolate("overstay", self.procedures.check_and_handle_overstay()).await
        } else {
            PassOutcome::Skipped("overstay sweep capability disabled")
        };
        if let Some(sweep) = overstay.completed() {
            if sweep.overstays_detected > 0 {
                info!("Overstay sweep flagged {} booking(s)", sweep.overstays_detected);
            }
        }

        let preflight = isolate(
            "preflight",
            self.procedures.check_upcoming_bookings_before_start(),
        )
        .await;
        if let Some(result) = preflight.completed() {
            if result.reassigned > 0 || result.cancelled > 0 {
                info!(
                    "Upcoming preflight: {} reassigned, {} cancelled and refunded",
                    result.reassigned, result.cancelled
                );
            } else {
                debug!("Upcoming preflight: nothing to do");
            }
        }

        let availability = isolate(
            "availability",
            self.procedures.update_spot_availability_from_sensor(),
        )
        .await;
        if let Some(result) = availability.completed() {
            if result.spots_updated > 0 {
                info!("Spot availability: {} spot(s) updated", result.spots_updated);
            } else {
                debug!("Spot availability unchanged");
            }
        }

        let report = CycleReport {
            started_at,
            overstay,
            preflight,
            availability,
        };

        self.completed.fetch_add(1, Ordering::SeqCst);
        if report.failed_passes() > 0 {
            warn!(
                "Reconciliation cycle #{} finished with {} failed pass(es)",
                cycle_no,
                report.failed_passes()
            );
        } else {
            debug!("Reconciliation cycle #{} finished", cycle_no);
        }

        self.reports.send_replace(Some(report.clone()));
        report
    }
}

/// Runs one pass, turning errors and panics into a `Failed` outcome
async fn isolate<T, F>(pass: &'static str, call: F) -> PassOutcome<T>
where
    F: Future<Output = CoreResult<T>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => PassOutcome::Completed(value),
        Ok(Err(e)) => {
            warn!("{} pass failed: {}", pass, e);
            PassOutcome::Failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{} pass panicked: {}", pass, message);
            PassOutcome::Failed(format!("panicked: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
