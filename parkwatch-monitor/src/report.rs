use chrono::{DateTime, Utc};
use serde::Serialize;

use parkwatch_shared::{OverstaySweep, SpotRefresh, UpcomingPreflight};

/// Result of a single pass within a cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum PassOutcome<T> {
    Completed(T),
    /// Not attempted; carries the reason
    Skipped(&'static str),
    /// Error or panic, already logged
    Failed(String),
}

impl<T> PassOutcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            PassOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PassOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PassOutcome::Skipped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub overstay: PassOutcome<OverstaySweep>,
    pub preflight: PassOutcome<UpcomingPreflight>,
    pub availability: PassOutcome<SpotRefresh>,
}

impl CycleReport {
    pub fn failed_passes(&self) -> usize {
        [
            self.overstay.is_failed(),
            self.preflight.is_failed(),
            self.availability.is_failed(),
        ]
        .iter()
        .filter(|failed| **failed)
        .count()
    }
}
