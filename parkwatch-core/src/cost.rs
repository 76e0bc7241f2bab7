//! Overstay accrual figures for display.
//!
//! The backend computes and applies the real charge; nothing here touches a
//! balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Penalty per interval shown to the user, in currency units
pub const DEFAULT_OVERSTAY_RATE: f64 = 1.5;

/// Length of one penalty interval in minutes
pub const DEFAULT_INTERVAL_MINUTES: u32 = 1;

/// Whole minutes elapsed past `end`; zero when not past it or `end` is unknown.
pub fn overstay_minutes(end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match end {
        Some(end) if now > end => (now - end).num_minutes().max(0),
        _ => 0,
    }
}

/// Informational overstay figures for one booking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyPreview {
    pub overstay_minutes: i64,
    pub rate_per_interval: f64,
    pub interval_minutes: u32,
    /// Estimate only
    pub estimated_penalty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimator {
    pub rate_per_interval: f64,
    pub interval_minutes: u32,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self {
            rate_per_interval: DEFAULT_OVERSTAY_RATE,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl CostEstimator {
    pub fn new(rate_per_interval: f64, interval_minutes: u32) -> Self {
        Self {
            rate_per_interval,
            interval_minutes: interval_minutes.max(1),
        }
    }

    pub fn overstay_minutes(&self, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
        overstay_minutes(end, now)
    }

    /// `None` unless the booking is past its end time by at least a minute
    pub fn penalty_preview(
        &self,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<PenaltyPreview> {
        let minutes = overstay_minutes(end, now);
        if minutes == 0 {
            return None;
        }

        let intervals = minutes / i64::from(self.interval_minutes.max(1));
        Some(PenaltyPreview {
            overstay_minutes: minutes,
            rate_per_interval: self.rate_per_interval,
            interval_minutes: self.interval_minutes,
            estimated_penalty: intervals as f64 * self.rate_per_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_overstay_floor() {
        let end = Some(t0());
        assert_eq!(overstay_minutes(end, t0()), 0);
        assert_eq!(overstay_minutes(end, t0() + Duration::seconds(59)), 0);
        assert_eq!(overstay_minutes(end, t0() + Duration::seconds(60)), 1);
        assert_eq!(overstay_minutes(end, t0() + Duration::seconds(179)), 2);
        assert_eq!(overstay_minutes(end, t0() - Duration::hours(1)), 0);
        assert_eq!(overstay_minutes(None, t0()), 0);
    }

    #[test]
    fn test_penalty_preview() {
        let estimator = CostEstimator::default();
        assert!(estimator.penalty_preview(Some(t0()), t0()).is_none());

        let preview = estimator
            .penalty_preview(Some(t0()), t0() + Duration::minutes(4))
            .unwrap();
        assert_eq!(preview.overstay_minutes, 4);
        assert!((preview.estimated_penalty - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_penalty_preview_with_longer_interval() {
        let estimator = CostEstimator::new(10.0, 15);
        let preview = estimator
            .penalty_preview(Some(t0()), t0() + Duration::minutes(31))
            .unwrap();
        assert!((preview.estimated_penalty - 20.0).abs() < f64::EPSILON);
    }
}
