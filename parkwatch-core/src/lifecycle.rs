//! Lifecycle classification of bookings.
//!
//! The stage is derived from the booking window and the current instant on
//! every call and is never written back, so it cannot go stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parkwatch_shared::Booking;

use crate::cost::{CostEstimator, PenaltyPreview};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    /// Before the start time
    Upcoming,
    /// Inside the booked window, both ends inclusive
    Ongoing,
    /// Past the end time and not yet completed
    Overstaying,
}

impl LifecycleStage {
    pub fn has_started(&self) -> bool {
        !matches!(self, LifecycleStage::Upcoming)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleStage::Upcoming => "Upcoming",
            LifecycleStage::Ongoing => "Active",
            LifecycleStage::Overstaying => "Overstaying",
        }
    }
}

/// Classify a booking window at `now`.
///
/// An unknown end time never counts as overstaying.
pub fn classify(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> LifecycleStage {
    if now < start {
        return LifecycleStage::Upcoming;
    }
    match end {
        Some(end) if now > end => LifecycleStage::Overstaying,
        _ => LifecycleStage::Ongoing,
    }
}

/// Everything the dashboard derives from one booking at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookingStatus {
    pub stage: LifecycleStage,
    pub overstay_minutes: i64,
    pub penalty: Option<PenaltyPreview>,
    /// Live camera feed is offered once the booking has started
    pub live_feed_available: bool,
    /// Extension is offered once the booking has started
    pub can_extend: bool,
}

/// Maps bookings to lifecycle stages and derived figures
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingClassifier {
    estimator: CostEstimator,
}

impl BookingClassifier {
    pub fn new(estimator: CostEstimator) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &CostEstimator {
        &self.estimator
    }

    /// Like [`classify`], except a completed booking past its end time is `Ongoing`.
    pub fn stage(&self, booking: &Booking, now: DateTime<Utc>) -> LifecycleStage {
        match classify(booking.start_time, booking.end_time, now) {
            // A completed booking is settled even if it ran late
            LifecycleStage::Overstaying if booking.is_completed => LifecycleStage::Ongoing,
            stage => stage,
        }
    }

    pub fn status(&self, booking: &Booking, now: DateTime<Utc>) -> BookingStatus {
        let stage = self.stage(booking, now);
        let (overstay_minutes, penalty) = if stage == LifecycleStage::Overstaying {
            (
                self.estimator.overstay_minutes(booking.end_time, now),
                self.estimator.penalty_preview(booking.end_time, now),
            )
        } else {
            (0, None)
        };

        BookingStatus {
            stage,
            overstay_minutes,
            penalty,
            live_feed_available: stage.has_started(),
            can_extend: stage.has_started(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn booking(end: Option<DateTime<Utc>>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            spot_id: Uuid::new_v4(),
            vehicle_number: "KA01AB1234".to_string(),
            start_time: t(),
            end_time: end,
            total_cost: 40.0,
            is_completed: false,
        }
    }

    #[test]
    fn test_boundaries() {
        let end = Some(t() + Duration::hours(1));

        assert_eq!(classify(t(), end, t() - Duration::seconds(1)), LifecycleStage::Upcoming);
        assert_eq!(classify(t(), end, t()), LifecycleStage::Ongoing);
        assert_eq!(classify(t(), end, t() + Duration::hours(1)), LifecycleStage::Ongoing);
        assert_eq!(
            classify(t(), end, t() + Duration::hours(1) + Duration::seconds(1)),
            LifecycleStage::Overstaying
        );
    }

    #[test]
    fn test_classification_is_total_and_stable() {
        let end = Some(t() + Duration::minutes(30));
        for offset in -120..=120 {
            let now = t() + Duration::minutes(offset);
            let first = classify(t(), end, now);
            assert_eq!(first, classify(t(), end, now));

            let expected = if offset < 0 {
                LifecycleStage::Upcoming
            } else if offset > 30 {
                LifecycleStage::Overstaying
            } else {
                LifecycleStage::Ongoing
            };
            assert_eq!(first, expected, "offset {offset}");
        }
    }

    #[test]
    fn test_missing_end_time_is_ongoing() {
        let b = booking(None);
        let classifier = BookingClassifier::default();
        let status = classifier.status(&b, t() + Duration::days(3));
        assert_eq!(status.stage, LifecycleStage::Ongoing);
        assert_eq!(status.overstay_minutes, 0);
        assert!(status.penalty.is_none());

        assert_eq!(
            classifier.stage(&b, t() - Duration::minutes(5)),
            LifecycleStage::Upcoming
        );
    }

    #[test]
    fn test_overstay_scenario() {
        let b = booking(Some(t() + Duration::seconds(3600)));
        let status = BookingClassifier::default().status(&b, t() + Duration::seconds(3700));

        assert_eq!(status.stage, LifecycleStage::Overstaying);
        assert_eq!(status.overstay_minutes, 1);
        assert!(status.live_feed_available);
        assert!(status.can_extend);
    }

    #[test]
    fn test_completed_booking_never_overstays() {
        let mut b = booking(Some(t() + Duration::hours(1)));
        b.is_completed = true;
        let late = t() + Duration::hours(5);
        assert_eq!(classify(b.start_time, b.end_time, late), LifecycleStage::Overstaying);
        let status = BookingClassifier::default().status(&b, late);
        assert_eq!(status.stage, LifecycleStage::Ongoing);
        assert_eq!(status.overstay_minutes, 0);
    }

    #[test]
    fn test_upcoming_offers_no_actions() {
        let b = booking(Some(t() + Duration::hours(1)));
        let status = BookingClassifier::default().status(&b, t() - Duration::minutes(10));
        assert!(!status.live_feed_available);
        assert!(!status.can_extend);
    }
}
