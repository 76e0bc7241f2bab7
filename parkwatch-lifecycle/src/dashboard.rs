//! Assembles everything the dashboard page shows for the signed-in user.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use parkwatch_core::{
    AuthUser, BookingClassifier, BookingStatus, Clock, CoreError, CoreResult, LifecycleStage,
    RecordStore,
};
use parkwatch_shared::{BookingWithSpot, Profile, SecurityAlert, SensorReading, Transaction};

/// One booking as rendered, classified at the snapshot instant
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCard {
    pub booking: BookingWithSpot,
    pub status: BookingStatus,
    pub sensor: Option<SensorReading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub user: AuthUser,
    pub profile: Profile,
    pub taken_at: DateTime<Utc>,
    /// Newest first
    pub transactions: Vec<Transaction>,
    /// Started bookings, overstaying ones included
    pub ongoing: Vec<BookingCard>,
    pub upcoming: Vec<BookingCard>,
    /// Newest first
    pub alerts: Vec<SecurityAlert>,
}

impl DashboardSnapshot {
    pub fn overstaying(&self) -> impl Iterator<Item = &BookingCard> {
        self.ongoing
            .iter()
            .filter(|card| card.status.stage == LifecycleStage::Overstaying)
    }
}

pub struct DashboardLoader {
    records: Arc<dyn RecordStore>,
    classifier: BookingClassifier,
    clock: Arc<dyn Clock>,
}

impl DashboardLoader {
    pub fn new(
        records: Arc<dyn RecordStore>,
        classifier: BookingClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            classifier,
            clock,
        }
    }

    /// Fails only without a session or without a profile. Every other read
    /// degrades to an empty list.
    pub async fn load(&self) -> CoreResult<DashboardSnapshot> {
        let user = self.records.current_user().await?.ok_or_else(|| {
            CoreError::AuthenticationError("No active session".to_string())
        })?;

        let profile = self.records.fetch_profile(user.id).await.map_err(|e| {
            error!("Failed to load profile for {}: {}", user.id, e);
            e
        })?;

        let transactions = or_empty("transactions", self.records.fetch_transactions(user.id)).await;
        let bookings = or_empty("bookings", self.records.fetch_active_bookings(user.id)).await;

        let sensor_ids: Vec<String> = bookings
            .iter()
            .filter_map(|b| b.spot.sensor_id.clone())
            .filter(|id| !id.is_empty())
            .collect();
        let readings = if sensor_ids.is_empty() {
            Vec::new()
        } else {
            or_empty("sensor readings", self.records.fetch_sensor_readings(&sensor_ids)).await
        };

        let alerts = or_empty("security alerts", self.records.fetch_security_alerts(user.id)).await;

        let taken_at = self.clock.now();
        let (ongoing, upcoming) = self.split(bookings, readings, taken_at);
        debug!(
            "Dashboard for {}: {} ongoing, {} upcoming, {} alert(s)",
            user.id,
            ongoing.len(),
            upcoming.len(),
            alerts.len()
        );

        Ok(DashboardSnapshot {
            user,
            profile,
            taken_at,
            transactions,
            ongoing,
            upcoming,
            alerts,
        })
    }

    fn split(
        &self,
        bookings: Vec<BookingWithSpot>,
        readings: Vec<SensorReading>,
        now: DateTime<Utc>,
    ) -> (Vec<BookingCard>, Vec<BookingCard>) {
        let by_sensor: HashMap<String, SensorReading> = readings
            .into_iter()
            .map(|r| (r.sensor_id.clone(), r))
            .collect();

        let mut ongoing = Vec::new();
        let mut upcoming = Vec::new();
        for booking in bookings {
            let status = self.classifier.status(&booking.booking, now);
            let sensor = booking
                .spot
                .sensor_id
                .as_ref()
                .and_then(|id| by_sensor.get(id))
                .cloned();
            let card = BookingCard {
                booking,
                status,
                sensor,
            };
            if status.stage.has_started() {
                ongoing.push(card);
            } else {
                upcoming.push(card);
            }
        }
        (ongoing, upcoming)
    }
}

async fn or_empty<T, F>(what: &str, fetch: F) -> Vec<T>
where
    F: Future<Output = CoreResult<Vec<T>>>,
{
    match fetch.await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to load {}: {}", what, e);
            Vec::new()
        }
    }
}
