//! Scriptable in-memory gateway for tests and local runs without a backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use chrono::Utc;
use parkwatch_shared::{
    BookingWithSpot, CouponRedemption, ExtensionOutcome, NewSecurityAlert, OverstaySweep, Profile,
    SecurityAlert, SensorReading, SpotRefresh, Transaction, UpcomingPreflight,
};

use crate::gateway::{AuthUser, RecordStore, RemoteProcedures};
use crate::validation::{CouponCode, ExtensionMinutes};
use crate::{CoreError, CoreResult};

/// What a mocked call does when invoked
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Reply(T),
    Fail(CoreError),
    /// Panics inside the call, as a buggy decoder would
    Panic(&'static str),
    /// Sleeps on the tokio clock, then replies
    Delayed(Duration, T),
}

impl<T: Clone> Scripted<T> {
    async fn play(self) -> CoreResult<T> {
        match self {
            Scripted::Reply(value) => Ok(value),
            Scripted::Fail(err) => Err(err),
            Scripted::Panic(msg) => panic!("{}", msg),
            Scripted::Delayed(wait, value) => {
                tokio::time::sleep(wait).await;
                Ok(value)
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for the backend that counts every call
pub struct MockGateway {
    calls: Mutex<HashMap<&'static str, usize>>,
    overstay: Mutex<Scripted<OverstaySweep>>,
    preflight: Mutex<Scripted<UpcomingPreflight>>,
    availability: Mutex<Scripted<SpotRefresh>>,
    redemption: Mutex<Scripted<CouponRedemption>>,
    extension: Mutex<Scripted<ExtensionOutcome>>,
    last_coupon: Mutex<Option<String>>,
    user: Mutex<Option<AuthUser>>,
    profile: Mutex<Option<Profile>>,
    bookings: Mutex<Vec<BookingWithSpot>>,
    transactions: Mutex<Vec<Transaction>>,
    alerts: Mutex<Vec<SecurityAlert>>,
    sensors: Mutex<Vec<SensorReading>>,
    failing_reads: Mutex<Vec<&'static str>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            overstay: Mutex::new(Scripted::Reply(OverstaySweep::default())),
            preflight: Mutex::new(Scripted::Reply(UpcomingPreflight::default())),
            availability: Mutex::new(Scripted::Reply(SpotRefresh::default())),
            redemption: Mutex::new(Scripted::Reply(CouponRedemption::default())),
            extension: Mutex::new(Scripted::Reply(ExtensionOutcome::default())),
            last_coupon: Mutex::new(None),
            user: Mutex::new(None),
            profile: Mutex::new(None),
            bookings: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            sensors: Mutex::new(Vec::new()),
            failing_reads: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `operation` (the procedure or table name) was called
    pub fn calls(&self, operation: &str) -> usize {
        lock(&self.calls).get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    pub fn script_overstay(&self, script: Scripted<OverstaySweep>) {
        *lock(&self.overstay) = script;
    }

    pub fn script_preflight(&self, script: Scripted<UpcomingPreflight>) {
        *lock(&self.preflight) = script;
    }

    pub fn script_availability(&self, script: Scripted<SpotRefresh>) {
        *lock(&self.availability) = script;
    }

    pub fn script_redemption(&self, script: Scripted<CouponRedemption>) {
        *lock(&self.redemption) = script;
    }

    pub fn script_extension(&self, script: Scripted<ExtensionOutcome>) {
        *lock(&self.extension) = script;
    }

    /// Coupon code as it reached the backend
    pub fn last_coupon(&self) -> Option<String> {
        lock(&self.last_coupon).clone()
    }

    pub fn sign_in(&self, user: AuthUser) {
        *lock(&self.user) = Some(user);
    }

    pub fn set_profile(&self, profile: Profile) {
        *lock(&self.profile) = Some(profile);
    }

    pub fn set_bookings(&self, bookings: Vec<BookingWithSpot>) {
        *lock(&self.bookings) = bookings;
    }

    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        *lock(&self.transactions) = transactions;
    }

    pub fn set_sensor_readings(&self, readings: Vec<SensorReading>) {
        *lock(&self.sensors) = readings;
    }

    /// Make reads of `table` fail with a remote error
    pub fn fail_reads_of(&self, table: &'static str) {
        lock(&self.failing_reads).push(table);
    }

    /// Alerts created so far, oldest first
    pub fn alerts(&self) -> Vec<SecurityAlert> {
        lock(&self.alerts).clone()
    }

    fn record(&self, operation: &'static str) {
        *lock(&self.calls).entry(operation).or_insert(0) += 1;
    }

    fn read(&self, table: &'static str) -> CoreResult<()> {
        self.record(table);
        if lock(&self.failing_reads).contains(&table) {
            return Err(CoreError::RemoteError(format!("{} unavailable", table)));
        }
        Ok(())
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteProcedures for MockGateway {
    async fn redeem_coupon(&self, _user_id: Uuid, code: &CouponCode) -> CoreResult<CouponRedemption> {
        self.record("redeem_coupon");
        *lock(&self.last_coupon) = Some(code.as_str().to_string());
        let script = lock(&self.redemption).clone();
        script.play().await
    }

    async fn extend_booking(
        &self,
        _booking_id: Uuid,
        _minutes: ExtensionMinutes,
    ) -> CoreResult<ExtensionOutcome> {
        self.record("extend_booking");
        let script = lock(&self.extension).clone();
        script.play().await
    }

    async fn check_upcoming_bookings_before_start(&self) -> CoreResult<UpcomingPreflight> {
        self.record("check_upcoming_bookings_before_start");
        let script = lock(&self.preflight).clone();
        script.play().await
    }

    async fn update_spot_availability_from_sensor(&self) -> CoreResult<SpotRefresh> {
        self.record("update_spot_availability_from_sensor");
        let script = lock(&self.availability).clone();
        script.play().await
    }

    async fn check_and_handle_overstay(&self) -> CoreResult<OverstaySweep> {
        self.record("check_and_handle_overstay");
        let script = lock(&self.overstay).clone();
        script.play().await
    }
}

#[async_trait]
impl RecordStore for MockGateway {
    async fn current_user(&self) -> CoreResult<Option<AuthUser>> {
        self.record("auth_user");
        Ok(lock(&self.user).clone())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> CoreResult<Profile> {
        self.read("profiles")?;
        lock(&self.profile)
            .clone()
            .filter(|profile| profile.id == user_id)
            .ok_or_else(|| CoreError::NotFound(format!("profile {}", user_id)))
    }

    async fn fetch_active_bookings(&self, user_id: Uuid) -> CoreResult<Vec<BookingWithSpot>> {
        self.read("bookings")?;
        let mut bookings: Vec<_> = lock(&self.bookings)
            .iter()
            .filter(|b| b.booking.user_id == user_id && !b.booking.is_completed)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.booking.start_time);
        Ok(bookings)
    }

    async fn fetch_transactions(&self, user_id: Uuid) -> CoreResult<Vec<Transaction>> {
        self.read("transaction_history")?;
        let mut transactions: Vec<_> = lock(&self.transactions)
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    async fn fetch_security_alerts(&self, user_id: Uuid) -> CoreResult<Vec<SecurityAlert>> {
        self.read("security_alerts")?;
        let mut alerts: Vec<_> = lock(&self.alerts)
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    async fn fetch_sensor_readings(&self, sensor_ids: &[String]) -> CoreResult<Vec<SensorReading>> {
        self.read("sensor_data")?;
        Ok(lock(&self.sensors)
            .iter()
            .filter(|r| sensor_ids.contains(&r.sensor_id))
            .cloned()
            .collect())
    }

    async fn fetch_booking_spot(&self, booking_id: Uuid) -> CoreResult<Uuid> {
        self.read("bookings")?;
        lock(&self.bookings)
            .iter()
            .find(|b| b.booking.id == booking_id)
            .map(|b| b.booking.spot_id)
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", booking_id)))
    }

    async fn create_security_alert(&self, alert: &NewSecurityAlert) -> CoreResult<SecurityAlert> {
        self.record("create_security_alert");
        let created = SecurityAlert {
            id: Uuid::new_v4(),
            user_id: alert.user_id,
            booking_id: Some(alert.booking_id),
            spot_id: Some(alert.spot_id),
            spot_number: alert.spot_number.clone(),
            location: alert.location.clone(),
            vehicle_number: alert.vehicle_number.clone(),
            screenshot_url: alert.screenshot_url.clone(),
            description: alert.description.clone(),
            status: alert.status,
            admin_notes: None,
            created_at: Utc::now(),
        };
        lock(&self.alerts).push(created.clone());
        Ok(created)
    }
}
