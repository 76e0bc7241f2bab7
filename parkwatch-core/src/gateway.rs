use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parkwatch_shared::{
    BookingWithSpot, CouponRedemption, ExtensionOutcome, NewSecurityAlert, OverstaySweep, Profile,
    SecurityAlert, SensorReading, SpotRefresh, Transaction, UpcomingPreflight,
};

use crate::validation::{CouponCode, ExtensionMinutes};
use crate::CoreResult;

/// Named backend procedures. Each call is applied atomically server-side.
#[async_trait]
pub trait RemoteProcedures: Send + Sync {
    async fn redeem_coupon(&self, user_id: Uuid, code: &CouponCode) -> CoreResult<CouponRedemption>;

    async fn extend_booking(
        &self,
        booking_id: Uuid,
        minutes: ExtensionMinutes,
    ) -> CoreResult<ExtensionOutcome>;

    /// Reassign or cancel-and-refund bookings about to start. Horizon is fixed server-side.
    async fn check_upcoming_bookings_before_start(&self) -> CoreResult<UpcomingPreflight>;

    async fn update_spot_availability_from_sensor(&self) -> CoreResult<SpotRefresh>;

    async fn check_and_handle_overstay(&self) -> CoreResult<OverstaySweep>;
}

/// The signed-in user of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Record reads and writes, scoped to the session's user
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when there is no valid session
    async fn current_user(&self) -> CoreResult<Option<AuthUser>>;

    async fn fetch_profile(&self, user_id: Uuid) -> CoreResult<Profile>;

    /// Bookings not yet completed, ordered by start time
    async fn fetch_active_bookings(&self, user_id: Uuid) -> CoreResult<Vec<BookingWithSpot>>;

    /// Newest first
    async fn fetch_transactions(&self, user_id: Uuid) -> CoreResult<Vec<Transaction>>;

    /// Newest first
    async fn fetch_security_alerts(&self, user_id: Uuid) -> CoreResult<Vec<SecurityAlert>>;

    async fn fetch_sensor_readings(&self, sensor_ids: &[String]) -> CoreResult<Vec<SensorReading>>;

    /// Spot the booking is assigned to
    async fn fetch_booking_spot(&self, booking_id: Uuid) -> CoreResult<Uuid>;

    async fn create_security_alert(&self, alert: &NewSecurityAlert) -> CoreResult<SecurityAlert>;
}

/// Backend features that may not be deployed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// `check_and_handle_overstay` is available
    pub overstay_sweep: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        // The overstay procedure has not shipped server-side yet
        Self {
            overstay_sweep: false,
        }
    }
}
