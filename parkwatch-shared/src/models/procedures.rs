//! Response payloads of the backend's named procedures.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// `redeem_coupon` result. `amount` is only meaningful when `success` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CouponRedemption {
    pub success: bool,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub message: Option<String>,
}

/// `extend_booking` result; pricing is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExtensionOutcome {
    pub success: bool,
    #[serde(default)]
    pub extension_cost: Option<f64>,
    #[serde(default)]
    pub new_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `check_upcoming_bookings_before_start` result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UpcomingPreflight {
    #[serde(default)]
    pub reassigned: u32,
    #[serde(default)]
    pub cancelled: u32,
}

/// `update_spot_availability_from_sensor` result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SpotRefresh {
    #[serde(default)]
    pub spots_updated: u32,
}

/// `check_and_handle_overstay` result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OverstaySweep {
    #[serde(default)]
    pub overstays_detected: u32,
}
