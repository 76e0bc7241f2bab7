pub mod models;
pub mod timestamp;

pub use models::alert::{AlertStatus, NewSecurityAlert, SecurityAlert};
pub use models::booking::{Booking, BookingWithSpot, ParkingSpot};
pub use models::ledger::{Profile, Transaction};
pub use models::procedures::{
    CouponRedemption, ExtensionOutcome, OverstaySweep, SpotRefresh, UpcomingPreflight,
};
pub use models::sensor::SensorReading;
