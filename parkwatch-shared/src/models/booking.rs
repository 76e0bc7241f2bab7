use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// A reservation of one parking spot for one vehicle.
///
/// The client never mutates bookings: extension, overstay handling and
/// cancellation all happen in the backend, and a reload picks up the result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub spot_id: Uuid,
    pub vehicle_number: String,
    pub start_time: DateTime<Utc>,
    /// `None` when the stored value is missing or unparseable
    #[serde(default, with = "crate::timestamp::lenient")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub is_completed: bool,
}

/// A physical parking spot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParkingSpot {
    pub id: Uuid,
    pub spot_number: String,
    pub location: String,
    #[serde(default)]
    pub camera_feed_url: Option<String>,
    #[serde(default)]
    pub sensor_id: Option<String>,
}

impl ParkingSpot {
    /// Camera feed URL, if one has been configured by an admin.
    ///
    /// Admin tooling has been seen writing the literal string `"null"`.
    pub fn camera_feed(&self) -> Option<&str> {
        self.camera_feed_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != "null")
    }
}

/// Booking row joined with its spot (`select=*,parking_spots(...)`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingWithSpot {
    #[serde(flatten)]
    pub booking: Booking,
    #[serde(rename = "parking_spots")]
    pub spot: ParkingSpot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(end_time: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "6f1c1c2e-6d39-4c55-a0a4-53b7a2c1d001",
            "user_id": "6f1c1c2e-6d39-4c55-a0a4-53b7a2c1d002",
            "spot_id": "6f1c1c2e-6d39-4c55-a0a4-53b7a2c1d003",
            "vehicle_number": "KA01AB1234",
            "start_time": "2025-03-01T10:00:00+00:00",
            "end_time": end_time,
            "total_cost": 40.0,
            "is_completed": false,
            "parking_spots": {
                "id": "6f1c1c2e-6d39-4c55-a0a4-53b7a2c1d003",
                "spot_number": "A-12",
                "location": "Level 1",
                "camera_feed_url": "null",
                "sensor_id": "S-12"
            }
        })
    }

    #[test]
    fn test_joined_row_decodes() {
        let decoded: BookingWithSpot =
            serde_json::from_value(row(json!("2025-03-01T11:00:00+00:00"))).unwrap();
        assert_eq!(decoded.spot.spot_number, "A-12");
        assert!(decoded.booking.end_time.is_some());
        assert_eq!(decoded.spot.camera_feed(), None);
    }

    #[test]
    fn test_malformed_end_time_is_tolerated() {
        let decoded: BookingWithSpot = serde_json::from_value(row(json!("not a time"))).unwrap();
        assert!(decoded.booking.end_time.is_none());

        let decoded: BookingWithSpot = serde_json::from_value(row(json!(null))).unwrap();
        assert!(decoded.booking.end_time.is_none());
    }
}
