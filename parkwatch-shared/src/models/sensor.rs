use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Latest occupancy reading reported by a spot sensor.
/// Source of truth for physical occupancy; read-only for the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub sensor_id: String,
    pub is_occupied: bool,
    #[serde(alias = "updated_at", alias = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}
