use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Review status of a security alert. Transitions happen on the admin side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Reviewing,
    Resolved,
    #[serde(other)]
    Unknown,
}

impl AlertStatus {
    /// Badge text shown next to the alert
    pub fn label(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "Pending",
            AlertStatus::Reviewing => "Under Review",
            AlertStatus::Resolved => "Resolved",
            AlertStatus::Unknown => "Unknown",
        }
    }
}

/// A user-submitted report of unusual activity at a spot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    #[serde(default)]
    pub spot_id: Option<Uuid>,
    #[serde(default)]
    pub spot_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    pub description: String,
    pub status: AlertStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SecurityAlert {
    /// Heading for the alert: the description up to the first colon.
    pub fn title(&self) -> &str {
        self.description
            .split(':')
            .next()
            .unwrap_or(&self.description)
    }
}

/// Insert payload for `security_alerts`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSecurityAlert {
    pub user_id: Uuid,
    pub booking_id: Uuid,
    pub spot_id: Uuid,
    pub spot_number: Option<String>,
    pub location: Option<String>,
    pub vehicle_number: Option<String>,
    pub screenshot_url: Option<String>,
    pub description: String,
    pub status: AlertStatus,
}

impl NewSecurityAlert {
    /// New alerts always enter the review queue as `pending`.
    pub fn pending(user_id: Uuid, booking_id: Uuid, spot_id: Uuid, description: String) -> Self {
        Self {
            user_id,
            booking_id,
            spot_id,
            spot_number: None,
            location: None,
            vehicle_number: None,
            screenshot_url: None,
            description,
            status: AlertStatus::Pending,
        }
    }

    pub fn with_spot_details(
        mut self,
        spot_number: impl Into<String>,
        location: impl Into<String>,
        vehicle_number: impl Into<String>,
    ) -> Self {
        self.spot_number = Some(spot_number.into());
        self.location = Some(location.into());
        self.vehicle_number = Some(vehicle_number.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: AlertStatus = serde_json::from_str("\"escalated\"").unwrap();
        assert_eq!(status, AlertStatus::Unknown);
        assert_eq!(AlertStatus::Reviewing.label(), "Under Review");
    }

    #[test]
    fn test_pending_alert_payload() {
        let alert = NewSecurityAlert::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Broken window: rear left".to_string(),
        );
        let body = serde_json::to_value(&alert).unwrap();
        assert_eq!(body["status"], "pending");
        assert!(body["screenshot_url"].is_null());
    }
}
