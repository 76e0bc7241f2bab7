use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use parkwatch_core::{CoreError, ErrorCategory, ExtensionMinutes};
use parkwatch_shared::BookingWithSpot;

use crate::actions::{BookingExtension, LifecycleActions};
use crate::camera::CameraView;
use crate::input::{Captured, InputCapture};

const ALERT_PROMPT: &str = "Describe the unusual activity you observed:";
const ALERT_SENT: &str = "Alert sent successfully! Admin team has been notified. If you took a screenshot, please keep it for reference.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Feedback line shown after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// Local validation problems are warnings; everything else is an error.
    /// Transport details are replaced with `fallback`.
    fn from_error(err: &CoreError, fallback: &str) -> Self {
        let kind = match err.category() {
            ErrorCategory::Validation => NoticeKind::Warning,
            _ => NoticeKind::Error,
        };
        let text = match err {
            CoreError::ValidationError(_)
            | CoreError::Rejected(_)
            | CoreError::AuthenticationError(_) => err.user_message(),
            _ => fallback.to_string(),
        };
        Self { kind, text }
    }
}

/// Commands the dashboard page can trigger
pub struct DashboardCommands {
    actions: Arc<LifecycleActions>,
    input: Arc<dyn InputCapture>,
}

impl DashboardCommands {
    pub fn new(actions: Arc<LifecycleActions>, input: Arc<dyn InputCapture>) -> Self {
        Self { actions, input }
    }

    pub fn open_camera_feed(&self, booking: &BookingWithSpot) -> CameraView {
        CameraView::for_booking(booking)
    }

    /// `None` when the user dismisses the prompt
    pub async fn prompt_and_extend(&self, booking: &BookingWithSpot) -> Option<Notice> {
        let prompt = format!(
            "Extend booking for Spot {}\n\nEnter number of minutes to extend (1-60):",
            booking.spot.spot_number
        );
        let raw = match self.input.ask(&prompt).await {
            Captured::Value(raw) => raw,
            Captured::Cancelled => {
                debug!("Extension of booking {} cancelled", booking.booking.id);
                return None;
            }
        };

        let minutes = match raw.parse::<ExtensionMinutes>() {
            Ok(minutes) => minutes,
            Err(e) => return Some(Notice::from_error(&e, "")),
        };

        let notice = match self.actions.extend_booking_by(booking.booking.id, minutes).await {
            Ok(extension) => Notice::success(extension_summary(&extension)),
            Err(e) => Notice::from_error(&e, "Error extending booking. Please try again."),
        };
        Some(notice)
    }

    /// `None` when the user dismisses the prompt
    pub async fn prompt_and_alert(&self, booking: &BookingWithSpot) -> Option<Notice> {
        let description = match self.input.ask(ALERT_PROMPT).await {
            Captured::Value(text) => text,
            Captured::Cancelled => {
                debug!("Security alert for booking {} cancelled", booking.booking.id);
                return None;
            }
        };

        let notice = match self.actions.report_activity(booking, &description).await {
            Ok(_) => Notice::success(ALERT_SENT),
            Err(e) => Notice::from_error(&e, "Error sending alert. Please try again."),
        };
        Some(notice)
    }

    pub async fn redeem(&self, user_id: Uuid, raw_code: &str) -> Notice {
        match self.actions.redeem_coupon(user_id, raw_code).await {
            Ok(amount) => Notice::success(format!("Success! ₹{} added to your balance", amount)),
            Err(e) => Notice::from_error(&e, "Error redeeming coupon. Please try again."),
        }
    }
}

fn extension_summary(extension: &BookingExtension) -> String {
    let mut text = format!("Success! Booking extended by {} minutes.", extension.minutes);
    if let Some(cost) = extension.extension_cost {
        text.push_str(&format!("\nCost: ₹{:.2}", cost));
    }
    if let Some(end) = extension.new_end_time {
        text.push_str(&format!("\nNew end time: {}", end.format("%d %b %Y, %H:%M UTC")));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_extension_summary_formats_cost_and_end() {
        let extension = BookingExtension {
            minutes: ExtensionMinutes::new(30).unwrap(),
            extension_cost: Some(12.5),
            new_end_time: Some(Utc.with_ymd_and_hms(2026, 3, 1, 11, 30, 0).unwrap()),
        };
        assert_eq!(
            extension_summary(&extension),
            "Success! Booking extended by 30 minutes.\nCost: ₹12.50\nNew end time: 01 Mar 2026, 11:30 UTC"
        );
    }

    #[test]
    fn test_transport_error_uses_fallback() {
        let notice = Notice::from_error(
            &CoreError::RemoteError("tcp reset".to_string()),
            "Error redeeming coupon. Please try again.",
        );
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Error redeeming coupon. Please try again.");
    }

    #[test]
    fn test_validation_error_is_a_warning() {
        let notice = Notice::from_error(
            &CoreError::ValidationError("Please enter a coupon code".to_string()),
            "unused",
        );
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.text, "Please enter a coupon code");
    }
}
