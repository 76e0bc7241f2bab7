//! User-initiated booking actions.
//!
//! Inputs are validated locally before any remote call. On success the
//! caller is asked to reload everything; nothing is patched in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use parkwatch_core::{
    AlertDescription, CoreError, CoreResult, CouponCode, ExtensionMinutes, RecordStore,
    RemoteProcedures,
};
use parkwatch_shared::{BookingWithSpot, NewSecurityAlert, SecurityAlert};

use crate::refresh::{DataRefresh, RefreshReason};

/// A confirmed extension, priced by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct BookingExtension {
    pub minutes: ExtensionMinutes,
    pub extension_cost: Option<f64>,
    pub new_end_time: Option<DateTime<Utc>>,
}

pub struct LifecycleActions {
    procedures: Arc<dyn RemoteProcedures>,
    records: Arc<dyn RecordStore>,
    refresh: Arc<dyn DataRefresh>,
}

impl std::fmt::Debug for LifecycleActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleActions").finish()
    }
}

impl LifecycleActions {
    pub fn new(
        procedures: Arc<dyn RemoteProcedures>,
        records: Arc<dyn RecordStore>,
        refresh: Arc<dyn DataRefresh>,
    ) -> Self {
        Self {
            procedures,
            records,
            refresh,
        }
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub async fn extend_booking(
        &self,
        booking_id: Uuid,
        minutes: i64,
    ) -> CoreResult<BookingExtension> {
        let minutes = ExtensionMinutes::new(minutes)?;
        self.extend_booking_by(booking_id, minutes).await
    }

    pub async fn extend_booking_by(
        &self,
        booking_id: Uuid,
        minutes: ExtensionMinutes,
    ) -> CoreResult<BookingExtension> {
        let outcome = self.procedures.extend_booking(booking_id, minutes).await?;

        if !outcome.success {
            let message = outcome
                .message
                .unwrap_or_else(|| "This booking cannot be extended.".to_string());
            warn!("Extension of booking {} rejected: {}", booking_id, message);
            return Err(CoreError::Rejected(message));
        }

        info!("Booking {} extended by {} minutes", booking_id, minutes);
        self.refresh.request_refresh(RefreshReason::BookingExtended);

        Ok(BookingExtension {
            minutes,
            extension_cost: outcome.extension_cost,
            new_end_time: outcome.new_end_time,
        })
    }

    /// Returns the amount credited
    pub async fn redeem_coupon(&self, user_id: Uuid, raw_code: &str) -> CoreResult<f64> {
        let code = CouponCode::parse(raw_code)?;
        let redemption = self.procedures.redeem_coupon(user_id, &code).await?;

        if !redemption.success {
            let message = redemption
                .message
                .unwrap_or_else(|| "This coupon cannot be redeemed.".to_string());
            warn!("Coupon {} rejected for user {}: {}", code, user_id, message);
            return Err(CoreError::Rejected(message));
        }

        info!("Coupon {} credited {} to user {}", code, redemption.amount, user_id);
        self.refresh.request_refresh(RefreshReason::CouponRedeemed);
        Ok(redemption.amount)
    }

    /// File a `pending` alert for the booking's spot
    pub async fn send_security_alert(
        &self,
        booking_id: Uuid,
        description: &str,
    ) -> CoreResult<SecurityAlert> {
        let description = AlertDescription::parse(description)?;
        self.file_alert(booking_id, description, None).await
    }

    /// Like [`send_security_alert`](Self::send_security_alert), recording
    /// the spot and vehicle as the user saw them
    pub async fn report_activity(
        &self,
        booking: &BookingWithSpot,
        description: &str,
    ) -> CoreResult<SecurityAlert> {
        let description = AlertDescription::parse(description)?;
        self.file_alert(booking.booking.id, description, Some(booking))
            .await
    }

    // Not idempotent: submitting twice files two alerts.
    async fn file_alert(
        &self,
        booking_id: Uuid,
        description: AlertDescription,
        seen: Option<&BookingWithSpot>,
    ) -> CoreResult<SecurityAlert> {
        let user = self.records.current_user().await?.ok_or_else(|| {
            CoreError::AuthenticationError("You must be logged in to send alerts.".to_string())
        })?;

        let spot_id = self.records.fetch_booking_spot(booking_id).await?;

        let mut alert =
            NewSecurityAlert::pending(user.id, booking_id, spot_id, description.into_inner());
        if let Some(seen) = seen {
            alert = alert.with_spot_details(
                seen.spot.spot_number.as_str(),
                seen.spot.location.as_str(),
                seen.booking.vehicle_number.as_str(),
            );
        }

        let created = self.records.create_security_alert(&alert).await?;
        info!(
            "Security alert {} filed for booking {} by user {}",
            created.id, booking_id, user.id
        );
        Ok(created)
    }
}
