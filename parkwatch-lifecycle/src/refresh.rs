use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Why a full data reload was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    BookingExtended,
    CouponRedeemed,
}

/// Sink for "reload everything" requests after a successful mutation.
/// The client never patches local state in place.
pub trait DataRefresh: Send + Sync {
    fn request_refresh(&self, reason: RefreshReason);
}

impl DataRefresh for UnboundedSender<RefreshReason> {
    fn request_refresh(&self, reason: RefreshReason) {
        if self.send(reason).is_err() {
            debug!("Refresh requested ({:?}) but nobody is listening", reason);
        }
    }
}
