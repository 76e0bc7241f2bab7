pub mod clock;
pub mod cost;
pub mod gateway;
pub mod lifecycle;
pub mod mock;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cost::{CostEstimator, PenaltyPreview};
pub use gateway::{AuthUser, Capabilities, RecordStore, RemoteProcedures};
pub use lifecycle::{BookingClassifier, BookingStatus, LifecycleStage};
pub use validation::{AlertDescription, CouponCode, ExtensionMinutes};

/// Broad failure class, used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed user input, rejected before any remote call
    Validation,
    /// Transport, backend or decode failure, or a procedure saying no
    Remote,
    /// No authenticated session
    Authentication,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Remote call failed: {0}")]
    RemoteError(String),
    #[error("Authentication required: {0}")]
    AuthenticationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Capability not available: {0}")]
    Unsupported(String),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::ValidationError(_) => ErrorCategory::Validation,
            CoreError::AuthenticationError(_) => ErrorCategory::Authentication,
            CoreError::Rejected(_)
            | CoreError::RemoteError(_)
            | CoreError::NotFound(_)
            | CoreError::Unsupported(_) => ErrorCategory::Remote,
        }
    }

    /// Text safe to show to the user.
    ///
    /// Validation text and backend rejections are shown verbatim; transport
    /// details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::ValidationError(msg) | CoreError::Rejected(msg) => msg.clone(),
            CoreError::AuthenticationError(_) => {
                "You must be logged in to continue.".to_string()
            }
            CoreError::RemoteError(_) | CoreError::NotFound(_) | CoreError::Unsupported(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
