//! Input checks that run before any remote call is attempted.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

pub const MIN_EXTENSION_MINUTES: i64 = 1;
pub const MAX_EXTENSION_MINUTES: i64 = 60;

/// Number of minutes to extend a booking by, always within 1..=60
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExtensionMinutes(u32);

impl ExtensionMinutes {
    pub fn new(minutes: i64) -> CoreResult<Self> {
        if !(MIN_EXTENSION_MINUTES..=MAX_EXTENSION_MINUTES).contains(&minutes) {
            return Err(Self::invalid());
        }
        Ok(Self(minutes as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    fn invalid() -> CoreError {
        CoreError::ValidationError(format!(
            "Please enter a valid number of minutes ({}-{})",
            MIN_EXTENSION_MINUTES, MAX_EXTENSION_MINUTES
        ))
    }
}

impl TryFrom<i64> for ExtensionMinutes {
    type Error = CoreError;

    fn try_from(minutes: i64) -> CoreResult<Self> {
        Self::new(minutes)
    }
}

impl FromStr for ExtensionMinutes {
    type Err = CoreError;

    fn from_str(raw: &str) -> CoreResult<Self> {
        let minutes: i64 = raw.trim().parse().map_err(|_| Self::invalid())?;
        Self::new(minutes)
    }
}

impl fmt::Display for ExtensionMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coupon code, trimmed and upper-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCode(String);

impl CouponCode {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(CoreError::ValidationError(
                "Please enter a coupon code".to_string(),
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text description attached to a security alert, trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDescription(String);

impl AlertDescription {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let description = raw.trim();
        if description.is_empty() {
            return Err(CoreError::ValidationError(
                "Please provide a description of the activity.".to_string(),
            ));
        }
        Ok(Self(description.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
