//! # Device Timestamps
//!
//! The tax device speaks a bare `YYYYMMDDhhmmss` timestamp format,
//! interpreted in the device's local zone (UTC+3, no daylight saving).
//! Internally everything is `DateTime<Utc>`; the offset only appears at the
//! wire boundary.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Wire format the device emits and expects.
const WIRE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Fixed device-zone offset in seconds east of UTC. Nairobi has no DST,
/// so a fixed offset is exact year-round.
const DEVICE_OFFSET_SECS: i32 = 3 * 3600;

/// A timestamp with second-level precision, stored in UTC and rendered in
/// the device's `YYYYMMDDhhmmss` local format at the wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceTimestamp(DateTime<Utc>);

impl DeviceTimestamp {
    /// Create a timestamp representing the current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render the timestamp in the device wire format, e.g. `20241014120000`.
    pub fn to_wire(&self) -> String {
        self.0
            .with_timezone(&device_zone())
            .format(WIRE_FORMAT)
            .to_string()
    }

    /// Parse a device wire timestamp back into UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDeviceTimestamp`] if the string does
    /// not match `YYYYMMDDhhmmss`.
    pub fn parse_wire(s: &str) -> Result<Self, ValidationError> {
        let naive = NaiveDateTime::parse_from_str(s, WIRE_FORMAT)
            .map_err(|_| ValidationError::InvalidDeviceTimestamp(s.to_string()))?;
        let local = naive
            .and_local_timezone(device_zone())
            .single()
            .ok_or_else(|| ValidationError::InvalidDeviceTimestamp(s.to_string()))?;
        Ok(Self(local.with_timezone(&Utc)))
    }
}

impl std::fmt::Display for DeviceTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

impl From<DateTime<Utc>> for DeviceTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

fn device_zone() -> FixedOffset {
    // Constant is in range, so the unwrap cannot fire.
    FixedOffset::east_opt(DEVICE_OFFSET_SECS).expect("valid fixed offset")
}
