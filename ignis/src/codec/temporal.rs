//! Temporal values.
//!
//! All values are UTC based, callers must normalize timezones before construction.
use super::EncodeError;

pub(crate) const MILLIS_PER_DAY: i64 = 86_400_000;
const NANOS_PER_MILLI: u32 = 1_000_000;

/// Calendar date as milliseconds since unix epoch.
///
/// The codec does not truncate, use [`Date::from_days`] for whole day semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(i64);

impl Date {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Midnight of the `days`th day since unix epoch.
    pub const fn from_days(days: i64) -> Self {
        Self(days * MILLIS_PER_DAY)
    }

    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Returns `true` if the value lies on midnight.
    pub const fn is_whole_day(self) -> bool {
        self.0.rem_euclid(MILLIS_PER_DAY) == 0
    }
}

/// Time of day as milliseconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

impl Time {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn from_hms_milli(hour: u8, minute: u8, second: u8, milli: u16) -> Self {
        Self(
            hour as i64 * 3_600_000
                + minute as i64 * 60_000
                + second as i64 * 1_000
                + milli as i64,
        )
    }

    pub const fn millis(self) -> i64 {
        self.0
    }
}

/// Instant as milliseconds since unix epoch plus a sub-millisecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    millis: i64,
    nanos: u32,
}

impl Timestamp {
    /// `nanos` is the remainder within the millisecond, `0..1_000_000`.
    pub const fn new(millis: i64, nanos: u32) -> Result<Self, EncodeError> {
        if nanos >= NANOS_PER_MILLI {
            return Err(EncodeError::InvalidNanos(nanos));
        }
        Ok(Self { millis, nanos })
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self { millis, nanos: 0 }
    }

    /// Split nanoseconds since unix epoch.
    ///
    /// Returns [`None`] when milliseconds overflow `i64`.
    pub fn from_unix_nanos(nanos: i128) -> Option<Self> {
        let per_milli = i128::from(NANOS_PER_MILLI);
        let millis = i64::try_from(nanos.div_euclid(per_milli)).ok()?;
        let nanos = nanos.rem_euclid(per_milli) as u32;
        Some(Self { millis, nanos })
    }

    pub const fn millis(self) -> i64 {
        self.millis
    }

    pub const fn nanos(self) -> u32 {
        self.nanos
    }

    pub fn unix_nanos(self) -> i128 {
        i128::from(self.millis) * i128::from(NANOS_PER_MILLI) + i128::from(self.nanos)
    }
}
