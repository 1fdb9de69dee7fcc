//! [`time`][::time] integration, requires `time` feature.
//!
//! | wire        | time                                                   |
//! | ----------- | ------------------------------------------------------ |
//! | `Date`      | [`time::Date`]                                         |
//! | `Time`      | [`time::Time`]                                         |
//! | `Timestamp` | [`OffsetDateTime`], [`UtcDateTime`], [`PrimitiveDateTime`] |
//!
//! [`PrimitiveDateTime`] is assumed to be UTC.
use time::{OffsetDateTime, PrimitiveDateTime, UtcDateTime};

use super::{Date, DecodeError, FromWire, Time, Timestamp, WireValue, temporal::MILLIS_PER_DAY};

// julian day of 1970-01-01
const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

impl TryFrom<Date> for time::Date {
    type Error = DecodeError;

    fn try_from(value: Date) -> Result<Self, Self::Error> {
        let days = value.millis().div_euclid(MILLIS_PER_DAY);
        let julian = i32::try_from(UNIX_EPOCH_JULIAN_DAY + days)
            .map_err(|_| DecodeError::Malformed("date out of range"))?;
        time::Date::from_julian_day(julian).map_err(|_| DecodeError::Malformed("date out of range"))
    }
}

impl From<time::Date> for Date {
    fn from(value: time::Date) -> Self {
        Date::from_days(i64::from(value.to_julian_day()) - UNIX_EPOCH_JULIAN_DAY)
    }
}

impl TryFrom<Time> for time::Time {
    type Error = DecodeError;

    fn try_from(value: Time) -> Result<Self, Self::Error> {
        let millis = value.millis();
        if !(0..MILLIS_PER_DAY).contains(&millis) {
            return Err(DecodeError::Malformed("time of day out of range"));
        }
        let (hour, rest) = (millis / 3_600_000, millis % 3_600_000);
        let (minute, rest) = (rest / 60_000, rest % 60_000);
        let (second, milli) = (rest / 1_000, rest % 1_000);
        time::Time::from_hms_milli(hour as u8, minute as u8, second as u8, milli as u16)
            .map_err(|_| DecodeError::Malformed("time of day out of range"))
    }
}

/// Sub-millisecond precision is truncated.
impl From<time::Time> for Time {
    fn from(value: time::Time) -> Self {
        Time::from_hms_milli(value.hour(), value.minute(), value.second(), value.millisecond())
    }
}

// `time` range is bounded by year 9999, milliseconds always fit i64
fn from_unix_nanos(nanos: i128) -> Timestamp {
    let millis = nanos.div_euclid(1_000_000) as i64;
    let nanos = nanos.rem_euclid(1_000_000) as u32;
    match Timestamp::new(millis, nanos) {
        Ok(ok) => ok,
        Err(_) => unreachable!("remainder is within a millisecond"),
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        from_unix_nanos(value.unix_timestamp_nanos())
    }
}

impl From<UtcDateTime> for Timestamp {
    fn from(value: UtcDateTime) -> Self {
        from_unix_nanos(value.unix_timestamp_nanos())
    }
}

impl From<PrimitiveDateTime> for Timestamp {
    fn from(value: PrimitiveDateTime) -> Self {
        value.assume_utc().into()
    }
}

impl TryFrom<Timestamp> for OffsetDateTime {
    type Error = DecodeError;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        OffsetDateTime::from_unix_timestamp_nanos(value.unix_nanos())
            .map_err(|_| DecodeError::Malformed("timestamp out of range"))
    }
}

impl TryFrom<Timestamp> for UtcDateTime {
    type Error = DecodeError;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        UtcDateTime::from_unix_timestamp_nanos(value.unix_nanos())
            .map_err(|_| DecodeError::Malformed("timestamp out of range"))
    }
}

impl TryFrom<Timestamp> for PrimitiveDateTime {
    type Error = DecodeError;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        let utc = OffsetDateTime::try_from(value)?;
        Ok(PrimitiveDateTime::new(utc.date(), utc.time()))
    }
}

macro_rules! integrate {
    ($($ty:ty => $wire:ident),* $(,)?) => {
        $(
            impl FromWire for $ty {
                fn from_wire(value: WireValue) -> Result<Self, DecodeError> {
                    <$ty>::try_from($wire::from_wire(value)?)
                }
            }

            impl From<$ty> for WireValue {
                fn from(value: $ty) -> Self {
                    $wire::from(value).into()
                }
            }
        )*
    };
}

integrate! {
    time::Date => Date,
    time::Time => Time,
    OffsetDateTime => Timestamp,
    UtcDateTime => Timestamp,
    PrimitiveDateTime => Timestamp,
}
