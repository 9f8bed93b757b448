//! Temporal values and their wire conversions.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAY_FROM_CE: i64 = 719_163;

/// Temporal amount in months, days, seconds and nanoseconds.
///
/// The components are kept apart; a month is not a fixed number of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    /// Months
    pub months: i64,
    /// Days
    pub days: i64,
    /// Seconds
    pub seconds: i64,
    /// Nanoseconds
    pub nanoseconds: i64,
}

impl Duration {
    /// Create a new duration.
    pub fn new(months: i64, days: i64, seconds: i64, nanoseconds: i64) -> Self {
        Self {
            months,
            days,
            seconds,
            nanoseconds,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P{}M{}DT{}.{:09}S",
            self.months, self.days, self.seconds, self.nanoseconds
        )
    }
}

/// Time of day with a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    /// Local time of day
    pub time: NaiveTime,
    /// Offset from UTC
    pub offset: FixedOffset,
}

impl OffsetTime {
    /// Create a new offset time.
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

/// Days since the Unix epoch.
pub(crate) fn date_to_epoch_days(date: &NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - UNIX_EPOCH_DAY_FROM_CE
}

pub(crate) fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    let ce_days = days.checked_add(UNIX_EPOCH_DAY_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(ce_days).ok()?)
}

/// chrono keeps a leap second as a sub-second value of one second or more.
/// The wire format has no room for it.
pub(crate) fn is_leap_second(time: &NaiveTime) -> bool {
    time.nanosecond() as i64 >= NANOS_PER_SECOND
}

/// Nanoseconds since midnight.
pub(crate) fn time_to_nanos(time: &NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * NANOS_PER_SECOND + time.nanosecond() as i64
}

pub(crate) fn time_from_nanos(nanos: i64) -> Option<NaiveTime> {
    if !(0..SECONDS_PER_DAY * NANOS_PER_SECOND).contains(&nanos) {
        return None;
    }
    let seconds = u32::try_from(nanos / NANOS_PER_SECOND).ok()?;
    let subsec = u32::try_from(nanos % NANOS_PER_SECOND).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, subsec)
}

/// Seconds and nanoseconds since the epoch, reading the wall clock as UTC.
pub(crate) fn local_datetime_to_parts(datetime: &NaiveDateTime) -> (i64, i64) {
    let utc = datetime.and_utc();
    (utc.timestamp(), utc.timestamp_subsec_nanos() as i64)
}

pub(crate) fn local_datetime_from_parts(seconds: i64, nanos: i64) -> Option<NaiveDateTime> {
    if !(0..NANOS_PER_SECOND).contains(&nanos) {
        return None;
    }
    let nanos = u32::try_from(nanos).ok()?;
    DateTime::from_timestamp(seconds, nanos).map(|dt| dt.naive_utc())
}

/// Offset datetimes carry local wall-clock seconds plus the offset.
pub(crate) fn offset_datetime_to_parts(datetime: &DateTime<FixedOffset>) -> (i64, i64, i64) {
    let (seconds, nanos) = local_datetime_to_parts(&datetime.naive_local());
    (seconds, nanos, datetime.offset().local_minus_utc() as i64)
}

pub(crate) fn offset_datetime_from_parts(
    seconds: i64,
    nanos: i64,
    offset_seconds: i64,
) -> Option<DateTime<FixedOffset>> {
    let offset = offset_from_seconds(offset_seconds)?;
    let local = local_datetime_from_parts(seconds, nanos)?;
    local.and_local_timezone(offset).single()
}

pub(crate) fn offset_from_seconds(offset_seconds: i64) -> Option<FixedOffset> {
    FixedOffset::east_opt(i32::try_from(offset_seconds).ok()?)
}
