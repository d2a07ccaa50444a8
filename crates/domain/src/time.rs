//! Time and timestamp helpers.
//!
//! Calendar-day arithmetic happens in a [`Zone`]: either the host's local
//! wall clock or a named IANA timezone. Day boundaries are converted to UTC
//! with the zone's offset *at the reference instant*, so on DST transition
//! days a boundary can be off by the offset delta.

use std::str::FromStr;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, SecondsFormat, TimeDelta, TimeZone,
    Utc,
};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// UTC timestamp used for `created_at`, `next_run`, range bounds, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render an instant as ISO-8601 UTC with millisecond precision.
///
/// The fixed width keeps lexical order equal to chronological order, which
/// the store relies on for `ORDER BY created_at`.
#[must_use]
pub fn format_instant(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 instant with any offset into UTC.
///
/// # Errors
///
/// Returns the chrono parse error when `s` is not RFC 3339.
pub fn parse_instant(s: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.to_utc())
}

/// Add whole calendar days to an instant, or `None` past chrono's range.
#[must_use]
pub fn add_days(ts: Timestamp, days: u32) -> Option<Timestamp> {
    ts.checked_add_signed(TimeDelta::try_days(i64::from(days))?)
}

/// The wall clock that calendar-day boundaries are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The host's local timezone.
    #[default]
    Local,
    /// A named IANA timezone such as `America/New_York`.
    Named(Tz),
    /// A fixed UTC offset; mostly useful for deterministic tests.
    Fixed(FixedOffset),
}

impl Zone {
    /// The UTC zone.
    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// The zone's UTC offset in effect at `at`.
    #[must_use]
    pub fn offset_at(&self, at: Timestamp) -> FixedOffset {
        let naive = at.naive_utc();
        match self {
            Self::Local => Local.offset_from_utc_datetime(&naive),
            Self::Named(tz) => tz.offset_from_utc_datetime(&naive).fix(),
            Self::Fixed(offset) => *offset,
        }
    }

    /// Freeze the zone at `at` into a [`DayClock`] for boundary arithmetic.
    #[must_use]
    pub fn clock_at(&self, at: Timestamp) -> DayClock {
        DayClock {
            offset: self.offset_at(at),
        }
    }
}

impl FromStr for Zone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| ValidationError::UnknownTimezone(s.to_string()))
    }
}

/// Calendar-day arithmetic at one fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    offset: FixedOffset,
}

impl DayClock {
    /// The calendar date of `at` on this clock.
    #[must_use]
    pub fn date_of(&self, at: Timestamp) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// The instant of `00:00:00.000` on `date`.
    #[must_use]
    pub fn start_of_day(&self, date: NaiveDate) -> Timestamp {
        let wall = date.and_time(NaiveTime::MIN);
        (wall - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// The instant of `23:59:59.999` on `date`.
    #[must_use]
    pub fn end_of_day(&self, date: NaiveDate) -> Timestamp {
        self.start_of_day(date) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
    }
}
