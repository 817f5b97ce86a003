// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Absolute UTC instant.
//!
//! [`Instant`] is the sole time input to both engines.  It wraps a
//! `chrono::DateTime<Utc>` and exposes the handful of calendar projections
//! the solar model needs (UTC day-of-year, fractional UTC hour) together
//! with the absolute sub-second component used by the clock hands.
//!
//! Instants are immutable and `Copy`; arithmetic produces new values.

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use qtty::{Day, Days, Seconds};
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ═══════════════════════════════════════════════════════════════════════════
// Instant
// ═══════════════════════════════════════════════════════════════════════════

/// An absolute point in time on the UTC axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    utc: DateTime<Utc>,
}

impl Instant {
    /// Unix epoch, 1970-01-01T00:00:00Z.
    pub const UNIX_EPOCH: Self = Self {
        utc: DateTime::<Utc>::UNIX_EPOCH,
    };

    // ── constructors ──────────────────────────────────────────────────

    /// Wrap a `chrono::DateTime<Utc>`.
    #[inline]
    pub const fn from_utc(utc: DateTime<Utc>) -> Self {
        Self { utc }
    }

    /// The current wall-clock instant.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Build from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if the value falls outside chrono's representable range.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self::from_utc)
    }

    /// Parse an RFC 3339 timestamp such as `2024-06-21T12:00:00Z`.
    ///
    /// Returns `None` if the string is not valid RFC 3339.
    pub fn parse_rfc3339(text: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// `self + delta`, or `None` if the result leaves chrono's range.
    pub fn checked_add(&self, delta: TimeDelta) -> Option<Self> {
        self.utc.checked_add_signed(delta).map(Self::from_utc)
    }

    // ── accessors ─────────────────────────────────────────────────────

    /// The wrapped `chrono::DateTime<Utc>`.
    #[inline]
    pub const fn to_utc(&self) -> DateTime<Utc> {
        self.utc
    }

    /// Milliseconds since the Unix epoch.
    #[inline]
    pub fn unix_millis(&self) -> i64 {
        self.utc.timestamp_millis()
    }

    /// Day of the UTC calendar year, `1` for January 1st.
    #[inline]
    pub fn day_of_year(&self) -> u32 {
        self.utc.ordinal()
    }

    /// UTC time of day as fractional hours, built from whole seconds:
    /// `hour + minute / 60 + second / 3600`.
    pub fn utc_hours(&self) -> f64 {
        f64::from(self.utc.hour())
            + f64::from(self.utc.minute()) / 60.0
            + f64::from(self.utc.second()) / 3_600.0
    }

    /// Milliseconds past the current whole second (`0..=999`).
    ///
    /// This component is absolute: no timezone shifts it.
    #[inline]
    pub fn subsec_millis(&self) -> u32 {
        // Leap-second representation can push this past 999.
        self.utc.timestamp_subsec_millis().min(999)
    }

    /// Elapsed time between two instants as a [`Seconds`] quantity.
    pub fn seconds_since(&self, earlier: Self) -> Seconds {
        let delta = self.utc - earlier.utc;
        match delta.num_microseconds() {
            Some(us) => Seconds::new(us as f64 / 1e6),
            None => Seconds::new(delta.num_seconds() as f64),
        }
    }

    /// Elapsed time between two instants expressed in days.
    pub fn days_since(&self, earlier: Self) -> Days {
        self.seconds_since(earlier).to::<Day>()
    }
}

/// Convert a [`Seconds`] quantity into a chrono [`TimeDelta`], rounded to
/// the nearest millisecond.
///
/// Values beyond chrono's range saturate to [`TimeDelta::MAX`] or
/// [`TimeDelta::MIN`]; `NaN` maps to zero.
pub fn seconds_to_delta(seconds: Seconds) -> TimeDelta {
    let millis = (seconds.value() * 1_000.0).round();
    TimeDelta::try_milliseconds(millis as i64).unwrap_or(if millis < 0.0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait implementations
// ═══════════════════════════════════════════════════════════════════════════

// ── Display ───────────────────────────────────────────────────────────────

impl std::fmt::Display for Instant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc.to_rfc3339())
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

impl Serialize for Instant {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_str(&self.utc.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Instant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid RFC 3339 instant: {text}")))
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

impl Add<TimeDelta> for Instant {
    type Output = Self;
    #[inline]
    fn add(self, rhs: TimeDelta) -> Self::Output {
        Self::from_utc(self.utc + rhs)
    }
}

impl AddAssign<TimeDelta> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: TimeDelta) {
        self.utc += rhs;
    }
}

impl Sub<TimeDelta> for Instant {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: TimeDelta) -> Self::Output {
        Self::from_utc(self.utc - rhs)
    }
}

impl SubAssign<TimeDelta> for Instant {
    #[inline]
    fn sub_assign(&mut self, rhs: TimeDelta) {
        self.utc -= rhs;
    }
}

impl Sub for Instant {
    type Output = TimeDelta;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.utc - rhs.utc
    }
}

// ── From/Into DateTime ────────────────────────────────────────────────────

impl From<DateTime<Utc>> for Instant {
    #[inline]
    fn from(utc: DateTime<Utc>) -> Self {
        Self::from_utc(utc)
    }
}

impl From<Instant> for DateTime<Utc> {
    #[inline]
    fn from(instant: Instant) -> Self {
        instant.utc
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Instant {
        Instant::from_utc(Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    #[test]
    fn test_day_of_year_starts_at_one() {
        assert_eq!(at(2024, 1, 1, 0, 0, 0).day_of_year(), 1);
        assert_eq!(at(2024, 6, 21, 12, 0, 0).day_of_year(), 173);
        assert_eq!(at(2023, 12, 31, 23, 59, 59).day_of_year(), 365);
        assert_eq!(at(2024, 12, 31, 0, 0, 0).day_of_year(), 366);
    }

    #[test]
    fn test_utc_hours_ignores_subsecond() {
        let base = at(2024, 3, 1, 18, 30, 36);
        let later = base + TimeDelta::milliseconds(750);
        assert!((base.utc_hours() - 18.51).abs() < 1e-12);
        assert_eq!(base.utc_hours(), later.utc_hours());
    }

    #[test]
    fn test_subsec_millis() {
        let t = Instant::from_unix_millis(1_700_000_000_123).unwrap();
        assert_eq!(t.subsec_millis(), 123);
        assert_eq!(t.unix_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_arithmetic() {
        let mut t = at(2024, 1, 1, 0, 0, 0);
        let later = t + TimeDelta::seconds(90);
        assert_eq!(later - t, TimeDelta::seconds(90));
        t += TimeDelta::days(1);
        assert_eq!(t, at(2024, 1, 2, 0, 0, 0));
        t -= TimeDelta::hours(24);
        assert_eq!(t, at(2024, 1, 1, 0, 0, 0));
        assert!((later.seconds_since(t) - Seconds::new(90.0)).abs() < Seconds::new(1e-9));
        assert!((later.days_since(t) - Days::new(90.0 / 86_400.0)).abs() < Days::new(1e-12));
    }

    #[test]
    fn test_seconds_to_delta_rounds_to_millis() {
        assert_eq!(seconds_to_delta(Seconds::new(30.0)), TimeDelta::seconds(30));
        assert_eq!(
            seconds_to_delta(Seconds::new(0.0166)),
            TimeDelta::milliseconds(17)
        );
        assert_eq!(seconds_to_delta(Seconds::new(1e300)), TimeDelta::MAX);
        assert_eq!(seconds_to_delta(Seconds::new(-1e300)), TimeDelta::MIN);
        assert_eq!(seconds_to_delta(Seconds::new(f64::NAN)), TimeDelta::zero());
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let t = at(2024, 1, 1, 0, 0, 0);
        assert_eq!(t.checked_add(TimeDelta::days(1)), Some(at(2024, 1, 2, 0, 0, 0)));
        assert_eq!(t.checked_add(TimeDelta::MAX), None);
    }

    #[test]
    fn test_rfc3339_roundtrip_and_display() {
        let t = Instant::parse_rfc3339("2024-06-21T12:00:00Z").unwrap();
        assert_eq!(t, at(2024, 6, 21, 12, 0, 0));
        assert!(format!("{t}").starts_with("2024-06-21T12:00:00"));
        assert!(Instant::parse_rfc3339("not a date").is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let t = at(2024, 1, 1, 0, 0, 0);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("2024-01-01T00:00:00"));
        let back: Instant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
