// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Timezone identifiers and the timezone database capability.
//!
//! A [`ZoneId`] is an IANA identifier that has already been checked against
//! a database, so the clock engine never sees an unknown zone.  Validation
//! happens once, at configuration time:
//!
//! | Entry point                    | On unknown identifier            |
//! |--------------------------------|----------------------------------|
//! | [`ZoneId::parse`]              | `Err(InvalidTimezone)`           |
//! | [`TimeZoneDb::zone`]           | `Err(InvalidTimezone)`           |
//! | `Deserialize for ZoneId`       | deserialization error            |
//!
//! [`TzDatabase`] is the default database, backed by the compiled-in
//! `chrono-tz` tables.

use chrono::{Datelike, Offset, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::error::{GeochronError, Result};
use crate::instant::Instant;

/// Identifier used when nothing better is known about the host.
pub const UTC_ZONE: &str = "UTC";

// ═══════════════════════════════════════════════════════════════════════════
// ZoneId
// ═══════════════════════════════════════════════════════════════════════════

/// A validated IANA timezone identifier such as `"Europe/Paris"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(String);

impl ZoneId {
    /// Validate `name` against the bundled database.
    pub fn parse(name: &str) -> Result<Self> {
        TzDatabase.zone(name)
    }

    /// The `UTC` zone.
    pub fn utc() -> Self {
        Self(UTC_ZONE.to_owned())
    }

    /// The identifier string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Tz> for ZoneId {
    fn from(tz: Tz) -> Self {
        Self(tz.name().to_owned())
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ZoneId {
    type Err = GeochronError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ZoneId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Zone-local fields
// ═══════════════════════════════════════════════════════════════════════════

/// Calendar and wall-clock fields of an instant as seen in one zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalFields {
    /// Proleptic Gregorian year.
    pub year: i32,
    /// `1..=12`.
    pub month: u32,
    /// `1..=31`.
    pub day: u32,
    /// Day of the week.
    pub weekday: Weekday,
    /// 24-hour, `0..=23`.
    pub hour: u32,
    /// `0..=59`.
    pub minute: u32,
    /// `0..=59`; leap seconds clamp to 59.
    pub second: u32,
    /// Offset from UTC in effect at the instant, in seconds east.
    pub utc_offset_seconds: i32,
}

// ═══════════════════════════════════════════════════════════════════════════
// TimeZoneDb
// ═══════════════════════════════════════════════════════════════════════════

/// A source of timezone rules.
pub trait TimeZoneDb {
    /// `true` if `name` identifies a known zone.
    fn contains(&self, name: &str) -> bool;

    /// Resolve `instant` into zone-local fields.
    fn local_fields(&self, zone: &ZoneId, instant: Instant) -> Result<LocalFields>;

    /// Validate `name` and wrap it as a [`ZoneId`].
    fn zone(&self, name: &str) -> Result<ZoneId> {
        if self.contains(name) {
            Ok(ZoneId(name.to_owned()))
        } else {
            Err(GeochronError::invalid_timezone(name))
        }
    }
}

/// The IANA database compiled into `chrono-tz`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TzDatabase;

impl TzDatabase {
    fn resolve(name: &str) -> Result<Tz> {
        name.parse::<Tz>()
            .map_err(|_| GeochronError::invalid_timezone(name))
    }
}

impl TimeZoneDb for TzDatabase {
    fn contains(&self, name: &str) -> bool {
        name.parse::<Tz>().is_ok()
    }

    fn local_fields(&self, zone: &ZoneId, instant: Instant) -> Result<LocalFields> {
        let tz = Self::resolve(zone.as_str())?;
        let local = instant.to_utc().with_timezone(&tz);

        Ok(LocalFields {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            weekday: local.weekday(),
            hour: local.hour(),
            minute: local.minute(),
            // Leap-second representations report 59 plus >1s nanos.
            second: local.second().min(59),
            utc_offset_seconds: local.offset().fix().local_minus_utc(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Host zone
// ═══════════════════════════════════════════════════════════════════════════

/// Best guess at the host's local zone.
///
/// Tries the `TZ` environment variable, then the `/etc/localtime` symlink
/// target, then falls back to `UTC`.  Never fails.
pub fn host_zone() -> ZoneId {
    let tz_var = std::env::var("TZ").ok();
    let localtime = std::fs::read_link("/etc/localtime").ok();
    host_zone_from(&TzDatabase, tz_var.as_deref(), localtime.as_deref())
}

/// [`host_zone`] with its inputs supplied explicitly.
pub fn host_zone_from(
    db: &dyn TimeZoneDb,
    tz_var: Option<&str>,
    localtime_target: Option<&Path>,
) -> ZoneId {
    let from_env = tz_var
        .map(|v| v.trim().trim_start_matches(':'))
        .filter(|v| !v.is_empty())
        .and_then(|v| db.zone(v).ok());
    if let Some(zone) = from_env {
        return zone;
    }

    let from_link = localtime_target
        .and_then(|p| p.to_str())
        .and_then(|p| p.rsplit_once("zoneinfo/"))
        .and_then(|(_, name)| db.zone(name).ok());

    from_link.unwrap_or_else(ZoneId::utc)
}
