// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Per-timezone clock math.
//!
//! [`ClockTimeEngine::compute_reading`] decomposes an [`Instant`] into
//! zone-local fields and analog hand angles.  Hands sweep rather than tick:
//! each one carries the fractional progress of the next finer unit.
//!
//! ```text
//! hour   = (hour mod 12) · 30° + minute · 0.5°
//! minute = minute · 6°         + second · 0.1°
//! second = second · 6°         + millisecond · 0.006°
//! ```
//!
//! The millisecond comes from the instant itself, since no zone offset has
//! a sub-second component.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::{ClockLabels, LocaleFormatter};
use crate::instant::Instant;
use crate::zone::{LocalFields, TimeZoneDb, TzDatabase, ZoneId};

/// Analog hand rotations, degrees clockwise from 12 o'clock, in `[0, 360)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandAngles {
    /// Hour hand, advancing with minutes and seconds.
    pub hour: f64,
    /// Minute hand, advancing with seconds.
    pub minute: f64,
    /// Second hand, sweeping with milliseconds.
    pub second: f64,
}

impl HandAngles {
    /// Apply the sweeping-hand formulas.
    pub fn from_components(hour: u32, minute: u32, second: u32, millisecond: u32) -> Self {
        let (h, m, s, ms) = (
            f64::from(hour % 12),
            f64::from(minute),
            f64::from(second),
            f64::from(millisecond),
        );
        Self {
            hour: h * 30.0 + m * 0.5,
            minute: m * 6.0 + s * 0.1,
            second: s * 6.0 + ms * 0.006,
        }
    }
}

/// One clock face at one instant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockReading {
    /// Zone-local hour, 24-hour.
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Absolute sub-second component, `0..=999`.
    pub millisecond: u32,
    /// Full zone-local calendar fields, for formatting.
    pub local: LocalFields,
    pub hands: HandAngles,
}

impl ClockReading {
    /// Render the display strings with `formatter`.
    pub fn labels(&self, formatter: &dyn LocaleFormatter) -> ClockLabels {
        formatter.labels(&self.local)
    }
}

/// Converts instants into zone-local clock readings.
#[derive(Debug, Clone, Default)]
pub struct ClockTimeEngine<D: TimeZoneDb = TzDatabase> {
    db: D,
}

impl ClockTimeEngine<TzDatabase> {
    /// An engine backed by the bundled IANA database.
    pub fn new() -> Self {
        Self { db: TzDatabase }
    }
}

impl<D: TimeZoneDb> ClockTimeEngine<D> {
    /// An engine backed by a custom database.
    pub fn with_database(db: D) -> Self {
        Self { db }
    }

    /// The database used to resolve zones.
    pub fn database(&self) -> &D {
        &self.db
    }

    /// Compute the reading of `zone` at `instant`.
    ///
    /// # Errors
    ///
    /// [`InvalidTimezone`](crate::GeochronError::InvalidTimezone) if this
    /// engine's database does not know `zone`.
    pub fn compute_reading(&self, instant: Instant, zone: &ZoneId) -> Result<ClockReading> {
        let local = self.db.local_fields(zone, instant)?;
        let millisecond = instant.subsec_millis();

        Ok(ClockReading {
            hour: local.hour,
            minute: local.minute,
            second: local.second,
            millisecond,
            hands: HandAngles::from_components(local.hour, local.minute, local.second, millisecond),
            local,
        })
    }
}
