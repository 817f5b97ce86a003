// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! World-city time labels shown on the map.
//!
//! Refreshed by the slow tick.  Each label is the city's current zone-local
//! time as `HH:MM`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::LocaleFormatter;
use crate::geo::GeoPoint;
use crate::instant::Instant;
use crate::zone::{TimeZoneDb, ZoneId};

/// A fixed map location with its zone.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldCity {
    pub name: &'static str,
    pub location: GeoPoint,
    pub timezone: &'static str,
}

impl WorldCity {
    const fn new(name: &'static str, lat: f64, lon: f64, timezone: &'static str) -> Self {
        Self {
            name,
            location: GeoPoint::new(lat, lon),
            timezone,
        }
    }
}

/// The cities labelled on the map.
pub const WORLD_CITIES: [WorldCity; 12] = [
    WorldCity::new("London", 51.5074, -0.1278, "Europe/London"),
    WorldCity::new("New York", 40.7128, -74.0060, "America/New_York"),
    WorldCity::new("Los Angeles", 34.0522, -118.2437, "America/Los_Angeles"),
    WorldCity::new("Tokyo", 35.6762, 139.6503, "Asia/Tokyo"),
    WorldCity::new("Sydney", -33.8688, 151.2093, "Australia/Sydney"),
    WorldCity::new("Dubai", 25.2048, 55.2708, "Asia/Dubai"),
    WorldCity::new("Paris", 48.8566, 2.3522, "Europe/Paris"),
    WorldCity::new("Moscow", 55.7558, 37.6173, "Europe/Moscow"),
    WorldCity::new("Beijing", 39.9042, 116.4074, "Asia/Shanghai"),
    WorldCity::new("Rio", -22.9068, -43.1729, "America/Sao_Paulo"),
    WorldCity::new("Delhi", 28.6139, 77.2090, "Asia/Kolkata"),
    WorldCity::new("Cairo", 30.0444, 31.2357, "Africa/Cairo"),
];

/// A city marker with its current local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLabel {
    pub name: String,
    pub location: GeoPoint,
    /// `HH:MM`, 24-hour.
    pub time: String,
}

/// Compute labels for every city in `cities` at `instant`.
pub fn city_labels(
    cities: &[WorldCity],
    instant: Instant,
    db: &dyn TimeZoneDb,
    formatter: &dyn LocaleFormatter,
) -> Result<Vec<CityLabel>> {
    cities
        .iter()
        .map(|city| {
            let zone = db.zone(city.timezone)?;
            let fields = db.local_fields(&zone, instant)?;
            Ok(CityLabel {
                name: city.name.to_owned(),
                location: city.location,
                time: formatter.short_time(&fields),
            })
        })
        .collect()
}

/// Zone of a city as a validated identifier.
pub fn city_zone(city: &WorldCity, db: &dyn TimeZoneDb) -> Result<ZoneId> {
    db.zone(city.timezone)
}
