// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Geographic primitives shared by the solar engine.
//!
//! Coordinates are plain `f64` degrees on the equirectangular
//! (longitude, latitude) plane the map renderer draws on.  Angular unit
//! conversion goes through `qtty` so the degree/radian boundary is typed.

use qtty::{Degree, Degrees, Radian, Radians};
use serde::{Deserialize, Serialize};

/// Northern map edge, degrees.
pub const NORTH_EDGE: f64 = 90.0;
/// Southern map edge, degrees.
pub const SOUTH_EDGE: f64 = -90.0;
/// Eastern map edge, degrees.
pub const EAST_EDGE: f64 = 180.0;
/// Western map edge, degrees.
pub const WEST_EDGE: f64 = -180.0;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude in degrees.
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude as a typed angle.
    #[inline]
    pub const fn latitude(&self) -> Degrees {
        Degrees::new(self.lat)
    }

    /// Longitude as a typed angle.
    #[inline]
    pub const fn longitude(&self) -> Degrees {
        Degrees::new(self.lon)
    }

    /// `true` if both coordinates differ by at most `tolerance` degrees.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lon - other.lon).abs() <= tolerance
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

/// The four map corners in the order used to close a curve against the
/// map frame: north-east, south-east, south-west, north-west.
pub const MAP_CORNERS: [GeoPoint; 4] = [
    GeoPoint::new(NORTH_EDGE, EAST_EDGE),
    GeoPoint::new(SOUTH_EDGE, EAST_EDGE),
    GeoPoint::new(SOUTH_EDGE, WEST_EDGE),
    GeoPoint::new(NORTH_EDGE, WEST_EDGE),
];

/// Wrap a longitude into `(-180, 180]`.
pub fn normalize_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return lon;
    }
    let mut wrapped = lon % 360.0;
    if wrapped > EAST_EDGE {
        wrapped -= 360.0;
    }
    if wrapped <= WEST_EDGE {
        wrapped += 360.0;
    }
    wrapped
}

#[inline]
pub(crate) fn to_radians(degrees: f64) -> f64 {
    Degrees::new(degrees).to::<Radian>().value()
}

#[inline]
pub(crate) fn to_degrees(radians: f64) -> f64 {
    Radians::new(radians).to::<Degree>().value()
}
