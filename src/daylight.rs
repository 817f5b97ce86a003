// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Day-side classification and shaded-region polygons.
//!
//! Renderers shade the map by closing each boundary curve in one of two
//! ways:
//!
//! - **bare**: the curve on its own, which on the map encloses the polar
//!   cap on the side of the curve's first (northernmost) point;
//! - **framed**: the curve followed by the four map corners, which
//!   encloses everything else.
//!
//! [`DaylightSide`] records which convention yields the day region for a
//! given instant.  [`classify_daylight_side`] decides it by ray casting the
//! subsolar point against the bare terminator polygon, with longitudes
//! unrolled so the curve is continuous across the antimeridian.
//! [`classify_by_longitude`] keeps the older fixed-range shortcut for
//! comparison only; it is wrong for half of the year.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, MAP_CORNERS};
use crate::solar::SubsolarPoint;
use crate::terminator::{BoundaryCurve, TwilightCurves};

// ═══════════════════════════════════════════════════════════════════════════
// DaylightSide
// ═══════════════════════════════════════════════════════════════════════════

/// Which closing convention of the terminator encloses the day region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaylightSide {
    /// Day is enclosed by the bare terminator curve.
    East,
    /// Day is enclosed by the terminator framed against the map corners.
    West,
}

impl DaylightSide {
    /// The opposite side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}

/// Fixed longitude-range shortcut: `West` when the subsolar longitude lies
/// in `(-90, 90)`, `East` otherwise.
///
/// Ignores the declination entirely, so it disagrees with
/// [`classify_daylight_side`] whenever the Sun's hemisphere does not match
/// the assumed one.  Not used by the pipeline.
pub fn classify_by_longitude(subsolar: &SubsolarPoint) -> DaylightSide {
    if subsolar.longitude > -90.0 && subsolar.longitude < 90.0 {
        DaylightSide::West
    } else {
        DaylightSide::East
    }
}

/// Classify the day side by testing whether the subsolar point lies inside
/// the bare terminator polygon.
///
/// The terminator's longitudes are unrolled into a continuous range and the
/// subsolar longitude is shifted by whole turns into that range before
/// casting the ray.  Curves with fewer than three points cannot bound a
/// region; for those the longitude shortcut is returned.
pub fn classify_daylight_side(subsolar: &SubsolarPoint, terminator: &BoundaryCurve) -> DaylightSide {
    if terminator.len() < 3 {
        return classify_by_longitude(subsolar);
    }

    let ring = unroll_longitudes(terminator.points());
    let (lo, hi) = ring
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.lon), hi.max(p.lon))
        });

    let probe = GeoPoint::new(subsolar.latitude, shift_into_range(subsolar.longitude, lo, hi));
    if point_in_polygon(&probe, &ring) {
        DaylightSide::East
    } else {
        DaylightSide::West
    }
}

/// Remove ±360° jumps between consecutive points so the sequence is
/// continuous in longitude.
fn unroll_longitudes(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut out = Vec::with_capacity(points.len());
    let mut offset = 0.0;
    let mut previous: Option<f64> = None;

    for p in points {
        if let Some(prev) = previous {
            let delta = p.lon - prev;
            if delta > 180.0 {
                offset -= 360.0;
            } else if delta < -180.0 {
                offset += 360.0;
            }
        }
        previous = Some(p.lon);
        out.push(GeoPoint::new(p.lat, p.lon + offset));
    }
    out
}

fn shift_into_range(lon: f64, lo: f64, hi: f64) -> f64 {
    let mut shifted = lon;
    // Bounded: an unrolled terminator spans at most a few turns.
    for _ in 0..4 {
        if shifted < lo {
            shifted += 360.0;
        } else if shifted > hi {
            shifted -= 360.0;
        } else {
            break;
        }
    }
    shifted
}

/// Crossing-number test on the (lon, lat) plane.  The ring is implicitly
/// closed from its last point back to its first.
pub fn point_in_polygon(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let crossing = a.lon + (point.lat - a.lat) * (b.lon - a.lon) / (b.lat - a.lat);
            if point.lon < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

// ═══════════════════════════════════════════════════════════════════════════
// Shaded regions
// ═══════════════════════════════════════════════════════════════════════════

/// Closed polygons for each shaded region, ready for a map renderer.
///
/// Twilight bands are the outer limit followed by the inner limit walked
/// backwards (or the reverse, depending on the day side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadingLayers {
    /// Full daylight.
    pub day: Vec<GeoPoint>,
    /// Sun 0°–6° below the horizon.
    pub civil: Vec<GeoPoint>,
    /// Sun 6°–12° below the horizon.
    pub nautical: Vec<GeoPoint>,
    /// Sun 12°–18° below the horizon.
    pub astronomical: Vec<GeoPoint>,
    /// Sun more than 18° below the horizon.
    pub night: Vec<GeoPoint>,
}

impl ShadingLayers {
    /// Build the five regions from the four limits.
    pub fn build(curves: &TwilightCurves, side: DaylightSide) -> Self {
        let TwilightCurves {
            terminator,
            civil,
            nautical,
            astronomical,
        } = curves;

        match side {
            DaylightSide::West => Self {
                day: framed(terminator),
                civil: band(civil, terminator),
                nautical: band(nautical, civil),
                astronomical: band(astronomical, nautical),
                night: astronomical.points().to_vec(),
            },
            DaylightSide::East => Self {
                day: terminator.points().to_vec(),
                civil: band(terminator, civil),
                nautical: band(civil, nautical),
                astronomical: band(nautical, astronomical),
                night: framed(astronomical),
            },
        }
    }
}

/// `forward` then `backward` reversed.
fn band(forward: &BoundaryCurve, backward: &BoundaryCurve) -> Vec<GeoPoint> {
    forward
        .iter()
        .chain(backward.iter_rev())
        .copied()
        .collect()
}

/// The curve, the map corners, then the curve's first point again.
fn framed(curve: &BoundaryCurve) -> Vec<GeoPoint> {
    let mut ring: Vec<GeoPoint> = curve.iter().copied().chain(MAP_CORNERS).collect();
    if let Some(first) = curve.first() {
        ring.push(*first);
    }
    ring
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
