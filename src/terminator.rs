// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Day/night boundary curves.
//!
//! A [`BoundaryCurve`] is the locus of points where the Sun sits at a fixed
//! depression angle below the horizon: a small circle of angular radius
//! `90° + depression` centred on the subsolar point.  The circle is
//! parametrised by bearing `θ` from the subsolar point and solved with the
//! spherical-triangle relations
//!
//! ```text
//! lat = asin( sin φs · cos r + cos φs · sin r · cos θ )
//! lon = λs + atan2( sin θ · sin r · cos φs , cos r − sin φs · sin lat )
//! ```
//!
//! | Band | Depression |
//! |------|------------|
//! | [`TwilightBand::Terminator`] | 0° |
//! | [`TwilightBand::Civil`] | 6° |
//! | [`TwilightBand::Nautical`] | 12° |
//! | [`TwilightBand::Astronomical`] | 18° |

use serde::{Deserialize, Serialize};

use crate::geo::{normalize_longitude, to_degrees, to_radians, GeoPoint};
use crate::solar::SubsolarPoint;

/// Default bearing step between successive curve points, degrees.
pub const DEFAULT_CURVE_STEP: f64 = 5.0;

/// Smallest bearing step honoured; finer, zero, negative or `NaN` steps use
/// this one.
pub const MIN_CURVE_STEP: f64 = 0.01;

/// Absorbs float noise in `360 / step` before taking the ceiling.
const STEP_COUNT_EPSILON: f64 = 1e-9;

// ═══════════════════════════════════════════════════════════════════════════
// TwilightBand
// ═══════════════════════════════════════════════════════════════════════════

/// The four standard solar depression limits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwilightBand {
    /// Geometric sunrise/sunset line (0°).
    Terminator,
    /// Civil twilight limit (6°).
    Civil,
    /// Nautical twilight limit (12°).
    Nautical,
    /// Astronomical twilight limit (18°).
    Astronomical,
}

impl TwilightBand {
    /// All bands, from the day side outwards.
    pub const ALL: [Self; 4] = [
        Self::Terminator,
        Self::Civil,
        Self::Nautical,
        Self::Astronomical,
    ];

    /// Depression of the Sun below the horizon at this limit, degrees.
    pub const fn depression_degrees(self) -> f64 {
        match self {
            Self::Terminator => 0.0,
            Self::Civil => 6.0,
            Self::Nautical => 12.0,
            Self::Astronomical => 18.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BoundaryCurve
// ═══════════════════════════════════════════════════════════════════════════

/// An ordered sequence of points approximating a constant-depression locus.
///
/// Order matters: point `i` lies at bearing `i · step` from the subsolar
/// point, and renderers close polygons by walking the curve in this order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryCurve {
    points: Vec<GeoPoint>,
}

impl BoundaryCurve {
    /// Wrap an existing point sequence.
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// The points in walking order.
    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` if the curve has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any.
    pub fn first(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    /// Iterate over the points in walking order.
    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }

    /// Iterate over the points in reverse walking order.
    pub fn iter_rev(&self) -> std::iter::Rev<std::slice::Iter<'_, GeoPoint>> {
        self.points.iter().rev()
    }

    /// Consume the curve, returning its points.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    /// `true` if every point of both curves agrees within `tolerance` degrees.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

impl<'a> IntoIterator for &'a BoundaryCurve {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Number of points produced for a given bearing step:
/// `⌈360 / step⌉ + 1`, with `step` raised to at least [`MIN_CURVE_STEP`].
pub fn curve_point_count(step_degrees: f64) -> usize {
    let step_degrees = step_degrees.max(MIN_CURVE_STEP);
    let segments = (360.0 / step_degrees - STEP_COUNT_EPSILON).ceil().max(1.0);
    segments as usize + 1
}

/// Compute the constant-depression curve around `subsolar`.
///
/// `depression_degrees = 0` yields the terminator; `6`, `12` and `18` the
/// civil, nautical and astronomical twilight limits.  Bearings run
/// `θᵢ = i · step` for `i = 0 ..= ⌈360 / step⌉`, so the first and last
/// points coincide only when `step` divides 360.  Longitudes are wrapped
/// into `(-180, 180]`.
///
/// When the curve passes through a pole (the terminator at zero
/// declination) the first and last points share the pole's latitude but
/// their longitudes are arbitrary, so they coincide geometrically without
/// matching elementwise.
///
/// Precondition (not checked): `0 ≤ depression_degrees ≤ 90`; other values
/// produce curves with no physical meaning.  `step_degrees` is raised to
/// at least [`MIN_CURVE_STEP`].
pub fn compute_boundary_curve(
    subsolar: &SubsolarPoint,
    depression_degrees: f64,
    step_degrees: f64,
) -> BoundaryCurve {
    let sun_lat = to_radians(subsolar.latitude);
    let sun_lon = to_radians(subsolar.longitude);
    let radius = to_radians(90.0 + depression_degrees);
    let step_degrees = step_degrees.max(MIN_CURVE_STEP);

    let (sin_sun_lat, cos_sun_lat) = sun_lat.sin_cos();
    let (sin_r, cos_r) = radius.sin_cos();

    let count = curve_point_count(step_degrees);
    let points = (0..count)
        .map(|i| {
            let theta = to_radians(i as f64 * step_degrees);
            let (sin_t, cos_t) = theta.sin_cos();

            let lat = (sin_sun_lat * cos_r + cos_sun_lat * sin_r * cos_t)
                .clamp(-1.0, 1.0)
                .asin();
            let lon = sun_lon + (sin_t * sin_r * cos_sun_lat).atan2(cos_r - sin_sun_lat * lat.sin());

            GeoPoint::new(to_degrees(lat), normalize_longitude(to_degrees(lon)))
        })
        .collect();

    BoundaryCurve { points }
}

/// Blend two curves point by point.
///
/// Point `i` of the result is `outer[i] + (inner[i] − outer[i]) · fraction`
/// on both coordinates.  The result has `min(len(outer), len(inner))`
/// points: the longer curve is truncated, never padded or wrapped.  This
/// is a cheap visual blend between bands, not a geodesic interpolation, so
/// it makes no attempt to unwrap longitudes across the antimeridian.
pub fn build_transition_curve(
    outer: &BoundaryCurve,
    inner: &BoundaryCurve,
    fraction: f64,
) -> BoundaryCurve {
    let points = outer
        .iter()
        .zip(inner.iter())
        .map(|(o, i)| {
            GeoPoint::new(
                o.lat + (i.lat - o.lat) * fraction,
                o.lon + (i.lon - o.lon) * fraction,
            )
        })
        .collect();
    BoundaryCurve { points }
}

// ═══════════════════════════════════════════════════════════════════════════
// TwilightCurves
// ═══════════════════════════════════════════════════════════════════════════

/// The four standard limits computed for one subsolar point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwilightCurves {
    /// 0° depression.
    pub terminator: BoundaryCurve,
    /// 6° depression.
    pub civil: BoundaryCurve,
    /// 12° depression.
    pub nautical: BoundaryCurve,
    /// 18° depression.
    pub astronomical: BoundaryCurve,
}

impl TwilightCurves {
    /// Compute all four limits with the given bearing step.
    pub fn compute(subsolar: &SubsolarPoint, step_degrees: f64) -> Self {
        let curve = |band: TwilightBand| {
            compute_boundary_curve(subsolar, band.depression_degrees(), step_degrees)
        };
        Self {
            terminator: curve(TwilightBand::Terminator),
            civil: curve(TwilightBand::Civil),
            nautical: curve(TwilightBand::Nautical),
            astronomical: curve(TwilightBand::Astronomical),
        }
    }

    /// Curve for a given band.
    pub fn get(&self, band: TwilightBand) -> &BoundaryCurve {
        match band {
            TwilightBand::Terminator => &self.terminator,
            TwilightBand::Civil => &self.civil,
            TwilightBand::Nautical => &self.nautical,
            TwilightBand::Astronomical => &self.astronomical,
        }
    }
}

/// Blends drawn between adjacent bands, each from the darker limit towards
/// the lighter one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionCurves {
    /// Astronomical → nautical.
    pub astronomical_nautical: BoundaryCurve,
    /// Nautical → civil.
    pub nautical_civil: BoundaryCurve,
    /// Civil → terminator.
    pub civil_day: BoundaryCurve,
}

impl TransitionCurves {
    /// Build the three inter-band blends at `fraction`.
    pub fn build(curves: &TwilightCurves, fraction: f64) -> Self {
        Self {
            astronomical_nautical: build_transition_curve(
                &curves.astronomical,
                &curves.nautical,
                fraction,
            ),
            nautical_civil: build_transition_curve(&curves.nautical, &curves.civil, fraction),
            civil_day: build_transition_curve(&curves.civil, &curves.terminator, fraction),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sun(lat: f64, lon: f64) -> SubsolarPoint {
        SubsolarPoint::new(lat, lon)
    }

    /// Great-circle distance in degrees.
    fn angular_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
        let (la, lb) = (to_radians(a.lat), to_radians(b.lat));
        let dl = to_radians(b.lon - a.lon);
        let c = la.sin() * lb.sin() + la.cos() * lb.cos() * dl.cos();
        to_degrees(c.clamp(-1.0, 1.0).acos())
    }

    #[test]
    fn test_point_count() {
        assert_eq!(curve_point_count(5.0), 73);
        assert_eq!(curve_point_count(7.0), 53);
        assert_eq!(curve_point_count(360.0), 2);
        assert_eq!(curve_point_count(0.1), 3601);
        assert_eq!(compute_boundary_curve(&sun(10.0, 20.0), 0.0, 5.0).len(), 73);
        assert_eq!(compute_boundary_curve(&sun(10.0, 20.0), 0.0, 7.0).len(), 53);
    }

    #[test]
    fn test_degenerate_steps_use_minimum() {
        let floor = curve_point_count(MIN_CURVE_STEP);
        assert_eq!(floor, 36_001);
        for step in [0.0, -5.0, 1e-300, f64::NAN] {
            assert_eq!(curve_point_count(step), floor, "{step}");
        }
        let curve = compute_boundary_curve(&sun(10.0, 20.0), 0.0, 0.0);
        assert_eq!(curve.len(), floor);
        assert!(curve.iter().all(|p| p.lat.is_finite() && p.lon.is_finite()));
    }

    #[test]
    fn test_polar_endpoints_at_zero_declination() {
        let curve = compute_boundary_curve(&sun(0.0, 30.0), 0.0, 5.0);
        let first = curve.first().unwrap();
        let last = curve.points().last().unwrap();
        assert!((first.lat - 90.0).abs() < 1e-6);
        assert!((last.lat - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_closure_only_when_step_divides_circle() {
        let s = sun(15.0, -40.0);
        let closed = compute_boundary_curve(&s, 6.0, 5.0);
        let first = closed.first().unwrap();
        let last = closed.points().last().unwrap();
        assert!(first.approx_eq(last, 1e-6));

        let open = compute_boundary_curve(&s, 6.0, 7.0);
        let first = open.first().unwrap();
        let last = open.points().last().unwrap();
        assert!(!first.approx_eq(last, 1e-3));
    }

    #[test]
    fn test_points_lie_on_the_small_circle() {
        let s = sun(23.0, 35.0);
        let centre = GeoPoint::new(s.latitude, s.longitude);
        for band in TwilightBand::ALL {
            let curve = compute_boundary_curve(&s, band.depression_degrees(), 5.0);
            for p in &curve {
                let d = angular_distance(&centre, p);
                assert!(
                    (d - (90.0 + band.depression_degrees())).abs() < 1e-6,
                    "{band:?}: distance {d}"
                );
            }
        }
    }

    #[test]
    fn test_coordinates_within_range() {
        for &(lat, lon) in &[(23.45, 180.0), (-23.45, -179.9), (0.0, 0.0), (12.0, 95.0)] {
            for band in TwilightBand::ALL {
                let curve = compute_boundary_curve(&sun(lat, lon), band.depression_degrees(), 5.0);
                for p in &curve {
                    assert!(p.lon > -180.0 && p.lon <= 180.0, "lon {}", p.lon);
                    assert!((-90.0..=90.0).contains(&p.lat), "lat {}", p.lat);
                }
            }
        }
    }

    #[test]
    fn test_first_point_is_northern_extreme() {
        // θ = 0 points due north of the subsolar point.
        let s = sun(20.0, 10.0);
        let curve = compute_boundary_curve(&s, 0.0, 5.0);
        let first = curve.first().unwrap();
        assert!((first.lat - 70.0).abs() < 1e-9);
        assert!((first.lon - (-170.0)).abs() < 1e-9);
        let max_lat = curve.iter().map(|p| p.lat).fold(f64::MIN, f64::max);
        assert!((max_lat - first.lat).abs() < 1e-9);
    }

    #[test]
    fn test_twilight_curves_shrink_the_day_cap() {
        let s = sun(20.0, 0.0);
        let curves = TwilightCurves::compute(&s, 5.0);
        // Due north, deeper limits reach further past the pole.
        assert!(curves.civil.points()[0].lat < curves.terminator.points()[0].lat);
        assert!(curves.astronomical.points()[0].lat < curves.nautical.points()[0].lat);
        assert_eq!(curves.get(TwilightBand::Nautical), &curves.nautical);
    }

    #[test]
    fn test_transition_identity_and_endpoints() {
        let s = sun(-10.0, 60.0);
        let a = compute_boundary_curve(&s, 12.0, 5.0);
        let b = compute_boundary_curve(&s, 6.0, 5.0);

        for f in [0.0, 0.3, 0.5, 1.0] {
            assert!(build_transition_curve(&a, &a, f).approx_eq(&a, 1e-12));
        }
        assert!(build_transition_curve(&a, &b, 0.0).approx_eq(&a, 1e-12));
        assert!(build_transition_curve(&a, &b, 1.0).approx_eq(&b, 1e-9));
    }

    #[test]
    fn test_transition_truncates_to_shorter() {
        let s = sun(5.0, 5.0);
        let coarse = compute_boundary_curve(&s, 0.0, 10.0);
        let fine = compute_boundary_curve(&s, 6.0, 5.0);
        assert_eq!(build_transition_curve(&coarse, &fine, 0.3).len(), coarse.len());
        assert_eq!(build_transition_curve(&fine, &coarse, 0.3).len(), coarse.len());
        assert!(build_transition_curve(&fine, &BoundaryCurve::default(), 0.3).is_empty());
    }

    #[test]
    fn test_transition_midpoint() {
        let a = BoundaryCurve::from_points(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 20.0)]);
        let b = BoundaryCurve::from_points(vec![GeoPoint::new(10.0, 10.0), GeoPoint::new(20.0, 40.0)]);
        let mid = build_transition_curve(&a, &b, 0.5);
        assert_eq!(mid.points(), &[GeoPoint::new(5.0, 5.0), GeoPoint::new(15.0, 30.0)]);
    }

    #[test]
    fn test_transition_set_has_three_blends() {
        let curves = TwilightCurves::compute(&sun(0.5, 0.0), 5.0);
        let t = TransitionCurves::build(&curves, 0.3);
        assert_eq!(t.astronomical_nautical.len(), 73);
        assert_eq!(t.nautical_civil.len(), 73);
        assert_eq!(t.civil_day.len(), 73);
    }
}
