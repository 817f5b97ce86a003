// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Subsolar point and the solar geometry pipeline.
//!
//! The model is low precision (about one degree), matching a
//! map visualisation rather than an ephemeris:
//!
//! - **Declination**: single harmonic, `23.45° · sin(b)`.
//! - **Equation of time** (minutes): `9.87 sin 2b − 7.53 cos b − 1.5 sin b`.
//! - **Subsolar longitude**: `15° · (12 − UTC hours) − EoT / 4`.
//!
//! where `b = 2π / 365 · (day_of_year − 81)`.  No leap-year or refraction
//! correction is applied.
//!
//! [`SolarGeometryEngine`] bundles the tunables (curve step, transition
//! fraction) and runs the whole per-tick pipeline in
//! [`SolarGeometryEngine::compute_frame`].

use qtty::{Days, Degrees, Simplify};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::daylight::{classify_daylight_side, DaylightSide, ShadingLayers};
use crate::geo::{normalize_longitude, GeoPoint};
use crate::instant::Instant;
use crate::terminator::{
    build_transition_curve, compute_boundary_curve, BoundaryCurve, TransitionCurves,
    TwilightBand, TwilightCurves, DEFAULT_CURVE_STEP,
};

/// Peak solar declination used by the single-harmonic model.
pub const MAX_DECLINATION: Degrees = Degrees::new(23.45);

/// Day of year treated as the March equinox.
const EQUINOX_DAY: Days = Days::new(81.0);

/// Length of the model year.
const MODEL_YEAR: Days = Days::new(365.0);

/// Degrees of Earth rotation per hour.
const DEGREES_PER_HOUR: f64 = 15.0;

/// Default blend fraction between adjacent twilight limits.
pub const DEFAULT_TRANSITION_FRACTION: f64 = 0.3;

// ═══════════════════════════════════════════════════════════════════════════
// Subsolar point
// ═══════════════════════════════════════════════════════════════════════════

/// The point on Earth where the Sun is directly overhead.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsolarPoint {
    /// Latitude (declination) in degrees, within `[-23.45, 23.45]`.
    pub latitude: f64,
    /// Longitude in degrees, within `(-180, 180]`.
    pub longitude: f64,
}

impl SubsolarPoint {
    /// Create a subsolar point from degrees.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude as a typed angle.
    #[inline]
    pub const fn declination(&self) -> Degrees {
        Degrees::new(self.latitude)
    }

    /// The same location as a [`GeoPoint`] (for the sun marker).
    #[inline]
    pub const fn as_geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Seasonal phase angle `b = 2π / 365 · (day_of_year − 81)` in radians.
fn seasonal_phase(day_of_year: u32) -> f64 {
    let since_equinox = Days::new(f64::from(day_of_year)) - EQUINOX_DAY;
    TAU * (since_equinox / MODEL_YEAR).simplify().value()
}

/// Solar declination for a UTC day of year.
pub fn solar_declination(day_of_year: u32) -> Degrees {
    Degrees::new(MAX_DECLINATION.value() * seasonal_phase(day_of_year).sin())
}

/// Equation of time for a UTC day of year, in minutes.
///
/// Positive values mean the apparent Sun runs ahead of mean time.
pub fn equation_of_time_minutes(day_of_year: u32) -> f64 {
    let b = seasonal_phase(day_of_year);
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Compute the subsolar point for `instant`.
///
/// Total: every instant yields a point.  The longitude is wrapped into
/// `(-180, 180]`.
pub fn compute_subsolar_point(instant: Instant) -> SubsolarPoint {
    let day = instant.day_of_year();
    let declination = solar_declination(day);
    let eot = equation_of_time_minutes(day);
    let longitude = DEGREES_PER_HOUR * (12.0 - instant.utc_hours()) - eot / 4.0;

    SubsolarPoint::new(declination.value(), normalize_longitude(longitude))
}

// ═══════════════════════════════════════════════════════════════════════════
// SolarGeometryEngine
// ═══════════════════════════════════════════════════════════════════════════

/// Everything a map renderer needs for one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarFrame {
    /// The instant the frame was computed for.
    pub instant: Instant,
    /// Sun marker position.
    pub subsolar: SubsolarPoint,
    /// The four depression limits.
    pub curves: TwilightCurves,
    /// Blends between adjacent limits.
    pub transitions: TransitionCurves,
    /// Which closing convention puts the subsolar point on the day side.
    pub day_side: DaylightSide,
    /// Closed polygons for each shaded region.
    pub layers: ShadingLayers,
}

/// Stateless solar geometry pipeline with its tunables.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SolarGeometryEngine {
    curve_step: f64,
    transition_fraction: f64,
}

impl Default for SolarGeometryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CURVE_STEP, DEFAULT_TRANSITION_FRACTION)
    }
}

impl SolarGeometryEngine {
    /// Create an engine with the given bearing step (degrees) and blend
    /// fraction.
    pub const fn new(curve_step: f64, transition_fraction: f64) -> Self {
        Self {
            curve_step,
            transition_fraction,
        }
    }

    /// Bearing step between curve points, degrees.
    pub const fn curve_step(&self) -> f64 {
        self.curve_step
    }

    /// Fraction used when blending adjacent limits.
    pub const fn transition_fraction(&self) -> f64 {
        self.transition_fraction
    }

    /// See [`compute_subsolar_point`].
    pub fn compute_subsolar_point(&self, instant: Instant) -> SubsolarPoint {
        compute_subsolar_point(instant)
    }

    /// See [`compute_boundary_curve`]; uses this engine's step.
    pub fn compute_boundary_curve(
        &self,
        subsolar: &SubsolarPoint,
        depression_degrees: f64,
    ) -> BoundaryCurve {
        compute_boundary_curve(subsolar, depression_degrees, self.curve_step)
    }

    /// Classify the day side by testing the subsolar point against its own
    /// terminator.  See [`classify_daylight_side`].
    pub fn classify_daylight_side(&self, subsolar: &SubsolarPoint) -> DaylightSide {
        let terminator =
            self.compute_boundary_curve(subsolar, TwilightBand::Terminator.depression_degrees());
        classify_daylight_side(subsolar, &terminator)
    }

    /// See [`build_transition_curve`].
    pub fn build_transition_curve(
        &self,
        outer: &BoundaryCurve,
        inner: &BoundaryCurve,
        fraction: f64,
    ) -> BoundaryCurve {
        build_transition_curve(outer, inner, fraction)
    }

    /// Run the full pipeline for one instant: subsolar point, four limits,
    /// three blends, day-side classification and shaded polygons.
    pub fn compute_frame(&self, instant: Instant) -> SolarFrame {
        let subsolar = compute_subsolar_point(instant);
        let curves = TwilightCurves::compute(&subsolar, self.curve_step);
        let transitions = TransitionCurves::build(&curves, self.transition_fraction);
        let day_side = classify_daylight_side(&subsolar, &curves.terminator);
        let layers = ShadingLayers::build(&curves, day_side);

        SolarFrame {
            instant,
            subsolar,
            curves,
            transitions,
            day_side,
            layers,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
