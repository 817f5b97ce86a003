// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Geochron
//!
//! Solar geometry and multi-timezone clock math for a world clock with a
//! day/night map.  Everything here produces plain data for a renderer; no
//! drawing happens in this crate.
//!
//! # Core types
//!
//! - [`Instant`]: absolute UTC instant, the sole time input.
//! - [`SolarGeometryEngine`]: subsolar point, twilight boundary curves,
//!   day-side classification and shaded polygons ([`SolarFrame`]).
//! - [`ClockTimeEngine`]: zone-local fields and analog hand angles
//!   ([`ClockReading`]).
//! - [`ClockRegistry`]: the configured clocks and their
//!   [`RegistrySnapshot`].
//! - [`UpdateScheduler`]: continuous and slow ticks over an injectable
//!   [`TimeSource`], delivering to a [`FrameSink`].
//!
//! # Boundary curves
//!
//! | Band                        | Depression |
//! |-----------------------------|------------|
//! | [`TwilightBand::Terminator`]   | 0°  |
//! | [`TwilightBand::Civil`]        | 6°  |
//! | [`TwilightBand::Nautical`]     | 12° |
//! | [`TwilightBand::Astronomical`] | 18° |
//!
//! # Collaborators
//!
//! The crate consumes three contracts and ships default implementations:
//! [`SnapshotStore`] ([`MemoryStore`], [`JsonFileStore`]),
//! [`LocaleFormatter`] ([`EnGbFormatter`]) and [`TimeZoneDb`]
//! ([`TzDatabase`]).

pub mod cities;
pub mod clock;
pub mod config;
pub mod daylight;
mod error;
pub mod format;
pub mod geo;
pub mod instant;
pub mod persistence;
pub mod registry;
pub mod scheduler;
pub mod solar;
pub mod terminator;
pub mod zone;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use cities::{city_labels, CityLabel, WorldCity, WORLD_CITIES};
pub use clock::{ClockReading, ClockTimeEngine, HandAngles};
pub use config::GeochronConfig;
pub use daylight::{classify_by_longitude, classify_daylight_side, DaylightSide, ShadingLayers};
pub use error::{GeochronError, Result};
pub use format::{ClockLabels, EnGbFormatter, LocaleFormatter};
pub use geo::{normalize_longitude, GeoPoint, MAP_CORNERS};
pub use instant::{seconds_to_delta, Instant};
pub use persistence::{JsonFileStore, MemoryStore, SnapshotStore};
pub use registry::{
    ClockConfig, ClockId, ClockRegistry, RegistrySnapshot, RestoreOutcome, MAX_NEXT_ID,
};
pub use scheduler::{
    Activity, ActivityState, ClockFrame, FrameSink, ManualTimeSource, MapStatus,
    SystemTimeSource, TickReport, TimeSource, UpdateScheduler,
};
pub use solar::{
    compute_subsolar_point, equation_of_time_minutes, solar_declination, SolarFrame,
    SolarGeometryEngine, SubsolarPoint,
};
pub use terminator::{
    build_transition_curve, compute_boundary_curve, BoundaryCurve, TransitionCurves,
    TwilightBand, TwilightCurves,
};
pub use zone::{host_zone, LocalFields, TimeZoneDb, TzDatabase, ZoneId};
