// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Tunables loaded from YAML.
//!
//! Every field is optional; an empty document yields the defaults below.
//!
//! ```yaml
//! solar:
//!   curve_step_degrees: 5.0
//!   transition_fraction: 0.3
//! scheduler:
//!   frame_interval_ms: 16
//!   city_refresh_secs: 30
//! clocks:
//!   default_timezone: Europe/London   # host zone when absent
//!   snapshot_path: clocks.json        # in-memory only when absent
//! ```

use std::path::{Path, PathBuf};

use qtty::Seconds;
use serde::Deserialize;
use tracing::info;

use crate::error::{GeochronError, Result};
use crate::solar::{SolarGeometryEngine, DEFAULT_TRANSITION_FRACTION};
use crate::terminator::{DEFAULT_CURVE_STEP, MIN_CURVE_STEP};
use crate::zone::{host_zone, ZoneId};

/// Longest accepted continuous tick period, one minute.
pub const MAX_FRAME_INTERVAL_MS: u64 = 60_000;

/// Longest accepted slow tick period, one day.
pub const MAX_CITY_REFRESH_SECS: u64 = 86_400;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeochronConfig {
    #[serde(default)]
    pub solar: SolarConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub clocks: ClocksConfig,
}

impl GeochronConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and that the default zone, if any, is known.
    pub fn validate(&self) -> Result<()> {
        let step = self.solar.curve_step_degrees;
        if !(MIN_CURVE_STEP..=360.0).contains(&step) {
            return Err(invalid(format!(
                "curve_step_degrees must be in [{MIN_CURVE_STEP}, 360], got {step}"
            )));
        }
        let fraction = self.solar.transition_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(invalid(format!(
                "transition_fraction must be in [0, 1], got {fraction}"
            )));
        }
        let frame = self.scheduler.frame_interval_ms;
        if !(1..=MAX_FRAME_INTERVAL_MS).contains(&frame) {
            return Err(invalid(format!(
                "frame_interval_ms must be in [1, {MAX_FRAME_INTERVAL_MS}], got {frame}"
            )));
        }
        let refresh = self.scheduler.city_refresh_secs;
        if !(1..=MAX_CITY_REFRESH_SECS).contains(&refresh) {
            return Err(invalid(format!(
                "city_refresh_secs must be in [1, {MAX_CITY_REFRESH_SECS}], got {refresh}"
            )));
        }
        if let Some(name) = &self.clocks.default_timezone {
            ZoneId::parse(name)?;
        }
        Ok(())
    }

    /// A solar engine with the configured tunables.
    pub fn engine(&self) -> SolarGeometryEngine {
        SolarGeometryEngine::new(
            self.solar.curve_step_degrees,
            self.solar.transition_fraction,
        )
    }

    /// Zone of the clock created on first run or after a corrupt restore.
    pub fn default_zone(&self) -> ZoneId {
        self.clocks
            .default_timezone
            .as_deref()
            .and_then(|name| ZoneId::parse(name).ok())
            .unwrap_or_else(host_zone)
    }
}

fn invalid(reason: impl Into<String>) -> GeochronError {
    GeochronError::InvalidConfig {
        reason: reason.into(),
    }
}

// ── sections ──────────────────────────────────────────────────────────────

/// Solar geometry tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolarConfig {
    /// Bearing step between boundary-curve points, degrees.
    #[serde(default = "default_curve_step")]
    pub curve_step_degrees: f64,

    /// Blend fraction for transition curves.
    #[serde(default = "default_transition_fraction")]
    pub transition_fraction: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            curve_step_degrees: default_curve_step(),
            transition_fraction: default_transition_fraction(),
        }
    }
}

fn default_curve_step() -> f64 {
    DEFAULT_CURVE_STEP
}

fn default_transition_fraction() -> f64 {
    DEFAULT_TRANSITION_FRACTION
}

/// Tick periods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Continuous tick period (display refresh), milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Slow tick period (city labels), seconds.
    #[serde(default = "default_city_refresh_secs")]
    pub city_refresh_secs: u64,
}

impl SchedulerConfig {
    /// Continuous tick period.
    pub fn frame_interval(&self) -> Seconds {
        Seconds::new(self.frame_interval_ms as f64 / 1_000.0)
    }

    /// Slow tick period.
    pub fn city_refresh(&self) -> Seconds {
        Seconds::new(self.city_refresh_secs as f64)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            city_refresh_secs: default_city_refresh_secs(),
        }
    }
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_city_refresh_secs() -> u64 {
    30
}

/// Clock registry settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClocksConfig {
    /// IANA zone for the default clock.
    #[serde(default)]
    pub default_timezone: Option<String>,

    /// Where to persist the registry snapshot.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}
