// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Periodic recomputation.
//!
//! [`UpdateScheduler`] owns two independent activities:
//!
//! | Activity   | Default period | Work per tick                                  |
//! |------------|----------------|------------------------------------------------|
//! | continuous | 16 ms          | every clock reading + one [`SolarFrame`]       |
//! | slow       | 30 s           | world-city labels                              |
//!
//! Each is either stopped or running, and each is started and stopped on its
//! own.  The scheduler never sleeps or spawns: the host calls
//! [`UpdateScheduler::poll`] from its own loop (or frame callback), and the
//! scheduler reads the current time from an injected [`TimeSource`].  Tests
//! drive it with [`ManualTimeSource`].
//!
//! All work done by one `poll` uses a single captured [`Instant`].
//!
//! A map renderer that fails is marked unavailable.  Clock readings keep
//! flowing; solar frames resume after [`UpdateScheduler::retry_map`].

use chrono::TimeDelta;
use qtty::Seconds;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::cities::{city_labels, CityLabel, WorldCity, WORLD_CITIES};
use crate::clock::{ClockReading, ClockTimeEngine};
use crate::config::GeochronConfig;
use crate::error::Result;
use crate::format::{ClockLabels, EnGbFormatter, LocaleFormatter};
use crate::instant::{seconds_to_delta, Instant};
use crate::registry::{ClockConfig, ClockRegistry};
use crate::solar::{SolarFrame, SolarGeometryEngine};

// ═══════════════════════════════════════════════════════════════════════════
// Time sources
// ═══════════════════════════════════════════════════════════════════════════

/// Where the scheduler gets "now" from.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// The system wall clock.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A hand-driven clock.  Clones share the same current time.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    now: Rc<Cell<Instant>>,
}

impl ManualTimeSource {
    /// A source frozen at `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: Instant) {
        self.now.set(instant);
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Activity
// ═══════════════════════════════════════════════════════════════════════════

/// Whether an [`Activity`] has a pending tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActivityState {
    /// No tick pending.
    Stopped,
    /// A tick is pending at [`Activity::next_due`].
    Running,
}

/// One periodic activity.
///
/// Running means a tick is pending at `next_due`.  Starting makes it due
/// immediately; stopping drops the pending tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    period: TimeDelta,
    next_due: Option<Instant>,
    fired: u64,
}

impl Activity {
    /// A stopped activity with the given period.
    pub const fn new(period: TimeDelta) -> Self {
        Self {
            period,
            next_due: None,
            fired: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ActivityState {
        if self.next_due.is_some() {
            ActivityState::Running
        } else {
            ActivityState::Stopped
        }
    }

    /// `true` while a tick is pending.
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Spacing between ticks.
    pub const fn period(&self) -> TimeDelta {
        self.period
    }

    /// When the pending tick is due, if running.
    pub const fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Ticks fired since creation.
    pub const fn fired(&self) -> u64 {
        self.fired
    }

    /// Start at `now`.  Returns `false` (and changes nothing) if already
    /// running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        self.next_due = Some(now);
        true
    }

    /// Stop.  Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// `true` if running and the pending tick is at or before `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.next_due, Some(due) if due <= now)
    }

    /// Fire the pending tick if due, scheduling the next one.
    ///
    /// Ticks missed while the host was not polling are skipped rather than
    /// replayed.  If the next deadline is not representable the tick still
    /// fires and the activity stops.
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if due > now {
            return false;
        }
        let next = due
            .checked_add(self.period)
            .filter(|next| *next > now)
            .or_else(|| now.checked_add(self.period));
        if next.is_none() {
            warn!(
                period_ms = self.period.num_milliseconds(),
                "next tick out of range; activity stopped"
            );
        }
        self.next_due = next;
        self.fired += 1;
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Renderer contract
// ═══════════════════════════════════════════════════════════════════════════

/// Everything a clock face needs for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockFrame {
    pub config: ClockConfig,
    pub reading: ClockReading,
    pub labels: ClockLabels,
}

/// Consumer of scheduler output.  Every method has a no-op default so a
/// sink only implements what it draws.
pub trait FrameSink {
    /// Clock faces, in registry order.
    fn clock_frames(&mut self, _instant: Instant, _frames: &[ClockFrame]) {}

    /// Map shading and sun marker.
    ///
    /// Return [`RenderTargetUnavailable`](crate::GeochronError::RenderTargetUnavailable)
    /// when the map surface cannot draw.
    fn solar_frame(&mut self, _frame: &SolarFrame) -> Result<()> {
        Ok(())
    }

    /// World-city labels.
    fn city_labels(&mut self, _instant: Instant, _labels: &[CityLabel]) {}
}

/// Whether solar frames are being delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStatus {
    Available,
    Unavailable { reason: String },
}

/// What one [`UpdateScheduler::poll`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// The instant every computation in this poll used.
    pub instant: Instant,
    /// The continuous tick fired.
    pub continuous: bool,
    /// A solar frame was delivered.
    pub solar: bool,
    /// The slow tick fired.
    pub slow: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// UpdateScheduler
// ═══════════════════════════════════════════════════════════════════════════

/// Drives the continuous and slow ticks.
pub struct UpdateScheduler<T: TimeSource = SystemTimeSource> {
    time: T,
    solar: SolarGeometryEngine,
    clocks: ClockTimeEngine,
    formatter: Box<dyn LocaleFormatter>,
    cities: &'static [WorldCity],
    continuous: Activity,
    slow: Activity,
    map: MapStatus,
}

impl<T: TimeSource> UpdateScheduler<T> {
    /// A scheduler with both activities stopped.
    pub fn new(
        time: T,
        solar: SolarGeometryEngine,
        frame_interval: Seconds,
        city_refresh: Seconds,
    ) -> Self {
        Self {
            time,
            solar,
            clocks: ClockTimeEngine::new(),
            formatter: Box::new(EnGbFormatter),
            cities: &WORLD_CITIES,
            continuous: Activity::new(seconds_to_delta(frame_interval)),
            slow: Activity::new(seconds_to_delta(city_refresh)),
            map: MapStatus::Available,
        }
    }

    /// A scheduler using the engine and periods from `config`.
    pub fn from_config(time: T, config: &GeochronConfig) -> Self {
        Self::new(
            time,
            config.engine(),
            config.scheduler.frame_interval(),
            config.scheduler.city_refresh(),
        )
    }

    /// Replace the label formatter.
    pub fn with_formatter(mut self, formatter: Box<dyn LocaleFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    // ── lifecycle ─────────────────────────────────────────────────────

    /// Start the continuous tick; it fires on the next poll.
    pub fn start_continuous(&mut self) {
        if self.continuous.start(self.time.now()) {
            info!(period_ms = self.continuous.period().num_milliseconds(), "continuous tick started");
        }
    }

    /// Stop the continuous tick.
    pub fn stop_continuous(&mut self) {
        if self.continuous.stop() {
            info!("continuous tick stopped");
        }
    }

    /// Start the slow tick; it fires on the next poll.
    pub fn start_slow(&mut self) {
        if self.slow.start(self.time.now()) {
            info!(period_s = self.slow.period().num_seconds(), "slow tick started");
        }
    }

    /// Stop the slow tick.
    pub fn stop_slow(&mut self) {
        if self.slow.stop() {
            info!("slow tick stopped");
        }
    }

    /// The continuous (clocks and map) activity.
    pub fn continuous(&self) -> &Activity {
        &self.continuous
    }

    /// The slow (city labels) activity.
    pub fn slow(&self) -> &Activity {
        &self.slow
    }

    /// Whether solar frames are being delivered.
    pub fn map_status(&self) -> &MapStatus {
        &self.map
    }

    /// Earliest pending tick of either activity.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.continuous.next_due(), self.slow.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Mark the map available again.  If the continuous tick is running, the
    /// next poll delivers a solar frame.  Returns `false` if the map was not
    /// unavailable.
    pub fn retry_map(&mut self) -> bool {
        if self.map == MapStatus::Available {
            return false;
        }
        info!("retrying map renderer");
        self.map = MapStatus::Available;
        true
    }

    // ── ticking ───────────────────────────────────────────────────────

    /// Run whatever is due at the current time.
    pub fn poll(&mut self, registry: &ClockRegistry, sink: &mut dyn FrameSink) -> TickReport {
        let now = self.time.now();
        let mut report = TickReport {
            instant: now,
            continuous: false,
            solar: false,
            slow: false,
        };

        if self.continuous.fire(now) {
            report.continuous = true;
            sink.clock_frames(now, &self.clock_frames(registry, now));
            report.solar = self.deliver_solar(now, sink);
        }

        if self.slow.fire(now) {
            match city_labels(self.cities, now, self.clocks.database(), self.formatter.as_ref()) {
                Ok(labels) => {
                    report.slow = true;
                    sink.city_labels(now, &labels);
                }
                Err(err) => warn!(error = %err, "city labels skipped"),
            }
        }

        report
    }

    fn clock_frames(&self, registry: &ClockRegistry, now: Instant) -> Vec<ClockFrame> {
        registry
            .clocks()
            .iter()
            .filter_map(|config| match self.clocks.compute_reading(now, &config.timezone) {
                Ok(reading) => Some(ClockFrame {
                    config: config.clone(),
                    labels: reading.labels(self.formatter.as_ref()),
                    reading,
                }),
                Err(err) => {
                    warn!(id = config.id.get(), error = %err, "clock reading skipped");
                    None
                }
            })
            .collect()
    }

    fn deliver_solar(&mut self, now: Instant, sink: &mut dyn FrameSink) -> bool {
        if self.map != MapStatus::Available {
            return false;
        }
        let frame = self.solar.compute_frame(now);
        debug!(lat = frame.subsolar.latitude, lon = frame.subsolar.longitude, "solar frame");
        match sink.solar_frame(&frame) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "map renderer unavailable; solar frames suspended");
                self.map = MapStatus::Unavailable {
                    reason: err.to_string(),
                };
                false
            }
        }
    }
}

impl UpdateScheduler<SystemTimeSource> {
    /// A wall-clock scheduler with default engine and periods.
    pub fn system(config: &GeochronConfig) -> Self {
        Self::from_config(SystemTimeSource, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeochronError;
    use crate::zone::ZoneId;

    fn start() -> Instant {
        Instant::parse_rfc3339("2024-06-21T12:00:00Z").unwrap()
    }

    fn scheduler(time: &ManualTimeSource) -> UpdateScheduler<ManualTimeSource> {
        UpdateScheduler::from_config(time.clone(), &GeochronConfig::default())
    }

    #[derive(Default)]
    struct Recorder {
        clock_ticks: Vec<(Instant, usize)>,
        solar: Vec<Instant>,
        cities: Vec<(Instant, usize)>,
        fail_map: bool,
    }

    impl FrameSink for Recorder {
        fn clock_frames(&mut self, instant: Instant, frames: &[ClockFrame]) {
            self.clock_ticks.push((instant, frames.len()));
        }

        fn solar_frame(&mut self, frame: &SolarFrame) -> Result<()> {
            if self.fail_map {
                return Err(GeochronError::render_target_unavailable("tiles not loaded"));
            }
            self.solar.push(frame.instant);
            Ok(())
        }

        fn city_labels(&mut self, instant: Instant, labels: &[CityLabel]) {
            self.cities.push((instant, labels.len()));
        }
    }

    #[test]
    fn test_activity_lifecycle() {
        let mut a = Activity::new(TimeDelta::seconds(30));
        let t0 = start();
        assert_eq!(a.state(), ActivityState::Stopped);
        assert!(!a.fire(t0));

        assert!(a.start(t0));
        assert!(!a.start(t0 + TimeDelta::seconds(5)));
        assert_eq!(a.next_due(), Some(t0));

        assert!(a.fire(t0));
        assert_eq!(a.next_due(), Some(t0 + TimeDelta::seconds(30)));
        assert!(!a.fire(t0 + TimeDelta::seconds(29)));

        // Far behind: skip to now + period.
        let late = t0 + TimeDelta::seconds(100);
        assert!(a.fire(late));
        assert_eq!(a.next_due(), Some(late + TimeDelta::seconds(30)));
        assert_eq!(a.fired(), 2);

        assert!(a.stop());
        assert!(!a.stop());
        assert_eq!(a.state(), ActivityState::Stopped);
        assert!(!a.fire(late + TimeDelta::seconds(60)));
    }

    #[test]
    fn test_unrepresentable_deadline_stops_activity() {
        let mut a = Activity::new(TimeDelta::MAX);
        let t0 = start();
        assert!(a.start(t0));
        assert!(a.fire(t0));
        assert_eq!(a.fired(), 1);
        assert_eq!(a.state(), ActivityState::Stopped);
        assert!(!a.fire(t0 + TimeDelta::days(1)));
    }

    #[test]
    fn test_huge_period_does_not_panic_on_poll() {
        let time = ManualTimeSource::new(start());
        let mut s = UpdateScheduler::new(
            time.clone(),
            SolarGeometryEngine::default(),
            Seconds::new(1.0),
            Seconds::new(1.8e19),
        );
        let registry = ClockRegistry::with_default(ZoneId::utc());
        let mut sink = Recorder::default();
        s.start_slow();
        assert!(s.poll(&registry, &mut sink).slow);
        assert_eq!(sink.cities.len(), 1);
        assert!(!s.slow().is_running());

        time.advance(TimeDelta::hours(1));
        assert!(!s.poll(&registry, &mut sink).slow);
        assert_eq!(sink.cities.len(), 1);
    }

    #[test]
    fn test_stopped_scheduler_does_nothing() {
        let time = ManualTimeSource::new(start());
        let mut s = scheduler(&time);
        let registry = ClockRegistry::with_default(ZoneId::utc());
        let mut sink = Recorder::default();

        let report = s.poll(&registry, &mut sink);
        assert!(!report.continuous && !report.slow);
        assert!(sink.clock_ticks.is_empty() && sink.cities.is_empty());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_continuous_tick_uses_one_instant() {
        let time = ManualTimeSource::new(start());
        let mut s = scheduler(&time);
        let mut registry = ClockRegistry::with_default(ZoneId::utc());
        registry.create(ZoneId::parse("Asia/Tokyo").unwrap());
        let mut sink = Recorder::default();

        s.start_continuous();
        let report = s.poll(&registry, &mut sink);
        assert!(report.continuous && report.solar);
        assert_eq!(sink.clock_ticks, vec![(start(), 2)]);
        assert_eq!(sink.solar, vec![start()]);

        // Not due again until a frame interval has passed.
        time.advance(TimeDelta::milliseconds(10));
        assert!(!s.poll(&registry, &mut sink).continuous);
        time.advance(TimeDelta::milliseconds(6));
        assert!(s.poll(&registry, &mut sink).continuous);
        assert_eq!(sink.clock_ticks.len(), 2);
    }

    #[test]
    fn test_restart_is_idempotent() {
        let time = ManualTimeSource::new(start());
        let mut s = scheduler(&time);
        s.start_continuous();
        let due = s.continuous().next_due();
        time.advance(TimeDelta::milliseconds(5));
        s.start_continuous();
        assert_eq!(s.continuous().next_due(), due);
    }

    #[test]
    fn test_activities_are_independent() {
        let time = ManualTimeSource::new(start());
        let mut s = scheduler(&time);
        let registry = ClockRegistry::with_default(ZoneId::utc());
        let mut sink = Recorder::default();

        s.start_continuous();
        s.start_slow();
        let first = s.poll(&registry, &mut sink);
        assert!(first.continuous && first.slow);
        assert_eq!(sink.cities, vec![(start(), 12)]);

        // Hide the map: slow tick keeps going.
        s.stop_continuous();
        time.advance(TimeDelta::seconds(30));
        let report = s.poll(&registry, &mut sink);
        assert!(!report.continuous && report.slow);
        assert_eq!(sink.clock_ticks.len(), 1);
        assert_eq!(sink.cities.len(), 2);

        // And the other way round.
        s.stop_slow();
        s.start_continuous();
        time.advance(TimeDelta::seconds(30));
        let report = s.poll(&registry, &mut sink);
        assert!(report.continuous && !report.slow);
        assert_eq!(sink.cities.len(), 2);
    }

    #[test]
    fn test_map_failure_suspends_solar_only() {
        let time = ManualTimeSource::new(start());
        let mut s = scheduler(&time);
        let registry = ClockRegistry::with_default(ZoneId::utc());
        let mut sink = Recorder {
            fail_map: true,
            ..Recorder::default()
        };

        s.start_continuous();
        let report = s.poll(&registry, &mut sink);
        assert!(report.continuous && !report.solar);
        assert!(matches!(s.map_status(), MapStatus::Unavailable { reason } if reason.contains("tiles")));

        time.advance(TimeDelta::seconds(1));
        let report = s.poll(&registry, &mut sink);
        assert!(report.continuous && !report.solar);
        assert_eq!(sink.clock_ticks.len(), 2);

        sink.fail_map = false;
        assert!(s.retry_map());
        assert!(!s.retry_map());
        time.advance(TimeDelta::seconds(1));
        assert!(s.poll(&registry, &mut sink).solar);
        assert_eq!(sink.solar.len(), 1);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let time = ManualTimeSource::new(start());
        let mut s = scheduler(&time);
        let registry = ClockRegistry::new();
        let mut sink = Recorder::default();
        s.start_slow();
        s.start_continuous();
        s.poll(&registry, &mut sink);
        assert_eq!(s.next_deadline(), Some(start() + TimeDelta::milliseconds(16)));
        s.stop_continuous();
        assert_eq!(s.next_deadline(), Some(start() + TimeDelta::seconds(30)));
    }
}
