// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Run the scheduler against the wall clock for a couple of seconds and
//! print what a renderer would receive.
//!
//! ```sh
//! cargo run --example quickstart -- [config.yaml]
//! RUST_LOG=geochron=debug cargo run --example quickstart
//! ```

use std::path::Path;
use std::time::Duration;

use geochron::{
    CityLabel, ClockFrame, ClockRegistry, FrameSink, GeochronConfig, GeochronError, Instant,
    JsonFileStore, MemoryStore, SnapshotStore, SolarFrame, UpdateScheduler, ZoneId,
};
use tracing_subscriber::EnvFilter;

struct PrintSink {
    frames: usize,
}

impl FrameSink for PrintSink {
    fn clock_frames(&mut self, instant: Instant, frames: &[ClockFrame]) {
        self.frames += 1;
        // One line every ~30 frames is plenty.
        if self.frames % 30 != 1 {
            return;
        }
        println!("── {instant}");
        for f in frames {
            println!(
                "  #{:<2} {:<20} {} {:<9} {:<17} hands h={:6.2} m={:6.2} s={:6.2}",
                f.config.id,
                f.config.timezone,
                f.labels.time,
                f.labels.weekday,
                f.labels.date,
                f.reading.hands.hour,
                f.reading.hands.minute,
                f.reading.hands.second,
            );
        }
    }

    fn solar_frame(&mut self, frame: &SolarFrame) -> geochron::Result<()> {
        if self.frames % 30 == 1 {
            println!(
                "  sun over ({:+.2}, {:+.2}), day side {:?}, terminator {} pts, night polygon {} pts",
                frame.subsolar.latitude,
                frame.subsolar.longitude,
                frame.day_side,
                frame.curves.terminator.len(),
                frame.layers.night.len(),
            );
        }
        Ok(())
    }

    fn city_labels(&mut self, _instant: Instant, labels: &[CityLabel]) {
        let line: Vec<String> = labels
            .iter()
            .map(|l| format!("{} {}", l.name, l.time))
            .collect();
        println!("  cities: {}", line.join(" · "));
    }
}

fn main() -> Result<(), GeochronError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GeochronConfig::from_file(Path::new(&path))?,
        None => GeochronConfig::default(),
    };

    let mut store: Box<dyn SnapshotStore> = match &config.clocks.snapshot_path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let (mut registry, outcome) = ClockRegistry::from_store(store.as_ref(), config.default_zone());
    println!("registry: {outcome:?}, {} clock(s)", registry.len());

    if registry.len() == 1 {
        for name in ["Asia/Tokyo", "America/New_York"] {
            registry.create(ZoneId::parse(name)?);
        }
    }
    registry.save_to(store.as_mut())?;

    let mut scheduler = UpdateScheduler::system(&config);
    let mut sink = PrintSink { frames: 0 };
    scheduler.start_continuous();
    scheduler.start_slow();

    let stop_at = Instant::now() + chrono::TimeDelta::seconds(2);
    while Instant::now() < stop_at {
        scheduler.poll(&registry, &mut sink);
        if let Some(next) = scheduler.next_deadline() {
            let wait = (next - Instant::now()).to_std().unwrap_or(Duration::ZERO);
            std::thread::sleep(wait);
        }
    }

    scheduler.stop_continuous();
    scheduler.stop_slow();
    Ok(())
}
