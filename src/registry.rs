// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The set of configured clocks.
//!
//! [`ClockRegistry`] owns an ordered list of [`ClockConfig`]s (order is
//! display order) and a monotonic id counter starting at 1.  Ids are never
//! reused within a registry's lifetime, even after removal.
//!
//! [`RegistrySnapshot`] is the only state that crosses the persistence
//! boundary.  Restoring a snapshot that fails validation never leaves the
//! registry empty: it falls back to one clock in the host zone.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{GeochronError, Result};
use crate::persistence::SnapshotStore;
use crate::zone::{host_zone, ZoneId};

// ═══════════════════════════════════════════════════════════════════════════
// Identity and configuration
// ═══════════════════════════════════════════════════════════════════════════

/// Largest `next_id` a snapshot may carry: 2^53, exact in an IEEE double.
pub const MAX_NEXT_ID: u64 = 1 << 53;

/// Registry-assigned clock identity, always positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockId(u64);

impl ClockId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One configured clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Stable identity, unique within the registry.
    pub id: ClockId,
    /// Zone the clock displays.
    pub timezone: ZoneId,
}

/// Serializable registry state.
///
/// JSON form: `{"next_id": 3, "clocks": [{"id": 1, "timezone": "UTC"}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Id the next created clock receives.
    pub next_id: u64,
    /// Clocks in display order.
    pub clocks: Vec<ClockConfig>,
}

impl RegistrySnapshot {
    /// Check the snapshot invariants: positive unique ids, and `next_id`
    /// strictly greater than every id and at most [`MAX_NEXT_ID`].
    pub fn validate(&self) -> Result<()> {
        if self.next_id == 0 {
            return Err(GeochronError::corrupt_snapshot("next_id must be positive"));
        }
        if self.next_id > MAX_NEXT_ID {
            return Err(GeochronError::corrupt_snapshot(format!(
                "next_id {} exceeds {MAX_NEXT_ID}",
                self.next_id
            )));
        }
        let mut seen = std::collections::HashSet::with_capacity(self.clocks.len());
        for clock in &self.clocks {
            let id = clock.id.get();
            if id == 0 {
                return Err(GeochronError::corrupt_snapshot("clock id 0 is not allowed"));
            }
            if id >= self.next_id {
                return Err(GeochronError::corrupt_snapshot(format!(
                    "clock id {id} is not below next_id {}",
                    self.next_id
                )));
            }
            if !seen.insert(id) {
                return Err(GeochronError::corrupt_snapshot(format!(
                    "duplicate clock id {id}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON snapshot.
    ///
    /// Any failure, including an unknown zone, is reported as
    /// [`GeochronError::CorruptSnapshot`].
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| GeochronError::corrupt_snapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ClockRegistry
// ═══════════════════════════════════════════════════════════════════════════

/// How a restore ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The snapshot was applied as-is.
    Restored,
    /// No snapshot existed; the registry holds the default clock.
    Defaulted,
    /// The snapshot was corrupt; the registry holds the default clock.
    Recovered,
}

/// Ordered clock configurations plus the id counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockRegistry {
    next_id: u64,
    clocks: Vec<ClockConfig>,
}

impl Default for ClockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockRegistry {
    /// An empty registry whose first id will be 1.
    pub const fn new() -> Self {
        Self {
            next_id: 1,
            clocks: Vec::new(),
        }
    }

    /// A registry holding a single clock in `zone`.
    pub fn with_default(zone: ZoneId) -> Self {
        let mut registry = Self::new();
        registry.create(zone);
        registry
    }

    /// A registry holding a single clock in the host zone.
    pub fn with_host_default() -> Self {
        Self::with_default(host_zone())
    }

    // ── queries ───────────────────────────────────────────────────────

    /// Clocks in display order.
    pub fn clocks(&self) -> &[ClockConfig] {
        &self.clocks
    }

    /// The id the next `create` will assign.
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Number of configured clocks.
    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    /// `true` if no clock is configured.
    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Look up a clock by id.
    pub fn get(&self, id: ClockId) -> Option<&ClockConfig> {
        self.clocks.iter().find(|c| c.id == id)
    }

    // ── mutations ─────────────────────────────────────────────────────

    /// Append a clock in `zone` with a fresh id.
    pub fn create(&mut self, zone: ZoneId) -> ClockConfig {
        let config = ClockConfig {
            id: ClockId(self.next_id),
            timezone: zone,
        };
        self.next_id += 1;
        debug!(id = config.id.get(), timezone = %config.timezone, "clock created");
        self.clocks.push(config.clone());
        config
    }

    /// Remove the clock with `id`.  Returns the removed config, or `None`
    /// if no such clock exists.
    pub fn remove(&mut self, id: ClockId) -> Option<ClockConfig> {
        let index = self.clocks.iter().position(|c| c.id == id)?;
        let removed = self.clocks.remove(index);
        debug!(id = id.get(), "clock removed");
        Some(removed)
    }

    /// Change the zone of clock `id` in place.  Returns `false` if no such
    /// clock exists.
    pub fn retimezone(&mut self, id: ClockId, zone: ZoneId) -> bool {
        match self.clocks.iter_mut().find(|c| c.id == id) {
            Some(clock) => {
                debug!(id = id.get(), from = %clock.timezone, to = %zone, "clock retimezoned");
                clock.timezone = zone;
                true
            }
            None => false,
        }
    }

    // ── snapshot / restore ────────────────────────────────────────────

    /// Capture the full state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            next_id: self.next_id,
            clocks: self.clocks.clone(),
        }
    }

    /// Replace the state with `snapshot`, falling back to one host-zone
    /// clock if it is corrupt.
    pub fn restore(&mut self, snapshot: RegistrySnapshot) -> RestoreOutcome {
        self.restore_with_fallback(snapshot, host_zone())
    }

    /// [`restore`](Self::restore) with an explicit fallback zone.
    pub fn restore_with_fallback(
        &mut self,
        snapshot: RegistrySnapshot,
        fallback: ZoneId,
    ) -> RestoreOutcome {
        match snapshot.validate() {
            Ok(()) => {
                debug!(clocks = snapshot.clocks.len(), next_id = snapshot.next_id, "registry restored");
                self.next_id = snapshot.next_id;
                self.clocks = snapshot.clocks;
                RestoreOutcome::Restored
            }
            Err(err) => self.recover(&err, fallback),
        }
    }

    /// Restore from a JSON snapshot.  Unparseable input is recovered like
    /// any other corrupt snapshot.
    pub fn restore_json(&mut self, json: &str, fallback: ZoneId) -> RestoreOutcome {
        match RegistrySnapshot::from_json(json) {
            Ok(snapshot) => self.restore_with_fallback(snapshot, fallback),
            Err(err) => self.recover(&err, fallback),
        }
    }

    /// Build a registry from whatever `store` holds.
    ///
    /// An empty store yields one clock in `fallback`; a failing or corrupt
    /// store is logged and recovered the same way.
    pub fn from_store(store: &dyn SnapshotStore, fallback: ZoneId) -> (Self, RestoreOutcome) {
        let mut registry = Self::new();
        let outcome = match store.load() {
            Ok(Some(snapshot)) => registry.restore_with_fallback(snapshot, fallback),
            Ok(None) => {
                registry.create(fallback);
                RestoreOutcome::Defaulted
            }
            Err(err) => registry.recover(&err, fallback),
        };
        (registry, outcome)
    }

    /// Write the current state to `store`.
    pub fn save_to(&self, store: &mut dyn SnapshotStore) -> Result<()> {
        store.save(&self.snapshot())
    }

    fn recover(&mut self, err: &GeochronError, fallback: ZoneId) -> RestoreOutcome {
        warn!(error = %err, fallback = %fallback, "discarding registry snapshot");
        *self = Self::with_default(fallback);
        RestoreOutcome::Recovered
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str) -> ZoneId {
        ZoneId::parse(name).unwrap()
    }

    #[test]
    fn test_create_assigns_monotonic_ids() {
        let mut r = ClockRegistry::new();
        assert_eq!(r.next_id(), 1);
        let a = r.create(zone("UTC"));
        let b = r.create(zone("Asia/Tokyo"));
        assert_eq!(a.id, ClockId::new(1));
        assert_eq!(b.id, ClockId::new(2));
        assert_eq!(r.next_id(), 3);
        assert_eq!(r.clocks()[1].timezone.as_str(), "Asia/Tokyo");
    }

    #[test]
    fn test_create_then_remove_restores_length() {
        let mut r = ClockRegistry::with_default(zone("UTC"));
        let before = r.len();
        let c = r.create(zone("Europe/Paris"));
        assert_eq!(r.remove(c.id), Some(c));
        assert_eq!(r.len(), before);
        assert_eq!(r.next_id(), 3);

        // Ids are not reused.
        assert_eq!(r.create(zone("Europe/Paris")).id.get(), 3);
    }

    #[test]
    fn test_remove_and_retimezone_missing_are_noops() {
        let mut r = ClockRegistry::with_default(zone("UTC"));
        let before = r.clone();
        assert_eq!(r.remove(ClockId::new(42)), None);
        assert!(!r.retimezone(ClockId::new(42), zone("Asia/Dubai")));
        assert_eq!(r, before);
    }

    #[test]
    fn test_retimezone_in_place() {
        let mut r = ClockRegistry::new();
        let a = r.create(zone("UTC"));
        let b = r.create(zone("UTC"));
        assert!(r.retimezone(a.id, zone("Africa/Cairo")));
        assert_eq!(r.clocks()[0].id, a.id);
        assert_eq!(r.clocks()[0].timezone.as_str(), "Africa/Cairo");
        assert_eq!(r.get(b.id).unwrap().timezone, ZoneId::utc());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut r = ClockRegistry::new();
        r.create(zone("Europe/London"));
        let gone = r.create(zone("Europe/Moscow"));
        r.create(zone("America/Sao_Paulo"));
        r.remove(gone.id);

        let snap = r.snapshot();
        let mut other = ClockRegistry::with_default(zone("UTC"));
        assert_eq!(other.restore(snap.clone()), RestoreOutcome::Restored);
        assert_eq!(other, r);
        assert_eq!(other.snapshot(), snap);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let r = ClockRegistry::with_default(zone("UTC"));
        let json = r.snapshot().to_json().unwrap();
        assert_eq!(json, r#"{"next_id":2,"clocks":[{"id":1,"timezone":"UTC"}]}"#);
    }

    #[test]
    fn test_validate_rejects_bad_snapshots() {
        let clock = |id| ClockConfig {
            id: ClockId::new(id),
            timezone: ZoneId::utc(),
        };
        let bad = [
            RegistrySnapshot { next_id: 0, clocks: vec![] },
            RegistrySnapshot { next_id: 2, clocks: vec![clock(0)] },
            RegistrySnapshot { next_id: 2, clocks: vec![clock(2)] },
            RegistrySnapshot { next_id: 5, clocks: vec![clock(1), clock(1)] },
        ];
        for snap in bad {
            assert!(matches!(
                snap.validate(),
                Err(GeochronError::CorruptSnapshot { .. })
            ));
        }
        assert!(RegistrySnapshot { next_id: 1, clocks: vec![] }.validate().is_ok());
    }

    #[test]
    fn test_exhausted_id_counter_is_corrupt() {
        let json = r#"{"next_id":18446744073709551615,"clocks":[{"id":1,"timezone":"UTC"}]}"#;
        assert!(matches!(
            RegistrySnapshot::from_json(json),
            Err(GeochronError::CorruptSnapshot { .. })
        ));

        let mut r = ClockRegistry::new();
        assert_eq!(r.restore_json(json, ZoneId::utc()), RestoreOutcome::Recovered);
        assert_eq!(r.next_id(), 2);
        assert_eq!(r.create(ZoneId::utc()).id.get(), 2);

        let at_limit = RegistrySnapshot {
            next_id: MAX_NEXT_ID,
            clocks: vec![ClockConfig {
                id: ClockId::new(1),
                timezone: ZoneId::utc(),
            }],
        };
        assert_eq!(r.restore(at_limit.clone()), RestoreOutcome::Restored);
        assert_eq!(r.create(ZoneId::utc()).id.get(), MAX_NEXT_ID);

        let past_limit = RegistrySnapshot {
            next_id: MAX_NEXT_ID + 1,
            ..at_limit
        };
        assert!(past_limit.validate().is_err());
    }

    #[test]
    fn test_corrupt_restore_falls_back_to_one_clock() {
        let mut r = ClockRegistry::new();
        r.create(zone("Asia/Tokyo"));
        r.create(zone("Asia/Tokyo"));

        let outcome = r.restore_with_fallback(
            RegistrySnapshot {
                next_id: 1,
                clocks: vec![ClockConfig {
                    id: ClockId::new(7),
                    timezone: ZoneId::utc(),
                }],
            },
            zone("Europe/Paris"),
        );
        assert_eq!(outcome, RestoreOutcome::Recovered);
        assert_eq!(r.len(), 1);
        assert_eq!(r.clocks()[0].timezone.as_str(), "Europe/Paris");
        assert_eq!(r.next_id(), 2);
    }

    #[test]
    fn test_restore_json_recovers_from_garbage() {
        let mut r = ClockRegistry::new();
        for json in [
            "not json",
            r#"{"next_id":2}"#,
            r#"{"next_id":2,"clocks":[{"id":1,"timezone":"Nowhere/Land"}]}"#,
        ] {
            assert_eq!(r.restore_json(json, ZoneId::utc()), RestoreOutcome::Recovered);
            assert_eq!(r.len(), 1);
        }

        let ok = r#"{"next_id":4,"clocks":[{"id":3,"timezone":"Asia/Kolkata"}]}"#;
        assert_eq!(r.restore_json(ok, ZoneId::utc()), RestoreOutcome::Restored);
        assert_eq!(r.clocks()[0].id.get(), 3);
        assert_eq!(r.next_id(), 4);
    }

    #[test]
    fn test_with_host_default_has_one_clock() {
        let r = ClockRegistry::with_host_default();
        assert_eq!(r.len(), 1);
        assert_eq!(r.next_id(), 2);
    }
}
