// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error kinds produced by the geochron core.
//!
//! None of these are fatal to the process. Geometry and clock math are
//! total functions; errors only arise at configuration and collaborator
//! boundaries.

/// Errors that can occur in the geochron core.
#[derive(Debug, thiserror::Error)]
pub enum GeochronError {
    /// The identifier does not name a zone known to the timezone database.
    #[error("unrecognized timezone identifier: {zone:?}")]
    InvalidTimezone {
        /// The identifier that was rejected.
        zone: String,
    },

    /// Persisted registry state is malformed or violates its invariants.
    #[error("corrupt registry snapshot: {reason}")]
    CorruptSnapshot {
        /// What was wrong with the snapshot.
        reason: String,
    },

    /// A rendering collaborator failed to initialize or draw.
    #[error("render target unavailable: {reason}")]
    RenderTargetUnavailable {
        /// Explanation reported by the collaborator.
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("i/o error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The YAML configuration could not be parsed.
    #[error("failed to parse config YAML: {source}")]
    Config {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// Encoding a snapshot as JSON failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl GeochronError {
    /// Shorthand for [`GeochronError::InvalidTimezone`].
    pub fn invalid_timezone(zone: impl Into<String>) -> Self {
        Self::InvalidTimezone { zone: zone.into() }
    }

    /// Shorthand for [`GeochronError::CorruptSnapshot`].
    pub fn corrupt_snapshot(reason: impl Into<String>) -> Self {
        Self::CorruptSnapshot {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GeochronError::RenderTargetUnavailable`].
    pub fn render_target_unavailable(reason: impl Into<String>) -> Self {
        Self::RenderTargetUnavailable {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeochronError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_zone() {
        let err = GeochronError::invalid_timezone("Mars/Olympus_Mons");
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GeochronError = io.into();
        assert!(matches!(err, GeochronError::Io { .. }));
    }
}
