//! User-facing grouping settings and service configuration.
//!
//! DESIGN
//! ======
//! The scorer assumes valid settings, so validation happens here, once, at
//! the boundary. `GroupingSettings` keeps its fields private: the only ways
//! to obtain one are `new` (strict, returns an error), `clamped` (repairs
//! out-of-range input), `Default`, and deserialization (strict).
//!
//! `ServiceConfig` carries the process-level knobs read from environment
//! variables; absent or unparsable values fall back to the defaults.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{DEFAULT_DEBOUNCE_MS, DEFAULT_GROUPING_THRESHOLD, DEFAULT_IDLE_TIME_SECS, MIN_IDLE_TIME_SECS};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("grouping threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
    #[error("idle time must be a positive number of seconds, got {0}")]
    IdleTimeNotPositive(f64),
}

// =============================================================================
// GROUPING SETTINGS
// =============================================================================

/// Validated settings for one grouping pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings", rename_all = "camelCase")]
pub struct GroupingSettings {
    grouping_threshold: f64,
    idle_time: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    grouping_threshold: f64,
    idle_time: f64,
}

impl TryFrom<RawSettings> for GroupingSettings {
    type Error = SettingsError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        Self::new(raw.grouping_threshold, raw.idle_time)
    }
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self { grouping_threshold: DEFAULT_GROUPING_THRESHOLD, idle_time: DEFAULT_IDLE_TIME_SECS }
    }
}

impl GroupingSettings {
    /// Build settings, rejecting a threshold outside `[0, 1]` or an idle time
    /// that is not a positive finite number of seconds.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn new(grouping_threshold: f64, idle_time: f64) -> Result<Self, SettingsError> {
        if !(0.0..=1.0).contains(&grouping_threshold) {
            return Err(SettingsError::ThresholdOutOfRange(grouping_threshold));
        }
        if !idle_time.is_finite() || idle_time <= 0.0 {
            return Err(SettingsError::IdleTimeNotPositive(idle_time));
        }
        Ok(Self { grouping_threshold, idle_time })
    }

    /// Build settings, repairing invalid input instead of rejecting it.
    ///
    /// NaN falls back to the default for that field; the threshold is
    /// clamped to `[0, 1]`; the idle time is floored at a small positive value.
    #[must_use]
    pub fn clamped(grouping_threshold: f64, idle_time: f64) -> Self {
        let threshold = if grouping_threshold.is_nan() {
            DEFAULT_GROUPING_THRESHOLD
        } else {
            grouping_threshold.clamp(0.0, 1.0)
        };
        let idle = if idle_time.is_nan() {
            DEFAULT_IDLE_TIME_SECS
        } else if idle_time == f64::INFINITY {
            f64::MAX
        } else {
            idle_time.max(MIN_IDLE_TIME_SECS)
        };
        if threshold.to_bits() != grouping_threshold.to_bits() || idle.to_bits() != idle_time.to_bits() {
            warn!(grouping_threshold, idle_time, threshold, idle, "grouping settings clamped");
        }
        Self { grouping_threshold: threshold, idle_time: idle }
    }

    /// Merge threshold in `[0, 1]`; lower values merge more eagerly.
    #[must_use]
    pub fn grouping_threshold(&self) -> f64 {
        self.grouping_threshold
    }

    /// Pause (seconds) after which consecutive strokes stop looking related.
    #[must_use]
    pub fn idle_time(&self) -> f64 {
        self.idle_time
    }

    /// Idle time in milliseconds.
    #[must_use]
    pub fn idle_time_ms(&self) -> f64 {
        self.idle_time * 1000.0
    }
}

// =============================================================================
// SERVICE CONFIG
// =============================================================================

/// Process-level configuration for the grouping service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    /// Quiet period before a burst of stroke edits triggers a recompute.
    pub debounce: Duration,
    /// Settings the service starts with.
    pub settings: GroupingSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS), settings: GroupingSettings::default() }
    }
}

impl ServiceConfig {
    /// Read configuration from environment variables.
    ///
    /// - `INKGROUP_DEBOUNCE_MS`: default 600
    /// - `INKGROUP_GROUPING_THRESHOLD`: default 0.5, clamped to `[0, 1]`
    /// - `INKGROUP_IDLE_TIME`: seconds, default 1.5
    #[must_use]
    pub fn from_env() -> Self {
        let debounce_ms = env_parse("INKGROUP_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS);
        let threshold = env_parse("INKGROUP_GROUPING_THRESHOLD", DEFAULT_GROUPING_THRESHOLD);
        let idle_time = env_parse("INKGROUP_IDLE_TIME", DEFAULT_IDLE_TIME_SECS);
        Self {
            debounce: Duration::from_millis(debounce_ms),
            settings: GroupingSettings::clamped(threshold, idle_time),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
