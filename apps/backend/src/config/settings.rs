//! Runtime tunables for the core.

use std::time::Duration;

use crate::domain::rules;

/// Process-wide settings. Defaults are production values; tests shrink the
/// durations to keep suites fast.
#[derive(Debug, Clone)]
pub struct Settings {
    /// How long a FINISHED game stays in the store after its last mutation.
    pub retention: Duration,
    /// How often the reaper scans for expired games.
    pub reap_interval: Duration,
    /// Granularity of the round-timer ticker.
    pub tick_interval: Duration,
    /// Length of the parlay window between leaders.
    pub parlay_duration: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(60 * 60),
            reap_interval: Duration::from_secs(60),
            tick_interval: Duration::from_millis(100),
            parlay_duration: rules::PARLAY_DURATION,
        }
    }
}
