//! Timing and budget knobs of the monitor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delays and attempt budget applied by [`crate::TriggerMonitor`].
///
/// Worst-case run time is roughly
/// `trigger timeout + settle_delay + max_attempts * (status timeout + poll_interval)`;
/// the request timeouts belong to the [`pipeline::JobClient`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Wait between an accepted trigger and the first status poll, so the
    /// first poll does not observe the previous build.
    pub settle_delay: Duration,
    /// Wait between two consecutive status polls. Not applied after the last
    /// attempt.
    pub poll_interval: Duration,
    /// Maximum number of status polls.
    pub max_attempts: u32,
}

impl MonitorSettings {
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Settings with no delays at all; useful for tests and dry runs against
    /// local fakes.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            settle_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            max_attempts,
        }
    }

    /// Upper bound on the time spent sleeping during one run.
    pub fn total_sleep_budget(&self) -> Duration {
        let gaps = self.max_attempts.saturating_sub(1);
        self.settle_delay + self.poll_interval * gaps
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}
