use chrono::Duration;

use serde::{Deserialize, Serialize};

pub const LINK_COOLDOWN_SECS: u64 = 60;
pub const WARNING_THRESHOLD: u32 = 3;
pub const INACTIVITY_TIMEOUT_SECS: u64 = 604_800; // 7 days
pub const SWEEP_INTERVAL_SECS: u64 = 300;

/// Upper bound for every timing option, longer values are clamped to it.
pub const MAX_TIMING_SECS: u64 = 315_360_000; // 10 years

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds a pair must last before profile links can be exchanged.
    pub link_cooldown: u64,

    /// Flagged messages before a user is blocked.
    pub warning_threshold: u32,

    /// Seconds without activity before a session expires.
    pub inactivity_timeout: u64,

    pub sweep_interval: u64,
    pub sweep_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            link_cooldown: LINK_COOLDOWN_SECS,
            warning_threshold: WARNING_THRESHOLD,
            inactivity_timeout: INACTIVITY_TIMEOUT_SECS,
            sweep_interval: SWEEP_INTERVAL_SECS,
            sweep_enabled: false,
        }
    }
}

impl EngineConfig {
    pub fn link_cooldown(&self) -> Duration {
        clamped(self.link_cooldown)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        clamped(self.inactivity_timeout)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval.clamp(1, MAX_TIMING_SECS))
    }
}

fn clamped(secs: u64) -> Duration {
    // Bounded well below what chrono can represent.
    Duration::seconds(secs.min(MAX_TIMING_SECS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_timings_are_clamped() {
        let config = EngineConfig {
            link_cooldown: u64::MAX,
            inactivity_timeout: 10_000_000_000_000_000,
            sweep_interval: u64::MAX,
            ..Default::default()
        };

        let max = Duration::seconds(MAX_TIMING_SECS as i64);

        assert_eq!(config.link_cooldown(), max);
        assert_eq!(config.inactivity_timeout(), max);
        assert_eq!(
            config.sweep_interval(),
            std::time::Duration::from_secs(MAX_TIMING_SECS)
        );
    }

    #[test]
    fn zero_interval_still_ticks() {
        let config = EngineConfig {
            sweep_interval: 0,
            ..Default::default()
        };

        assert_eq!(config.sweep_interval(), std::time::Duration::from_secs(1));
        assert_eq!(EngineConfig::default().link_cooldown(), Duration::seconds(60));
    }
}
