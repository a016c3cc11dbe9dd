//! Playback cadence and end-of-series behaviour

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Selectable playback rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    /// 0.5×
    Half,
    /// 1×
    #[default]
    Normal,
    /// 2×
    Double,
    /// 4×
    Quadruple,
}

impl PlaybackSpeed {
    /// Every speed, slowest first
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
    ];

    /// Rate multiplier
    #[must_use]
    pub fn multiplier(self) -> f32 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
        }
    }

    /// Speed for an exact multiplier, if it is one of the offered rates
    #[must_use]
    pub fn from_multiplier(multiplier: f32) -> Option<PlaybackSpeed> {
        Self::ALL.into_iter().find(|s| s.multiplier() == multiplier)
    }

    /// Next faster speed, wrapping from 4× back to 0.5×
    #[must_use]
    pub fn next(self) -> PlaybackSpeed {
        match self {
            PlaybackSpeed::Half => PlaybackSpeed::Normal,
            PlaybackSpeed::Normal => PlaybackSpeed::Double,
            PlaybackSpeed::Double => PlaybackSpeed::Quadruple,
            PlaybackSpeed::Quadruple => PlaybackSpeed::Half,
        }
    }
}

/// What auto-advance does after the newest snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackEnd {
    /// Wrap to the oldest snapshot and keep playing
    #[default]
    Loop,
    /// Pause on the newest snapshot
    StopAtNewest,
}

/// Configuration for [`PlaybackController`](super::PlaybackController)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Tick interval at 1× speed, in milliseconds
    pub base_interval_ms: u64,
    /// Behaviour after the newest snapshot
    pub end_behavior: PlaybackEnd,
    /// How much history the view requests from the observation store
    pub look_back_hours: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 1500,
            end_behavior: PlaybackEnd::Loop,
            look_back_hours: 48,
        }
    }
}

impl PlaybackConfig {
    /// Tick interval at 1× speed
    #[must_use]
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    /// Tick interval at `speed`
    #[must_use]
    pub fn interval_at(&self, speed: PlaybackSpeed) -> Duration {
        self.base_interval().div_f32(speed.multiplier())
    }

    /// History window
    #[must_use]
    pub fn look_back(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.look_back_hours))
    }
}
