//! Historical weather playback state machine
//!
//! ```text
//!            play()                    on_tick() advances cursor
//!   Paused ─────────► Playing ◄──────────────────────────────┐
//!     ▲                 │  │                                 │
//!     └──── pause() ────┘  └─────────────────────────────────┘
//!           stop()
//!           series length change
//!           newest reached (StopAtNewest)
//! ```
//!
//! The cursor indexes the chronological view of the series: 0 is the oldest
//! snapshot and `len - 1` the newest.

use super::config::{PlaybackConfig, PlaybackEnd, PlaybackSpeed};
use super::timer::{PlaybackTimer, TickHandle};
use crate::weather::{WeatherSnapshot, WeatherSnapshotSeries};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Observable playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    /// Position in the chronological view
    pub cursor: usize,
    /// Whether auto-advance is running
    pub is_playing: bool,
    /// Current rate
    pub speed: PlaybackSpeed,
}

/// Replays a weather series snapshot by snapshot
#[derive(Debug)]
pub struct PlaybackController {
    series: WeatherSnapshotSeries,
    cursor: usize,
    is_playing: bool,
    speed: PlaybackSpeed,
    timer: PlaybackTimer,
    config: PlaybackConfig,
}

impl PlaybackController {
    /// Create a paused controller positioned on the newest snapshot
    #[must_use]
    pub fn new(series: WeatherSnapshotSeries, config: PlaybackConfig) -> Self {
        let cursor = series.newest_index().unwrap_or(0);
        Self {
            series,
            cursor,
            is_playing: false,
            speed: PlaybackSpeed::default(),
            timer: PlaybackTimer::default(),
            config,
        }
    }

    /// Snapshot under the cursor, `None` when there is no data
    #[must_use]
    pub fn current_snapshot(&self) -> Option<&WeatherSnapshot> {
        self.series.chronological(self.cursor)
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            cursor: self.cursor,
            is_playing: self.is_playing,
            speed: self.speed,
        }
    }

    /// Series being replayed
    #[must_use]
    pub fn series(&self) -> &WeatherSnapshotSeries {
        &self.series
    }

    /// True when there is nothing to replay
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Playback configuration
    #[must_use]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Interval between auto-advance ticks at the current speed
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.config.interval_at(self.speed)
    }

    /// Start auto-advance
    ///
    /// Returns the handle the driver must present on every tick, or `None`
    /// when the series is empty. Calling `play` while already playing
    /// returns the existing handle.
    pub fn play(&mut self) -> Option<TickHandle> {
        if self.series.is_empty() {
            debug!("play requested with no weather history");
            return None;
        }
        if self.is_playing {
            return self.timer.active();
        }
        if self.config.end_behavior == PlaybackEnd::StopAtNewest && self.at_newest() {
            self.cursor = 0;
        }
        self.is_playing = true;
        let handle = self.timer.arm(self.tick_interval());
        debug!(cursor = self.cursor, interval_ms = handle.interval().as_millis() as u64, "playback started");
        Some(handle)
    }

    /// Stop auto-advance, keeping the cursor where it is
    pub fn pause(&mut self) {
        if self.timer.cancel() || self.is_playing {
            debug!(cursor = self.cursor, "playback paused");
        }
        self.is_playing = false;
    }

    /// Forced pause used when the view leaves historical mode
    pub fn stop(&mut self) {
        self.pause();
    }

    /// Auto-advance tick
    ///
    /// Ignored unless `handle` belongs to the armed timer generation.
    /// Returns true when the cursor moved.
    pub fn on_tick(&mut self, handle: &TickHandle) -> bool {
        if !self.is_playing || !self.timer.accepts(handle) {
            trace!(generation = handle.generation(), "ignoring stale playback tick");
            return false;
        }
        let Some(newest) = self.series.newest_index() else {
            self.pause();
            return false;
        };

        match self.config.end_behavior {
            PlaybackEnd::Loop => {
                self.cursor = if self.cursor >= newest { 0 } else { self.cursor + 1 };
                newest > 0
            }
            PlaybackEnd::StopAtNewest => {
                let moved = self.cursor < newest;
                if moved {
                    self.cursor += 1;
                }
                if self.cursor >= newest {
                    self.pause();
                }
                moved
            }
        }
    }

    /// Change the playback rate
    ///
    /// While playing the timer is re-armed at the new cadence and the new
    /// handle is returned; the previous handle goes stale.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) -> Option<TickHandle> {
        self.speed = speed;
        if self.is_playing {
            Some(self.timer.arm(self.tick_interval()))
        } else {
            None
        }
    }

    /// Seek to a chronological index, clamped to the series bounds
    ///
    /// Allowed in any play state. Returns the resulting cursor.
    pub fn set_cursor(&mut self, index: isize) -> usize {
        if let Some(newest) = self.series.newest_index() {
            self.cursor = usize::try_from(index).map_or(0, |i| i.min(newest));
        }
        self.cursor
    }

    /// Step one snapshot forward; no-op on the newest snapshot
    pub fn step_forward(&mut self) -> bool {
        match self.series.newest_index() {
            Some(newest) if self.cursor < newest => {
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }

    /// Step one snapshot back; no-op on the oldest snapshot
    pub fn step_backward(&mut self) -> bool {
        if self.cursor > 0 && !self.series.is_empty() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Swap in a refetched series
    ///
    /// A length change resets the cursor to the newest snapshot and pauses;
    /// cursor positions into the old series are never carried over. Returns
    /// true when that reset happened.
    pub fn replace_series(&mut self, series: WeatherSnapshotSeries) -> bool {
        let length_changed = series.len() != self.series.len();
        self.series = series;
        if length_changed {
            self.pause();
            self.cursor = self.series.newest_index().unwrap_or(0);
            debug!(len = self.series.len(), "weather history changed length, playback reset");
        }
        length_changed
    }

    fn at_newest(&self) -> bool {
        self.series.newest_index() == Some(self.cursor)
    }
}
