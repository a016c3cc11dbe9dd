//! Time-indexed weather observation series
//!
//! The observation store delivers snapshots newest-first. Internally the
//! series is always kept oldest-first so that playback cursors advance with
//! increasing index; the newest-first view is only derived at the accessors
//! that name it (`latest_first`, `iter_latest_first`).

use super::snapshot::{ObservationRecord, WeatherSnapshot};
use chrono::{DateTime, TimeDelta, Utc};

/// Ordered collection of weather snapshots for one site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshotSeries {
    /// Oldest first
    snapshots: Vec<WeatherSnapshot>,
}

impl WeatherSnapshotSeries {
    /// Empty series
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from snapshots in store order (newest first)
    ///
    /// Input order is not trusted: snapshots are sorted by capture time.
    #[must_use]
    pub fn from_newest_first(snapshots: Vec<WeatherSnapshot>) -> Self {
        Self::from_unordered(snapshots)
    }

    /// Build from snapshots in any order
    #[must_use]
    pub fn from_unordered(mut snapshots: Vec<WeatherSnapshot>) -> Self {
        snapshots.sort_by_key(|s| s.captured_at);
        Self { snapshots }
    }

    /// Build from raw store records, dropping rows without usable weather data
    #[must_use]
    pub fn from_records(records: &[ObservationRecord]) -> Self {
        let snapshots: Vec<WeatherSnapshot> =
            records.iter().filter_map(WeatherSnapshot::from_record).collect();
        let dropped = records.len() - snapshots.len();
        if dropped > 0 {
            tracing::warn!(dropped, kept = snapshots.len(), "dropped unusable observation records");
        }
        Self::from_unordered(snapshots)
    }

    /// Number of snapshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no observations are available
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the newest snapshot in the chronological view
    #[must_use]
    pub fn newest_index(&self) -> Option<usize> {
        self.snapshots.len().checked_sub(1)
    }

    /// Snapshot by chronological index (0 = oldest)
    #[must_use]
    pub fn chronological(&self, index: usize) -> Option<&WeatherSnapshot> {
        self.snapshots.get(index)
    }

    /// Snapshot by store index (0 = newest)
    #[must_use]
    pub fn latest_first(&self, index: usize) -> Option<&WeatherSnapshot> {
        let chrono_index = self.newest_index()?.checked_sub(index)?;
        self.snapshots.get(chrono_index)
    }

    /// Most recent observation
    #[must_use]
    pub fn latest(&self) -> Option<&WeatherSnapshot> {
        self.snapshots.last()
    }

    /// Oldest observation
    #[must_use]
    pub fn oldest(&self) -> Option<&WeatherSnapshot> {
        self.snapshots.first()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> std::slice::Iter<'_, WeatherSnapshot> {
        self.snapshots.iter()
    }

    /// Iterate newest to oldest
    pub fn iter_latest_first(&self) -> impl Iterator<Item = &WeatherSnapshot> {
        self.snapshots.iter().rev()
    }

    /// Keep only observations captured within `look_back` of `now`
    #[must_use]
    pub fn within(&self, look_back: TimeDelta, now: DateTime<Utc>) -> Self {
        let cutoff = now - look_back;
        Self {
            snapshots: self
                .snapshots
                .iter()
                .filter(|s| s.captured_at >= cutoff && s.captured_at <= now)
                .cloned()
                .collect(),
        }
    }

    /// Time between oldest and newest observation
    #[must_use]
    pub fn time_span(&self) -> Option<TimeDelta> {
        Some(self.latest()?.captured_at - self.oldest()?.captured_at)
    }
}

impl FromIterator<WeatherSnapshot> for WeatherSnapshotSeries {
    fn from_iter<I: IntoIterator<Item = WeatherSnapshot>>(iter: I) -> Self {
        Self::from_unordered(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a WeatherSnapshotSeries {
    type Item = &'a WeatherSnapshot;
    type IntoIter = std::slice::Iter<'a, WeatherSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
