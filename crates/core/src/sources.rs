//! Boundary contracts for the external observation and incident stores
//!
//! The hosted backend owns persistence; these traits describe what the map
//! needs from it. In-memory implementations back the tests and the headless
//! demo.

use crate::incident::{Incident, IncidentStatus};
use crate::weather::ObservationRecord;
use chrono::{DateTime, TimeDelta, Utc};
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::fmt;

/// Identifier of a monitored site
pub type SiteId = String;

/// Identifier of a site-map image
pub type SiteMapId = String;

/// Failure reported by an external store
///
/// The plume core never surfaces these to the user; callers log them and
/// fall back to "no data".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Store could not be reached (network, timeout, auth)
    Unavailable(String),
    /// The requested site or site map does not exist
    UnknownSite(String),
    /// The store answered with data that could not be decoded
    Malformed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
            SourceError::UnknownSite(site) => write!(f, "unknown site '{site}'"),
            SourceError::Malformed(reason) => write!(f, "malformed store response: {reason}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Shorthand for store results
pub type SourceResult<T> = Result<T, SourceError>;

/// Source of weather observations
pub trait ObservationStore {
    /// Observations captured within `look_back`, newest first
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the store cannot answer.
    fn fetch_series(&self, site: &str, look_back: TimeDelta) -> SourceResult<Vec<ObservationRecord>>;

    /// The single most recent observation, for live mode
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the store cannot answer.
    fn fetch_latest(&self, site: &str) -> SourceResult<Option<ObservationRecord>>;
}

/// Source of odour incidents
pub trait IncidentStore {
    /// Incidents placed on `site_map` whose status is one of `statuses`
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the store cannot answer.
    fn fetch_incidents(&self, site_map: &str, statuses: &[IncidentStatus]) -> SourceResult<Vec<Incident>>;
}

/// Observation store held in memory
///
/// Look-back filtering is relative to a fixed reference instant so results
/// are reproducible.
#[derive(Debug, Clone)]
pub struct InMemoryObservationStore {
    now: DateTime<Utc>,
    sites: FxHashMap<SiteId, Vec<ObservationRecord>>,
}

impl InMemoryObservationStore {
    /// Empty store whose "now" is `now`
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            sites: FxHashMap::default(),
        }
    }

    /// Add observations for a site
    pub fn insert(&mut self, site: impl Into<SiteId>, records: impl IntoIterator<Item = ObservationRecord>) {
        self.sites.entry(site.into()).or_default().extend(records);
    }

    fn site(&self, site: &str) -> SourceResult<&[ObservationRecord]> {
        self.sites
            .get(site)
            .map(Vec::as_slice)
            .ok_or_else(|| SourceError::UnknownSite(site.to_string()))
    }
}

impl ObservationStore for InMemoryObservationStore {
    fn fetch_series(&self, site: &str, look_back: TimeDelta) -> SourceResult<Vec<ObservationRecord>> {
        let cutoff = self.now - look_back;
        let mut records: Vec<ObservationRecord> = self
            .site(site)?
            .iter()
            .filter(|r| r.captured_at.is_some_and(|t| t >= cutoff && t <= self.now))
            .cloned()
            .collect();
        records.sort_by_key(|r| Reverse(r.captured_at));
        Ok(records)
    }

    fn fetch_latest(&self, site: &str) -> SourceResult<Option<ObservationRecord>> {
        Ok(self
            .site(site)?
            .iter()
            .filter(|r| r.captured_at.is_some_and(|t| t <= self.now))
            .max_by_key(|r| r.captured_at)
            .cloned())
    }
}

/// Incident store held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryIncidentStore {
    maps: FxHashMap<SiteMapId, Vec<Incident>>,
}

impl InMemoryIncidentStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add incidents to a site map
    pub fn insert(&mut self, site_map: impl Into<SiteMapId>, incidents: impl IntoIterator<Item = Incident>) {
        self.maps.entry(site_map.into()).or_default().extend(incidents);
    }
}

impl IncidentStore for InMemoryIncidentStore {
    fn fetch_incidents(&self, site_map: &str, statuses: &[IncidentStatus]) -> SourceResult<Vec<Incident>> {
        let incidents = self
            .maps
            .get(site_map)
            .ok_or_else(|| SourceError::UnknownSite(site_map.to_string()))?;
        Ok(incidents
            .iter()
            .filter(|i| statuses.contains(&i.status))
            .cloned()
            .collect())
    }
}
