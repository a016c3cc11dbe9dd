//! Site-map view state
//!
//! Holds either the live weather snapshot or the one selected by playback,
//! the incidents placed on the map, and the last rendered overlay set. The
//! overlay set is recomputed only when something it depends on changed.

use crate::incident::{Incident, IncidentStatus};
use crate::overlay::{
    IncidentOverlayRenderer, MapProjection, OverlaySet, Viewport, DEFAULT_PARALLEL_THRESHOLD,
};
use crate::playback::{PlaybackConfig, PlaybackController};
use crate::plume::PlumeConfig;
use crate::sources::{IncidentStore, ObservationStore, SiteId, SiteMapId};
use crate::weather::{WeatherSnapshot, WeatherSnapshotSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything tunable about the odour map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMapConfig {
    /// Plume geometry
    pub plume: PlumeConfig,
    /// Historical playback
    pub playback: PlaybackConfig,
    /// Incident count at which overlays are computed in parallel
    pub parallel_threshold: usize,
}

impl Default for SiteMapConfig {
    fn default() -> Self {
        Self {
            plume: PlumeConfig::default(),
            playback: PlaybackConfig::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Which weather drives the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherMode {
    /// Most recent observation
    #[default]
    Live,
    /// Snapshot selected by the playback controller
    Historical,
}

#[derive(Debug, Clone, PartialEq)]
struct RenderKey {
    mode: WeatherMode,
    snapshot: Option<WeatherSnapshot>,
    viewport: Viewport,
    incidents_revision: u64,
}

/// State behind one site-map view
#[derive(Debug)]
pub struct SiteMapView {
    site: SiteId,
    site_map: SiteMapId,
    mode: WeatherMode,
    live: Option<WeatherSnapshot>,
    playback: PlaybackController,
    incidents: Vec<Incident>,
    incidents_revision: u64,
    viewport: Viewport,
    renderer: IncidentOverlayRenderer,
    rendered: Option<(RenderKey, OverlaySet)>,
}

impl SiteMapView {
    /// Create a view with no weather and no incidents yet
    #[must_use]
    pub fn new(
        site: impl Into<SiteId>,
        site_map: impl Into<SiteMapId>,
        viewport: Viewport,
        config: SiteMapConfig,
    ) -> Self {
        let renderer =
            IncidentOverlayRenderer::new(config.plume).with_parallel_threshold(config.parallel_threshold);
        Self {
            site: site.into(),
            site_map: site_map.into(),
            mode: WeatherMode::Live,
            live: None,
            playback: PlaybackController::new(WeatherSnapshotSeries::empty(), config.playback),
            incidents: Vec::new(),
            incidents_revision: 0,
            viewport,
            renderer,
            rendered: None,
        }
    }

    /// Place lat/lng incidents through `projection`
    #[must_use]
    pub fn with_projection(mut self, projection: impl MapProjection + 'static) -> Self {
        self.renderer = self.renderer.with_projection(projection);
        self.rendered = None;
        self
    }

    /// Current weather mode
    #[must_use]
    pub fn mode(&self) -> WeatherMode {
        self.mode
    }

    /// Switch between live and historical weather
    ///
    /// Leaving historical mode always stops playback.
    pub fn set_mode(&mut self, mode: WeatherMode) {
        if mode == WeatherMode::Live {
            self.playback.stop();
        }
        self.mode = mode;
    }

    /// Playback controller, for reading state
    #[must_use]
    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Playback controller, for play/pause/seek and ticks
    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    /// Replace the live snapshot
    pub fn set_live_snapshot(&mut self, snapshot: Option<WeatherSnapshot>) {
        self.live = snapshot;
    }

    /// Replace the weather history; a length change resets playback
    pub fn set_history(&mut self, series: WeatherSnapshotSeries) {
        self.playback.replace_series(series);
    }

    /// Replace the incidents shown on the map
    pub fn set_incidents(&mut self, incidents: Vec<Incident>) {
        self.incidents = incidents;
        self.incidents_revision += 1;
    }

    /// Incidents currently held
    #[must_use]
    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Resize the render surface
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Weather driving the overlay right now
    #[must_use]
    pub fn current_snapshot(&self) -> Option<&WeatherSnapshot> {
        match self.mode {
            WeatherMode::Live => self.live.as_ref(),
            WeatherMode::Historical => self.playback.current_snapshot(),
        }
    }

    /// Instant incidents are filtered against; `None` in live mode
    #[must_use]
    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        match self.mode {
            WeatherMode::Live => None,
            WeatherMode::Historical => self.playback.current_snapshot().map(|s| s.captured_at),
        }
    }

    /// Overlays for the current state, recomputed only when inputs changed
    pub fn overlays(&mut self) -> &OverlaySet {
        let key = RenderKey {
            mode: self.mode,
            snapshot: self.current_snapshot().cloned(),
            viewport: self.viewport,
            incidents_revision: self.incidents_revision,
        };
        if self.rendered.as_ref().is_some_and(|(previous, _)| *previous != key) {
            self.rendered = None;
        }
        let as_of = self.as_of();
        let (renderer, incidents, viewport) = (&self.renderer, &self.incidents, &self.viewport);
        &self
            .rendered
            .get_or_insert_with(|| {
                let overlays = renderer.render(key.snapshot.as_ref(), incidents, viewport, as_of);
                (key, overlays)
            })
            .1
    }

    /// Fetch the look-back window of observations
    ///
    /// A store failure is logged and leaves the view with no history.
    pub fn load_history(&mut self, store: &dyn ObservationStore) {
        let look_back = self.playback.config().look_back();
        let series = match store.fetch_series(&self.site, look_back) {
            Ok(records) => WeatherSnapshotSeries::from_records(&records),
            Err(e) => {
                warn!(site = %self.site, error = %e, "weather history unavailable");
                WeatherSnapshotSeries::empty()
            }
        };
        info!(site = %self.site, snapshots = series.len(), "weather history loaded");
        self.set_history(series);
    }

    /// Fetch the most recent observation for live mode
    ///
    /// A store failure or an unusable record leaves the view without live weather.
    pub fn load_live(&mut self, store: &dyn ObservationStore) {
        let snapshot = match store.fetch_latest(&self.site) {
            Ok(record) => record.as_ref().and_then(WeatherSnapshot::from_record),
            Err(e) => {
                warn!(site = %self.site, error = %e, "live weather unavailable");
                None
            }
        };
        self.set_live_snapshot(snapshot);
    }

    /// Fetch open and investigating incidents for this site map
    ///
    /// A store failure is logged and leaves the map without incidents.
    pub fn load_incidents(&mut self, store: &dyn IncidentStore) {
        let incidents = store
            .fetch_incidents(&self.site_map, &IncidentStatus::ACTIVE)
            .unwrap_or_else(|e| {
                warn!(site_map = %self.site_map, error = %e, "incidents unavailable");
                Vec::new()
            });
        self.set_incidents(incidents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::{Degrees, MetersPerSecond};
    use crate::incident::Intensity;
    use crate::sources::{InMemoryIncidentStore, SourceError, SourceResult};
    use crate::stability::StabilityClass;
    use crate::weather::ObservationRecord;
    use chrono::{TimeDelta, TimeZone};

    struct BrokenStore;

    impl ObservationStore for BrokenStore {
        fn fetch_series(&self, _site: &str, _look_back: TimeDelta) -> SourceResult<Vec<ObservationRecord>> {
            Err(SourceError::Unavailable("connection reset".to_string()))
        }

        fn fetch_latest(&self, _site: &str) -> SourceResult<Option<ObservationRecord>> {
            Err(SourceError::Unavailable("connection reset".to_string()))
        }
    }

    impl IncidentStore for BrokenStore {
        fn fetch_incidents(&self, _site_map: &str, _statuses: &[IncidentStatus]) -> SourceResult<Vec<Incident>> {
            Err(SourceError::Malformed("unexpected token".to_string()))
        }
    }

    fn snapshot(hour: u32, bearing: f32) -> WeatherSnapshot {
        WeatherSnapshot::new(
            Utc.with_ymd_and_hms(2024, 10, 3, hour, 0, 0).unwrap(),
            MetersPerSecond::new(4.0),
            Degrees::new(bearing),
            StabilityClass::D,
        )
    }

    fn view() -> SiteMapView {
        let mut view = SiteMapView::new("plant", "map", Viewport::new(500.0, 500.0), SiteMapConfig::default());
        view.set_incidents(vec![Incident::at_percent(
            "odour-1",
            40.0,
            60.0,
            Intensity::MAX,
            IncidentStatus::Open,
        )]);
        view
    }

    #[test]
    fn test_live_mode_uses_live_snapshot() {
        let mut view = view();
        view.set_history((0..3).map(|h| snapshot(h, 90.0)).collect());
        view.set_live_snapshot(Some(snapshot(12, 0.0)));

        let overlays = view.overlays();
        let plume = overlays.get("odour-1").and_then(|o| o.shape.as_directional()).unwrap();
        assert_eq!(plume.travel_bearing, Degrees::new(180.0));
    }

    #[test]
    fn test_historical_mode_follows_cursor() {
        let mut view = view();
        view.set_history([(0, 0.0), (1, 90.0), (2, 180.0)].into_iter().map(|(h, b)| snapshot(h, b)).collect());
        view.set_mode(WeatherMode::Historical);

        view.playback_mut().set_cursor(0);
        let first = view.overlays().get("odour-1").and_then(|o| o.shape.as_directional()).unwrap().travel_bearing;
        view.playback_mut().step_forward();
        let second = view.overlays().get("odour-1").and_then(|o| o.shape.as_directional()).unwrap().travel_bearing;

        assert_eq!(first, Degrees::new(180.0));
        assert_eq!(second, Degrees::new(270.0));
    }

    #[test]
    fn test_switching_to_live_stops_playback() {
        let mut view = view();
        view.set_history((0..4).map(|h| snapshot(h, 0.0)).collect());
        view.set_mode(WeatherMode::Historical);
        let handle = view.playback_mut().play().unwrap();

        view.set_mode(WeatherMode::Live);
        assert!(!view.playback().state().is_playing);
        assert!(!view.playback_mut().on_tick(&handle));
    }

    #[test]
    fn test_overlays_cached_until_inputs_change() {
        let mut view = view();
        view.set_live_snapshot(Some(snapshot(1, 45.0)));
        let first = view.overlays().clone();
        assert_eq!(view.overlays(), &first);

        view.set_viewport(Viewport::new(1000.0, 500.0));
        let resized = view.overlays().clone();
        assert_ne!(resized, first);

        view.set_live_snapshot(None);
        assert!(view.overlays().is_empty());
    }

    #[test]
    fn test_store_failures_degrade_to_no_data() {
        let mut view = view();
        view.set_live_snapshot(Some(snapshot(1, 45.0)));
        view.load_live(&BrokenStore);
        view.load_history(&BrokenStore);
        view.load_incidents(&BrokenStore);

        assert!(view.current_snapshot().is_none());
        assert!(view.playback().is_empty());
        assert!(view.incidents().is_empty());
        assert!(view.overlays().is_empty());
    }

    #[test]
    fn test_load_incidents_only_keeps_active() {
        let mut store = InMemoryIncidentStore::new();
        store.insert(
            "map",
            [
                Incident::at_percent("a", 10.0, 10.0, Intensity::MID, IncidentStatus::Resolved),
                Incident::at_percent("b", 20.0, 20.0, Intensity::MID, IncidentStatus::Investigating),
            ],
        );
        let mut view = view();
        view.load_incidents(&store);
        assert_eq!(view.incidents().len(), 1);
        assert_eq!(view.incidents()[0].id, "b");
    }
}
