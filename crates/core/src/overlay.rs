//! Incident overlay rendering
//!
//! Builds the set of plume overlays the site map draws for one weather
//! snapshot. Only open and investigating incidents are considered; resolved
//! and closed ones are filtered out before any geometry is computed. Without
//! a usable snapshot nothing is produced at all.

use crate::core_types::point::Point2;
use crate::incident::{Incident, IncidentId, IncidentStatus, Intensity, MapPosition};
use crate::plume::{compute_plume, PlumeConfig, PlumeInput, PlumeShape};
use crate::weather::WeatherSnapshot;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Incident counts at or above which geometry is computed in parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Size of the render surface the overlay is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Container width; also the render scale for plume lengths
    pub width: f32,
    /// Container height
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scale plume lengths are measured against
    #[must_use]
    pub fn render_scale(&self) -> f32 {
        self.width
    }

    /// Convert percentage image coordinates to render coordinates
    #[must_use]
    pub fn percent_to_point(&self, x: f32, y: f32) -> Point2 {
        Point2::new(x / 100.0 * self.width, y / 100.0 * self.height)
    }
}

/// Maps geographic coordinates onto the render surface
pub trait MapProjection: Send + Sync {
    /// Project a latitude/longitude, or `None` if it falls outside the map
    fn project(&self, lat: f64, lng: f64, viewport: &Viewport) -> Option<Point2>;
}

/// Georeferenced bounds of a site-map image (equirectangular)
///
/// Adequate for the few hundred metres a plant site covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Latitude of the top edge
    pub north: f64,
    /// Latitude of the bottom edge
    pub south: f64,
    /// Longitude of the right edge
    pub east: f64,
    /// Longitude of the left edge
    pub west: f64,
}

impl MapProjection for GeoBounds {
    fn project(&self, lat: f64, lng: f64, viewport: &Viewport) -> Option<Point2> {
        let lat_span = self.north - self.south;
        let lng_span = self.east - self.west;
        if !(lat_span > 0.0 && lng_span > 0.0 && lat.is_finite() && lng.is_finite()) {
            return None;
        }
        let fx = (lng - self.west) / lng_span;
        let fy = (self.north - lat) / lat_span;
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        Some(Point2::new(
            fx as f32 * viewport.width,
            fy as f32 * viewport.height,
        ))
    }
}

/// Plume drawn for one incident
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentOverlay {
    /// Incident this overlay belongs to
    pub incident_id: IncidentId,
    /// Incident status at render time
    pub status: IncidentStatus,
    /// Reported intensity
    pub intensity: Intensity,
    /// Geometry to draw
    pub shape: PlumeShape,
}

/// All overlays for one snapshot, in incident order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySet {
    overlays: Vec<IncidentOverlay>,
    index: FxHashMap<IncidentId, usize>,
    captured_at: Option<DateTime<Utc>>,
}

impl OverlaySet {
    /// Nothing to draw
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_overlays(overlays: Vec<IncidentOverlay>, captured_at: DateTime<Utc>) -> Self {
        let index = overlays
            .iter()
            .enumerate()
            .map(|(i, o)| (o.incident_id.clone(), i))
            .collect();
        Self {
            overlays,
            index,
            captured_at: Some(captured_at),
        }
    }

    /// Number of overlays
    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// True when nothing is drawn
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Iterate overlays in incident order
    pub fn iter(&self) -> std::slice::Iter<'_, IncidentOverlay> {
        self.overlays.iter()
    }

    /// Overlay for a given incident
    #[must_use]
    pub fn get(&self, incident_id: &str) -> Option<&IncidentOverlay> {
        self.index.get(incident_id).map(|&i| &self.overlays[i])
    }

    /// Number of oriented plumes (as opposed to calm-air indicators)
    #[must_use]
    pub fn directional_count(&self) -> usize {
        self.overlays.iter().filter(|o| !o.shape.is_calm()).count()
    }

    /// Capture time of the snapshot the set was rendered from
    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }
}

impl<'a> IntoIterator for &'a OverlaySet {
    type Item = &'a IncidentOverlay;
    type IntoIter = std::slice::Iter<'a, IncidentOverlay>;

    fn into_iter(self) -> Self::IntoIter {
        self.overlays.iter()
    }
}

/// Turns incidents plus a weather snapshot into plume overlays
pub struct IncidentOverlayRenderer {
    config: PlumeConfig,
    parallel_threshold: usize,
    projection: Option<Box<dyn MapProjection>>,
}

impl std::fmt::Debug for IncidentOverlayRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentOverlayRenderer")
            .field("config", &self.config)
            .field("parallel_threshold", &self.parallel_threshold)
            .field("has_projection", &self.projection.is_some())
            .finish()
    }
}

impl Default for IncidentOverlayRenderer {
    fn default() -> Self {
        Self::new(PlumeConfig::default())
    }
}

impl IncidentOverlayRenderer {
    /// Renderer for percentage-positioned incidents
    #[must_use]
    pub fn new(config: PlumeConfig) -> Self {
        Self {
            config,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            projection: None,
        }
    }

    /// Project lat/lng incidents through `projection`
    #[must_use]
    pub fn with_projection(mut self, projection: impl MapProjection + 'static) -> Self {
        self.projection = Some(Box::new(projection));
        self
    }

    /// Change the incident count at which rendering goes parallel
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Plume configuration in use
    #[must_use]
    pub fn config(&self) -> &PlumeConfig {
        &self.config
    }

    /// Compute overlays for every visible incident
    ///
    /// * `snapshot` - live or playback weather; `None` renders nothing
    /// * `incidents` - incidents for the site map in any status
    /// * `viewport` - current render surface
    /// * `as_of` - playback instant; incidents reported later are hidden.
    ///   `None` in live mode.
    #[must_use]
    pub fn render(
        &self,
        snapshot: Option<&WeatherSnapshot>,
        incidents: &[Incident],
        viewport: &Viewport,
        as_of: Option<DateTime<Utc>>,
    ) -> OverlaySet {
        let Some(snapshot) = snapshot else {
            debug!(incidents = incidents.len(), "no usable weather snapshot, no plumes drawn");
            return OverlaySet::empty();
        };

        let visible: Vec<&Incident> = incidents.iter().filter(|i| i.visible_at(as_of)).collect();
        let render_scale = viewport.render_scale();

        let build = |incident: &&Incident| -> Option<IncidentOverlay> {
            let Some(source) = self.resolve(&incident.position, viewport) else {
                debug!(incident = %incident.id, "incident position not on this map, skipped");
                return None;
            };
            let input = PlumeInput::from_snapshot(source, snapshot, incident.intensity, render_scale);
            Some(IncidentOverlay {
                incident_id: incident.id.clone(),
                status: incident.status,
                intensity: incident.intensity,
                shape: compute_plume(&input, &self.config),
            })
        };

        let overlays: Vec<IncidentOverlay> = if visible.len() >= self.parallel_threshold {
            visible.par_iter().filter_map(build).collect()
        } else {
            visible.iter().filter_map(build).collect()
        };

        debug!(
            incidents = incidents.len(),
            visible = visible.len(),
            drawn = overlays.len(),
            captured_at = %snapshot.captured_at,
            "rendered plume overlays"
        );
        OverlaySet::from_overlays(overlays, snapshot.captured_at)
    }

    fn resolve(&self, position: &MapPosition, viewport: &Viewport) -> Option<Point2> {
        match *position {
            MapPosition::Percent { x, y } => Some(viewport.percent_to_point(x, y)),
            MapPosition::LatLng { lat, lng } => self
                .projection
                .as_ref()
                .and_then(|projection| projection.project(lat, lng, viewport)),
        }
    }
}
