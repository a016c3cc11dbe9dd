//! Odour Plume Core Library
//!
//! Draws approximate odour dispersion plumes for incidents reported on a
//! site map, using the wind and Pasquill-Gifford stability class of a weather
//! snapshot. Geometry is a fast visual heuristic, not a regulatory Gaussian
//! dispersion model.
//!
//! ## Pieces
//!
//! - Plume geometry: teardrop outline or calm-air circle per incident
//! - Historical playback over a look-back window of weather snapshots
//! - Overlay rendering for every visible incident on a viewport
//! - Store traits for the hosted observation and incident backends
//!
//! ```
//! use odour_plume_core::core_types::units::{Degrees, MetersPerSecond};
//! use odour_plume_core::plume::{compute_plume, PlumeConfig, PlumeInput};
//! use odour_plume_core::{Intensity, Point2, StabilityClass};
//!
//! let input = PlumeInput {
//!     source: Point2::new(250.0, 250.0),
//!     wind_bearing_from: Degrees::new(0.0),
//!     wind_speed: MetersPerSecond::new(5.0),
//!     stability: StabilityClass::D,
//!     intensity: Intensity::from_raw(4),
//!     render_scale: 500.0,
//! };
//! let plume = compute_plume(&input, &PlumeConfig::default());
//! assert!(!plume.is_calm());
//! ```

// Core types and utilities
pub mod core_types;

// Domain inputs
pub mod incident;
pub mod stability;
pub mod weather;

// Geometry, playback and rendering
pub mod overlay;
pub mod playback;
pub mod plume;

// Boundary with the hosted backend and the view glue
pub mod site_map;
pub mod sources;

// Re-export core types
pub use core_types::{Celsius, Degrees, MetersPerSecond, Percent, Point2, Vec2};

// Re-export domain types
pub use incident::{Incident, IncidentId, IncidentStatus, Intensity, MapPosition, UnknownIncidentStatus};
pub use stability::{DisplayColor, StabilityClass, StabilityProfile};
pub use weather::{ObservationRecord, WeatherSnapshot, WeatherSnapshotSeries};

// Re-export geometry, playback and rendering
pub use overlay::{GeoBounds, IncidentOverlay, IncidentOverlayRenderer, MapProjection, OverlaySet, Viewport};
pub use playback::{PlaybackConfig, PlaybackController, PlaybackEnd, PlaybackSpeed, PlaybackState, TickHandle};
pub use plume::{compute_plume, PlumeConfig, PlumeGeometry, PlumeInput, PlumeShape};

// Re-export view glue
pub use site_map::{SiteMapConfig, SiteMapView, WeatherMode};
pub use sources::{IncidentStore, InMemoryIncidentStore, InMemoryObservationStore, ObservationStore, SourceError};
