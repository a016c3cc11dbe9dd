//! Weather observations and the look-back series used for playback

pub mod series;
pub mod snapshot;

pub use series::WeatherSnapshotSeries;
pub use snapshot::{ObservationRecord, WeatherSnapshot};
