//! Single weather observations

use crate::core_types::units::{Celsius, Degrees, MetersPerSecond};
use crate::stability::StabilityClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw observation row as handed over by the observation store
///
/// Every field may be missing; stability arrives as free text. Use
/// [`WeatherSnapshot::from_record`] to obtain a usable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Capture time
    pub captured_at: Option<DateTime<Utc>>,
    /// Wind speed (m/s)
    pub wind_speed: Option<f32>,
    /// Direction the wind blows from (degrees, meteorological)
    pub wind_direction: Option<f32>,
    /// Stability classification as recorded
    pub stability_class: Option<String>,
    /// Air temperature (°C)
    pub temperature: Option<f64>,
}

/// Immutable weather observation driving plume geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// When the observation was captured
    pub captured_at: DateTime<Utc>,
    /// Wind speed, never negative
    pub wind_speed: MetersPerSecond,
    /// Direction the wind blows from, normalized to `[0, 360)`
    pub wind_bearing_from: Degrees,
    /// Atmospheric stability
    pub stability_class: StabilityClass,
    /// Air temperature, display only
    pub temperature: Option<Celsius>,
}

impl WeatherSnapshot {
    /// Create a snapshot, clamping speed and normalizing bearing
    #[must_use]
    pub fn new(
        captured_at: DateTime<Utc>,
        wind_speed: MetersPerSecond,
        wind_bearing_from: Degrees,
        stability_class: StabilityClass,
    ) -> Self {
        Self {
            captured_at,
            wind_speed: wind_speed.clamp_non_negative(),
            wind_bearing_from: wind_bearing_from.normalized(),
            stability_class,
            temperature: None,
        }
    }

    /// Validate a raw record
    ///
    /// Returns `None` when capture time, wind speed, wind direction or
    /// stability is missing, or when a numeric field is not finite. An
    /// unrecognized stability string is not an error; it becomes neutral.
    #[must_use]
    pub fn from_record(record: &ObservationRecord) -> Option<WeatherSnapshot> {
        let captured_at = record.captured_at?;
        let speed = record.wind_speed.filter(|v| v.is_finite())?;
        let direction = record.wind_direction.filter(|v| v.is_finite())?;
        let stability = record
            .stability_class
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;

        let mut snapshot = WeatherSnapshot::new(
            captured_at,
            MetersPerSecond::new(speed),
            Degrees::new(direction),
            StabilityClass::parse_or_neutral(stability),
        );
        snapshot.temperature = record.temperature.filter(|t| t.is_finite()).map(Celsius::new);
        Some(snapshot)
    }

    /// Direction the odour travels toward
    #[must_use]
    pub fn travel_bearing(&self) -> Degrees {
        self.wind_bearing_from.reciprocal()
    }
}
