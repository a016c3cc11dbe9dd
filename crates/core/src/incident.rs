//! Reported odour incidents
//!
//! Incidents are owned by the external incident store; this module only
//! models the fields plume rendering reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned by the incident store
pub type IncidentId = String;

/// Where an incident was reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapPosition {
    /// Percentage coordinates on the site-map image (0-100 on each axis,
    /// origin top-left)
    Percent {
        /// Horizontal position, % of image width
        x: f32,
        /// Vertical position, % of image height
        y: f32,
    },
    /// Absolute geographic coordinates
    LatLng {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lng: f64,
    },
}

/// Reported odour intensity on the 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    /// Faintest reportable odour
    pub const MIN: Intensity = Intensity(1);
    /// Middle of the scale, used for out-of-range reports
    pub const MID: Intensity = Intensity(3);
    /// Strongest reportable odour
    pub const MAX: Intensity = Intensity(5);

    /// Map a raw report onto the scale; values outside 1-5 become the mid value
    #[must_use]
    pub fn from_raw(raw: i64) -> Intensity {
        match u8::try_from(raw) {
            Ok(v @ 1..=5) => Intensity(v),
            _ => Intensity::MID,
        }
    }

    /// The ordinal value (1-5)
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Position on the scale as a fraction, 0.0 for 1 and 1.0 for 5
    #[must_use]
    pub fn fraction(self) -> f32 {
        f32::from(self.0 - Self::MIN.0) / f32::from(Self::MAX.0 - Self::MIN.0)
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::MID
    }
}

impl From<i64> for Intensity {
    fn from(raw: i64) -> Self {
        Intensity::from_raw(raw)
    }
}

impl From<Intensity> for u8 {
    fn from(i: Intensity) -> u8 {
        i.0
    }
}

/// Lifecycle status of an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Newly reported
    Open,
    /// Being looked into by staff
    Investigating,
    /// Cause found and dealt with
    Resolved,
    /// Archived
    Closed,
}

impl IncidentStatus {
    /// Statuses that get a plume on the map
    pub const ACTIVE: [IncidentStatus; 2] = [IncidentStatus::Open, IncidentStatus::Investigating];

    /// Only open and investigating incidents are drawn
    #[must_use]
    pub fn participates_in_plumes(self) -> bool {
        matches!(self, IncidentStatus::Open | IncidentStatus::Investigating)
    }

    /// Lowercase name as used by the incident store
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `FromStr` when a status string is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIncidentStatus(pub String);

impl fmt::Display for UnknownIncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown incident status '{}'", self.0)
    }
}

impl std::error::Error for UnknownIncidentStatus {}

impl FromStr for IncidentStatus {
    type Err = UnknownIncidentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(IncidentStatus::Open),
            "investigating" => Ok(IncidentStatus::Investigating),
            "resolved" => Ok(IncidentStatus::Resolved),
            "closed" => Ok(IncidentStatus::Closed),
            _ => Err(UnknownIncidentStatus(s.to_string())),
        }
    }
}

/// An odour report placed on a site map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Store identifier
    pub id: IncidentId,
    /// Reported location
    pub position: MapPosition,
    /// Reported intensity
    #[serde(default)]
    pub intensity: Intensity,
    /// Current status
    pub status: IncidentStatus,
    /// When the report was made, if known
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
}

impl Incident {
    /// Create an incident at a percentage position on the site map
    #[must_use]
    pub fn at_percent(
        id: impl Into<IncidentId>,
        x: f32,
        y: f32,
        intensity: Intensity,
        status: IncidentStatus,
    ) -> Self {
        Self {
            id: id.into(),
            position: MapPosition::Percent { x, y },
            intensity,
            status,
            reported_at: None,
        }
    }

    /// Set the report time
    pub fn reported(mut self, at: DateTime<Utc>) -> Self {
        self.reported_at = Some(at);
        self
    }

    /// Whether this incident should be drawn at instant `as_of`
    ///
    /// `None` means live mode: every active incident is visible. In playback
    /// an incident only appears once it has been reported; incidents without
    /// a report time are always shown.
    #[must_use]
    pub fn visible_at(&self, as_of: Option<DateTime<Utc>>) -> bool {
        if !self.status.participates_in_plumes() {
            return false;
        }
        match (as_of, self.reported_at) {
            (Some(t), Some(reported)) => reported <= t,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_intensity_out_of_range_uses_mid() {
        assert_eq!(Intensity::from_raw(4).value(), 4);
        assert_eq!(Intensity::from_raw(0), Intensity::MID);
        assert_eq!(Intensity::from_raw(6), Intensity::MID);
        assert_eq!(Intensity::from_raw(-2), Intensity::MID);
        assert_eq!(Intensity::from_raw(i64::MAX), Intensity::MID);
    }

    #[test]
    fn test_intensity_fraction() {
        assert_eq!(Intensity::MIN.fraction(), 0.0);
        assert_eq!(Intensity::MID.fraction(), 0.5);
        assert_eq!(Intensity::MAX.fraction(), 1.0);
    }

    #[test]
    fn test_status_participation() {
        assert!(IncidentStatus::Open.participates_in_plumes());
        assert!(IncidentStatus::Investigating.participates_in_plumes());
        assert!(!IncidentStatus::Resolved.participates_in_plumes());
        assert!(!IncidentStatus::Closed.participates_in_plumes());
        assert_eq!("INVESTIGATING".parse::<IncidentStatus>(), Ok(IncidentStatus::Investigating));
        let err = "pending".parse::<IncidentStatus>().unwrap_err();
        assert_eq!(err, UnknownIncidentStatus("pending".to_string()));
        assert_eq!(err.to_string(), "unknown incident status 'pending'");
    }

    #[test]
    fn test_visibility_follows_report_time() {
        let reported = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let incident = Incident::at_percent("i-1", 10.0, 20.0, Intensity::MAX, IncidentStatus::Open)
            .reported(reported);

        assert!(incident.visible_at(None));
        assert!(incident.visible_at(Some(reported)));
        assert!(!incident.visible_at(Some(reported - chrono::TimeDelta::minutes(1))));

        let closed = Incident {
            status: IncidentStatus::Closed,
            ..incident
        };
        assert!(!closed.visible_at(None));
    }

    #[test]
    fn test_deserialize_from_store_json() {
        let json = r#"{
            "id": "abc",
            "position": {"kind": "percent", "x": 50.0, "y": 25.0},
            "intensity": 9,
            "status": "investigating"
        }"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(incident.intensity, Intensity::MID);
        assert_eq!(incident.position, MapPosition::Percent { x: 50.0, y: 25.0 });
        assert_eq!(incident.reported_at, None);
    }
}
