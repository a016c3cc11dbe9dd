//! Tuning constants for plume geometry
//!
//! The defaults reproduce the dashboard's established look: a 0.5 m/s calm
//! cut-off, `15% + 5% per m/s` of the container width for plume length, a 60%
//! length cap and a 20-step outline. They are display choices, not physical
//! constants.

use crate::core_types::units::{MetersPerSecond, Percent};
use serde::{Deserialize, Serialize};

/// Fewest downwind samples that still give a smooth outline
pub const MIN_SAMPLES: usize = 16;

/// Configuration for [`compute_plume`](super::compute_plume)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumeConfig {
    /// Below this wind speed no direction is drawn, only a radial indicator
    pub calm_threshold: MetersPerSecond,

    /// Plume length at 0 m/s, as a share of the render scale
    pub base_length: Percent,

    /// Additional length per m/s of wind, in percentage points
    pub length_per_mps: f32,

    /// Hard cap on plume length, as a share of the render scale
    pub max_length: Percent,

    /// Number of downwind steps used to build each edge of the outline.
    /// Values below [`MIN_SAMPLES`] are raised to it.
    pub samples: usize,

    /// Half-width of the plume at the source, as a fraction of the render scale
    pub source_half_width: f32,

    /// Radius of the calm-air indicator, as a fraction of the render scale
    pub calm_radius: f32,

    /// Opacity used for intensity 1
    pub min_opacity: f32,

    /// Opacity used for intensity 5
    pub max_opacity: f32,
}

impl Default for PlumeConfig {
    fn default() -> Self {
        Self {
            calm_threshold: MetersPerSecond::new(0.5),
            base_length: Percent::new(15.0),
            length_per_mps: 5.0,
            max_length: Percent::new(60.0),
            samples: 20,
            source_half_width: 0.01,
            calm_radius: 0.08,
            min_opacity: 0.2,
            max_opacity: 0.6,
        }
    }
}

impl PlumeConfig {
    /// Sample count actually used for the outline
    #[must_use]
    pub fn effective_samples(&self) -> usize {
        self.samples.max(MIN_SAMPLES)
    }

    /// Length cap, never above 100% and never negative
    #[must_use]
    pub fn length_cap(&self) -> Percent {
        let cap = *self.max_length;
        if cap.is_finite() {
            Percent::new(cap.clamp(0.0, 100.0))
        } else {
            Percent::new(0.0)
        }
    }
}
