//! Semantic unit types for the quantities that flow through plume rendering
//!
//! Newtype wrappers keep wind speeds, bearings and percentages from being
//! mixed up at the call sites of the geometry code.
//!
//! # Design Philosophy
//! - All types wrap `f32` except `Celsius` (`f64`, matches observation store precision)
//! - Total ordering via `Ord` (NaN sorts above every value)
//! - Constructors never panic: observation data is clamped, not rejected
//! - Serde support so snapshots and configs round-trip through JSON
//!
//! # Usage
//! ```
//! use odour_plume_core::core_types::units::{Degrees, MetersPerSecond};
//!
//! let from = Degrees::new(270.0);
//! assert_eq!(from.reciprocal(), Degrees::new(90.0));
//!
//! let speed = MetersPerSecond::new(-2.0).clamp_non_negative();
//! assert_eq!(*speed, 0.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

// ============================================================================
// HELPER FUNCTIONS FOR TOTAL ORDERING
// ============================================================================

#[inline]
fn f32_total_cmp(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// ANGLE TYPES
// ============================================================================

/// Angle in degrees
///
/// Used for compass bearings (0° = north, clockwise positive) as well as
/// screen rotations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f32);

impl Eq for Degrees {}

impl PartialOrd for Degrees {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degrees {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for Degrees {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl Degrees {
    /// Due north
    pub const NORTH: Degrees = Degrees(0.0);

    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Degrees(value)
    }

    /// Wrap into `[0, 360)`. Non-finite angles become 0°.
    #[must_use]
    pub fn normalized(self) -> Degrees {
        if !self.0.is_finite() {
            return Degrees::NORTH;
        }
        let wrapped = self.0.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if wrapped >= 360.0 {
            Degrees(0.0)
        } else {
            Degrees(wrapped)
        }
    }

    /// The opposite bearing (+180°, wrapped at 360°)
    ///
    /// Converts a meteorological "wind from" bearing into the direction the
    /// air is travelling toward.
    #[must_use]
    pub fn reciprocal(self) -> Degrees {
        Degrees(self.normalized().0 + 180.0).normalized()
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

impl From<f32> for Degrees {
    fn from(v: f32) -> Self {
        Degrees(v)
    }
}

impl From<Degrees> for f32 {
    fn from(d: Degrees) -> f32 {
        d.0
    }
}

impl From<Degrees> for Radians {
    fn from(d: Degrees) -> Radians {
        d.to_radians()
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(f32);

impl Deref for Radians {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

// ============================================================================
// VELOCITY TYPES
// ============================================================================

/// Velocity in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f32);

impl Eq for MetersPerSecond {}

impl PartialOrd for MetersPerSecond {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetersPerSecond {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for MetersPerSecond {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl MetersPerSecond {
    /// Still air
    pub const ZERO: MetersPerSecond = MetersPerSecond(0.0);

    /// Create a new velocity
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        MetersPerSecond(value)
    }

    /// Negative and non-finite speeds become 0 m/s
    #[must_use]
    pub fn clamp_non_negative(self) -> MetersPerSecond {
        if self.0.is_finite() && self.0 > 0.0 {
            self
        } else {
            MetersPerSecond::ZERO
        }
    }
}

impl From<f32> for MetersPerSecond {
    fn from(v: f32) -> Self {
        MetersPerSecond(v)
    }
}

impl From<MetersPerSecond> for f32 {
    fn from(v: MetersPerSecond) -> f32 {
        v.0
    }
}

impl fmt::Display for MetersPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m/s", self.0)
    }
}

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Celsius
///
/// Only carried for display next to a snapshot; nothing in the plume
/// computation depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Create a new Celsius temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }
}

impl From<f64> for Celsius {
    fn from(v: f64) -> Self {
        Celsius(v)
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// DIMENSIONLESS TYPES
// ============================================================================

/// A percentage (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f32);

impl Eq for Percent {}

impl PartialOrd for Percent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Percent {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for Percent {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl Percent {
    /// Create a new percentage
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Percent(value)
    }

    /// Convert to fraction (0-1)
    #[inline]
    #[must_use]
    pub fn to_fraction(self) -> f32 {
        self.0 / 100.0
    }

    /// This share of `total`
    #[inline]
    #[must_use]
    pub fn of(self, total: f32) -> f32 {
        self.to_fraction() * total
    }
}

impl From<f32> for Percent {
    fn from(v: f32) -> Self {
        Percent(v)
    }
}

impl From<Percent> for f32 {
    fn from(p: Percent) -> f32 {
        p.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}
