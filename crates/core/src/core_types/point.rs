//! Point and vector aliases for 2D map space.

use nalgebra::{Point2 as NaPoint2, Vector2};

/// 2D point in render-surface coordinates.
///
/// This is a simple alias for `nalgebra::Point2<f32>`. Map space is
/// screen-like: x grows to the east (right), y grows to the south (down).
pub type Point2 = NaPoint2<f32>;

/// 2D displacement in render-surface coordinates.
pub type Vec2 = Vector2<f32>;
