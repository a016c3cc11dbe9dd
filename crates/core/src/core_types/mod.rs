//! Core types and utilities

pub mod point;
pub mod units;

pub use point::{Point2, Vec2};
pub use units::*;
