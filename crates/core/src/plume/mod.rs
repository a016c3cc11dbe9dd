//! Plume geometry for odour incidents
//!
//! Turns a wind vector, a stability class and an incident position into the
//! outline the map draws. Nothing here performs I/O or keeps state.

pub mod config;
pub mod geometry;

pub use config::{PlumeConfig, MIN_SAMPLES};
pub use geometry::{
    bearing_between, compute_plume, length_share, CalmDispersion, PlumeGeometry, PlumeInput,
    PlumeShape,
};
