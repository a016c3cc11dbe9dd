//! Plume outline construction
//!
//! The plume is laid out in a local frame with +x pointing downwind and the
//! source at the origin, then rotated onto the travel bearing and translated
//! to the incident position.
//!
//! ```text
//!   top edge (outbound)   ───────────────►
//!   source ●                               tip
//!   bottom edge (inbound) ◄───────────────
//! ```
//!
//! Map space is screen-like (x east, y south), so a compass bearing θ maps to
//! the direction `(sin θ, -cos θ)` and the local frame is rotated by `θ - 90°`.

use super::config::PlumeConfig;
use crate::core_types::point::{Point2, Vec2};
use crate::core_types::units::{Degrees, MetersPerSecond, Percent};
use crate::incident::Intensity;
use crate::stability::{DisplayColor, StabilityClass, StabilityProfile};
use crate::weather::WeatherSnapshot;
use nalgebra::Rotation2;

/// Everything the plume computation reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlumeInput {
    /// Incident position in render-surface coordinates
    pub source: Point2,
    /// Direction the wind blows from (meteorological)
    pub wind_bearing_from: Degrees,
    /// Wind speed
    pub wind_speed: MetersPerSecond,
    /// Atmospheric stability
    pub stability: StabilityClass,
    /// Reported intensity, cosmetic only
    pub intensity: Intensity,
    /// Current container width
    pub render_scale: f32,
}

impl PlumeInput {
    /// Combine a weather snapshot with one incident's position and intensity
    #[must_use]
    pub fn from_snapshot(
        source: Point2,
        snapshot: &WeatherSnapshot,
        intensity: Intensity,
        render_scale: f32,
    ) -> Self {
        Self {
            source,
            wind_bearing_from: snapshot.wind_bearing_from,
            wind_speed: snapshot.wind_speed,
            stability: snapshot.stability_class,
            intensity,
            render_scale,
        }
    }
}

/// Oriented plume outline
#[derive(Debug, Clone, PartialEq)]
pub struct PlumeGeometry {
    /// Closed polygon; the first point is repeated at the end
    pub outline: Vec<Point2>,
    /// Where the plume starts
    pub source: Point2,
    /// Downwind end of the centre line
    pub tip: Point2,
    /// Compass bearing the odour travels toward
    pub travel_bearing: Degrees,
    /// Screen rotation for a shape drawn along +x (`travel_bearing - 90°`)
    pub rotation: Degrees,
    /// Centre-line length in render units
    pub length: f32,
    /// Centre-line length as a share of the render scale
    pub length_share: Percent,
    /// Half-width at the tip in render units
    pub max_half_width: f32,
    /// Fill opacity (0-1)
    pub opacity: f32,
    /// Fill colour
    pub fill_color: DisplayColor,
}

/// Symmetric indicator drawn when the air is calm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalmDispersion {
    /// Incident position
    pub center: Point2,
    /// Indicator radius in render units
    pub radius: f32,
    /// Fill opacity (0-1)
    pub opacity: f32,
    /// Fill colour
    pub fill_color: DisplayColor,
}

/// Result of a plume computation
#[derive(Debug, Clone, PartialEq)]
pub enum PlumeShape {
    /// Wind strong enough to give the odour a direction
    Directional(PlumeGeometry),
    /// No directional plume; draw a radial indicator instead
    Calm(CalmDispersion),
}

impl PlumeShape {
    /// Fill opacity of either variant
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match self {
            PlumeShape::Directional(g) => g.opacity,
            PlumeShape::Calm(c) => c.opacity,
        }
    }

    /// Fill colour of either variant
    #[must_use]
    pub fn fill_color(&self) -> DisplayColor {
        match self {
            PlumeShape::Directional(g) => g.fill_color,
            PlumeShape::Calm(c) => c.fill_color,
        }
    }

    /// The oriented geometry, if any
    #[must_use]
    pub fn as_directional(&self) -> Option<&PlumeGeometry> {
        match self {
            PlumeShape::Directional(g) => Some(g),
            PlumeShape::Calm(_) => None,
        }
    }

    /// True for the calm-air variant
    #[must_use]
    pub fn is_calm(&self) -> bool {
        matches!(self, PlumeShape::Calm(_))
    }
}

/// Compute the plume for one incident
///
/// Pure and total: any out-of-range input is clamped rather than rejected.
/// - negative or non-finite wind speed is treated as 0 m/s (calm)
/// - non-finite bearings become 0°
/// - non-finite or negative render scales produce zero-sized geometry
/// - non-finite source coordinates are placed at the origin
#[must_use]
pub fn compute_plume(input: &PlumeInput, config: &PlumeConfig) -> PlumeShape {
    let source = sanitize_point(input.source);
    let scale = sanitize_scale(input.render_scale);
    let speed = input.wind_speed.clamp_non_negative();
    let profile = input.stability.profile();
    let opacity = opacity_for(input.intensity, config);
    let fill_color = profile.display_color;

    if speed < config.calm_threshold {
        return PlumeShape::Calm(CalmDispersion {
            center: source,
            radius: config.calm_radius.max(0.0) * scale,
            opacity,
            fill_color,
        });
    }

    let travel_bearing = input.wind_bearing_from.reciprocal();
    let rotation = Degrees::new(*travel_bearing - 90.0);
    let to_map = Rotation2::new(*rotation.to_radians());

    let length_share = length_share(speed, profile, config);
    let length = length_share.of(scale);
    let source_half_width = config.source_half_width.max(0.0) * scale;
    let half_width_at = |distance: f32| source_half_width + profile.spread_rate * distance * 0.5;

    let samples = config.effective_samples();
    let mut outline = Vec::with_capacity(2 * (samples + 1) + 1);

    for i in 0..=samples {
        let d = length * i as f32 / samples as f32;
        outline.push(source + to_map * Vec2::new(d, half_width_at(d)));
    }
    for i in (0..=samples).rev() {
        let d = length * i as f32 / samples as f32;
        outline.push(source + to_map * Vec2::new(d, -half_width_at(d)));
    }
    outline.push(outline[0]);

    PlumeShape::Directional(PlumeGeometry {
        outline,
        source,
        tip: source + to_map * Vec2::new(length, 0.0),
        travel_bearing,
        rotation,
        length,
        length_share,
        max_half_width: half_width_at(length),
        opacity,
        fill_color,
    })
}

/// Plume length as a share of the render scale
///
/// Grows linearly with wind speed, stretched or shortened by the stability
/// class persistence, and never exceeds the configured cap.
#[must_use]
pub fn length_share(speed: MetersPerSecond, profile: &StabilityProfile, config: &PlumeConfig) -> Percent {
    let raw = (*config.base_length + config.length_per_mps * *speed.clamp_non_negative())
        * profile.persistence;
    let cap = *config.length_cap();
    if raw.is_finite() {
        Percent::new(raw.clamp(0.0, cap))
    } else {
        Percent::new(cap)
    }
}

/// Compass bearing from one map point to another
///
/// Inverse of the bearing-to-screen mapping used for the outline; handy for
/// checking which way a rendered plume points.
#[must_use]
pub fn bearing_between(from: Point2, to: Point2) -> Degrees {
    let delta = to - from;
    Degrees::new(delta.x.atan2(-delta.y).to_degrees()).normalized()
}

fn opacity_for(intensity: Intensity, config: &PlumeConfig) -> f32 {
    let lo = config.min_opacity.clamp(0.0, 1.0);
    let hi = config.max_opacity.clamp(lo, 1.0);
    lo + (hi - lo) * intensity.fraction()
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        0.0
    }
}

fn sanitize_point(p: Point2) -> Point2 {
    let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
    Point2::new(finite(p.x), finite(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(bearing_from: f32, speed: f32, stability: StabilityClass) -> PlumeInput {
        PlumeInput {
            source: Point2::new(400.0, 300.0),
            wind_bearing_from: Degrees::new(bearing_from),
            wind_speed: MetersPerSecond::new(speed),
            stability,
            intensity: Intensity::from_raw(4),
            render_scale: 800.0,
        }
    }

    fn directional(shape: PlumeShape) -> PlumeGeometry {
        match shape {
            PlumeShape::Directional(g) => g,
            PlumeShape::Calm(c) => panic!("expected directional plume, got calm {c:?}"),
        }
    }

    #[test]
    fn test_travel_direction_is_reciprocal() {
        let config = PlumeConfig::default();
        for (from, toward) in [(0.0, 180.0), (270.0, 90.0), (90.0, 270.0), (225.0, 45.0)] {
            let g = directional(compute_plume(&input(from, 4.0, StabilityClass::D), &config));
            assert_eq!(g.travel_bearing, Degrees::new(toward));
            assert_relative_eq!(*bearing_between(g.source, g.tip), toward, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_north_wind_points_down_the_screen() {
        let g = directional(compute_plume(&input(0.0, 5.0, StabilityClass::D), &PlumeConfig::default()));
        assert_relative_eq!(g.tip.x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(g.tip.y, 300.0 + 320.0, epsilon = 1e-3);
        assert_eq!(g.rotation, Degrees::new(90.0));
    }

    #[test]
    fn test_neutral_length_matches_linear_rule() {
        let g = directional(compute_plume(&input(0.0, 5.0, StabilityClass::D), &PlumeConfig::default()));
        assert_relative_eq!(*g.length_share, 40.0, epsilon = 1e-4);
        assert_relative_eq!(g.length, 320.0, epsilon = 1e-3);
    }

    #[test]
    fn test_length_capped_for_extreme_wind() {
        let config = PlumeConfig::default();
        for class in StabilityClass::ALL {
            for speed in [1.0, 10.0, 100.0, 1.0e6, f32::MAX] {
                let g = directional(compute_plume(&input(45.0, speed, class), &config));
                assert!(g.length >= 0.0);
                assert!(g.length <= 0.6 * 800.0 + 1e-3, "{class} at {speed} m/s: {}", g.length);
            }
        }
    }

    #[test]
    fn test_length_monotonic_in_speed() {
        let config = PlumeConfig::default();
        let mut previous = 0.0;
        for step in 1..60 {
            let speed = MetersPerSecond::new(step as f32 * 0.25);
            let share = *length_share(speed, StabilityClass::C.profile(), &config);
            assert!(share >= previous);
            previous = share;
        }
    }

    #[test]
    fn test_unstable_plumes_wider_and_shorter() {
        let config = PlumeConfig::default();
        let a = directional(compute_plume(&input(0.0, 3.0, StabilityClass::A), &config));
        let f = directional(compute_plume(&input(0.0, 3.0, StabilityClass::F), &config));
        assert!(a.length < f.length);
        assert!(a.max_half_width / a.length > f.max_half_width / f.length);
    }

    #[test]
    fn test_outline_shape() {
        let config = PlumeConfig::default();
        let g = directional(compute_plume(&input(0.0, 5.0, StabilityClass::D), &config));
        let samples = config.effective_samples();

        assert_eq!(g.outline.len(), 2 * (samples + 1) + 1);
        assert_eq!(g.outline.first(), g.outline.last());

        // Width grows linearly with distance on both edges
        let top = &g.outline[..=samples];
        let widths: Vec<f32> = top.iter().map(|p| (p.x - g.source.x).abs()).collect();
        let step = widths[1] - widths[0];
        for pair in widths.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], step, epsilon = 1e-3);
        }
        // Bottom edge runs back toward the source
        let bottom = &g.outline[samples + 1..2 * (samples + 1)];
        assert!(bottom.first().unwrap().y > bottom.last().unwrap().y);
    }

    #[test]
    fn test_calm_air_gives_radial_indicator() {
        let config = PlumeConfig::default();
        for speed in [0.0, 0.3, 0.49, -4.0, f32::NAN] {
            let shape = compute_plume(&input(120.0, speed, StabilityClass::B), &config);
            assert!(shape.is_calm(), "speed {speed} should be calm");
            if let PlumeShape::Calm(c) = shape {
                assert_eq!(c.center, Point2::new(400.0, 300.0));
                assert_relative_eq!(c.radius, 64.0, epsilon = 1e-4);
            }
        }
        assert!(!compute_plume(&input(120.0, 0.5, StabilityClass::B), &config).is_calm());
    }

    #[test]
    fn test_pure_function_bit_identical() {
        let config = PlumeConfig::default();
        let i = input(313.0, 7.3, StabilityClass::E);
        let first = directional(compute_plume(&i, &config));
        let second = directional(compute_plume(&i, &config));
        let bits = |g: &PlumeGeometry| -> Vec<(u32, u32)> {
            g.outline.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect()
        };
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_intensity_is_cosmetic() {
        let config = PlumeConfig::default();
        let mut faint = input(10.0, 6.0, StabilityClass::C);
        faint.intensity = Intensity::MIN;
        let mut strong = faint;
        strong.intensity = Intensity::MAX;

        let faint = directional(compute_plume(&faint, &config));
        let strong = directional(compute_plume(&strong, &config));
        assert_eq!(faint.outline, strong.outline);
        assert_relative_eq!(faint.opacity, 0.2, epsilon = 1e-6);
        assert_relative_eq!(strong.opacity, 0.6, epsilon = 1e-6);
        assert_eq!(faint.fill_color, StabilityClass::C.profile().display_color);
    }

    #[test]
    fn test_degenerate_inputs_do_not_panic() {
        let config = PlumeConfig::default();
        let mut i = input(f32::INFINITY, 3.0, StabilityClass::A);
        i.render_scale = f32::NAN;
        i.source = Point2::new(f32::NAN, 12.0);
        let g = directional(compute_plume(&i, &config));
        assert_eq!(g.travel_bearing, Degrees::new(180.0));
        assert_eq!(g.length, 0.0);
        assert!(g.outline.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
