//! Pasquill-Gifford stability classes and their plume display profiles
//!
//! Stability describes how strongly the lower atmosphere mixes. Unstable air
//! (strong solar heating, light winds) spreads an odour plume wide but the
//! smell dilutes quickly; stable air (clear nights) keeps the plume narrow and
//! lets it persist further downwind.
//!
//! The profile values are display coefficients for a decision-support map,
//! not calibrated dispersion coefficients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pasquill-Gifford atmospheric stability classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StabilityClass {
    /// A: Very unstable (strong solar heating, light winds)
    A,
    /// B: Moderately unstable
    B,
    /// C: Slightly unstable
    C,
    /// D: Neutral (overcast or high winds)
    D,
    /// E: Slightly stable
    E,
    /// F: Stable (nighttime, light winds)
    F,
}

/// RGB colour used to fill a plume or calm-air indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl DisplayColor {
    /// Create a colour from its channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style `#rrggbb` string
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Display and spread parameters for one stability class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityProfile {
    /// Lateral growth of the plume width per unit of downwind distance
    pub spread_rate: f32,
    /// Length multiplier; shorter-lived plumes in unstable air, longer in stable air
    pub persistence: f32,
    /// Fill colour for plume overlays
    pub display_color: DisplayColor,
    /// Human-readable label
    pub label: &'static str,
}

const PROFILE_A: StabilityProfile = StabilityProfile {
    spread_rate: 0.50,
    persistence: 0.70,
    display_color: DisplayColor::rgb(0xef, 0x44, 0x44),
    label: "Very unstable",
};

const PROFILE_B: StabilityProfile = StabilityProfile {
    spread_rate: 0.40,
    persistence: 0.80,
    display_color: DisplayColor::rgb(0xf9, 0x73, 0x16),
    label: "Moderately unstable",
};

const PROFILE_C: StabilityProfile = StabilityProfile {
    spread_rate: 0.32,
    persistence: 0.90,
    display_color: DisplayColor::rgb(0xea, 0xb3, 0x08),
    label: "Slightly unstable",
};

const PROFILE_D: StabilityProfile = StabilityProfile {
    spread_rate: 0.25,
    persistence: 1.00,
    display_color: DisplayColor::rgb(0x22, 0xc5, 0x5e),
    label: "Neutral",
};

const PROFILE_E: StabilityProfile = StabilityProfile {
    spread_rate: 0.18,
    persistence: 1.15,
    display_color: DisplayColor::rgb(0x3b, 0x82, 0xf6),
    label: "Slightly stable",
};

const PROFILE_F: StabilityProfile = StabilityProfile {
    spread_rate: 0.12,
    persistence: 1.30,
    display_color: DisplayColor::rgb(0x8b, 0x5c, 0xf6),
    label: "Stable",
};

impl StabilityClass {
    /// Every class, most to least turbulent
    pub const ALL: [StabilityClass; 6] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
        StabilityClass::E,
        StabilityClass::F,
    ];

    /// Class used whenever the input classification is not recognized
    pub const NEUTRAL: StabilityClass = StabilityClass::D;

    /// Look up the display profile for this class
    #[must_use]
    pub fn profile(&self) -> &'static StabilityProfile {
        match self {
            StabilityClass::A => &PROFILE_A,
            StabilityClass::B => &PROFILE_B,
            StabilityClass::C => &PROFILE_C,
            StabilityClass::D => &PROFILE_D,
            StabilityClass::E => &PROFILE_E,
            StabilityClass::F => &PROFILE_F,
        }
    }

    /// Single-letter code
    #[must_use]
    pub fn letter(&self) -> char {
        match self {
            StabilityClass::A => 'A',
            StabilityClass::B => 'B',
            StabilityClass::C => 'C',
            StabilityClass::D => 'D',
            StabilityClass::E => 'E',
            StabilityClass::F => 'F',
        }
    }

    /// Parse a classification, falling back to neutral for anything unknown
    ///
    /// Accepts the letter codes (any case) and the profile labels.
    #[must_use]
    pub fn parse_or_neutral(raw: &str) -> StabilityClass {
        raw.parse().unwrap_or_else(|_| {
            tracing::debug!(raw, "unrecognized stability class, using neutral");
            StabilityClass::NEUTRAL
        })
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.letter(), self.profile().label)
    }
}

/// Returned by the strict `FromStr` when a classification is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStabilityClass(pub String);

impl fmt::Display for UnknownStabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stability class '{}'", self.0)
    }
}

impl std::error::Error for UnknownStabilityClass {}

impl FromStr for StabilityClass {
    type Err = UnknownStabilityClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let class = match normalized.as_str() {
            "a" | "very unstable" => StabilityClass::A,
            "b" | "moderately unstable" => StabilityClass::B,
            "c" | "slightly unstable" => StabilityClass::C,
            "d" | "neutral" => StabilityClass::D,
            "e" | "slightly stable" => StabilityClass::E,
            "f" | "stable" | "very stable" => StabilityClass::F,
            _ => return Err(UnknownStabilityClass(s.to_string())),
        };
        Ok(class)
    }
}
