//! Mapping configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.  [`EngineConfig::validate`] is the single place where the
//! bounded-quantity invariants are checked; the mappers call it (or the
//! relevant part of it) from their constructors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hand::Handedness;

// ════════════════════════════════════════════════════════════════════════════
// Range
// ════════════════════════════════════════════════════════════════════════════

/// A closed scalar interval `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Range { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        // `!(min < max)` also rejects NaN bounds.
        if !(self.min < self.max) {
            return Err(ConfigError::EmptyRange { name, min: self.min, max: self.max });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Mapper selection
// ════════════════════════════════════════════════════════════════════════════

/// Which frequency source runs for the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperKind {
    Crisp,
    #[default]
    Fuzzy,
    Depth,
}

impl std::str::FromStr for MapperKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crisp" => Ok(MapperKind::Crisp),
            "fuzzy" => Ok(MapperKind::Fuzzy),
            "depth" => Ok(MapperKind::Depth),
            other   => Err(format!("unknown mapper `{}` (crisp, fuzzy, depth)", other)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Empirical constants of the weighted-sum mapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrispConfig {
    /// Fraction of the frame area treated as a full-size hand.
    pub frame_area_fraction: f64,
    /// Openness (px) at which the openness term saturates.
    pub openness_scale: f64,
    pub area_weight: f64,
    pub openness_weight: f64,
}

impl Default for CrispConfig {
    fn default() -> Self {
        CrispConfig {
            frame_area_fraction: 0.25,
            openness_scale:      150.0,
            area_weight:         0.75,
            openness_weight:     0.25,
        }
    }
}

impl CrispConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("crisp.frame_area_fraction", self.frame_area_fraction)?;
        positive("crisp.openness_scale", self.openness_scale)?;
        let (a, o) = (self.area_weight, self.openness_weight);
        if !(a >= 0.0 && o >= 0.0 && ((a + o) - 1.0).abs() <= 1e-9) {
            return Err(ConfigError::BlendWeights { area: a, openness: o });
        }
        Ok(())
    }
}

/// Shape of the low/medium/high membership functions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipShape {
    #[default]
    Gaussian,
    /// Piecewise-linear sets.  Poorly behaved at the domain edges; kept for
    /// comparison only.
    Triangular,
}

/// How a rule's firing strength shapes its consequent set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implication {
    /// Clip the consequent at the firing strength (Mamdani).
    #[default]
    Minimum,
    /// Scale the consequent by the firing strength (Larsen).
    Product,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Normalised bounding-box area, percent of the frame.
    pub proximity: Range,
    /// Horizontal hand position (px).
    pub distance: Range,
    /// Fingertip spread (px).
    pub openness: Range,
    pub shape: MembershipShape,
    pub implication: Implication,
    /// Sampling step of the output universe for the centroid.
    pub resolution: f64,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        FuzzyConfig {
            proximity:   Range::new(1.0, 25.0),
            distance:    Range::new(30.0, 250.0),
            openness:    Range::new(20.0, 100.0),
            shape:       MembershipShape::Gaussian,
            implication: Implication::Minimum,
            resolution:  1.0,
        }
    }
}

impl FuzzyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.proximity.validate("fuzzy.proximity")?;
        self.distance.validate("fuzzy.distance")?;
        self.openness.validate("fuzzy.openness")?;
        positive("fuzzy.resolution", self.resolution)
    }
}

/// Pinhole-model constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Assumed real-world hand width (cm).
    pub hand_real_width: f64,
    /// Expected hand distance from the camera (cm).
    pub depth: Range,
    /// Focal length in pixels, used when no calibration artifact is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length_px: Option<f64>,
    /// Calibration artifact holding `camera_matrix` and `dist_coeffs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_path: Option<PathBuf>,
}

impl Default for DepthConfig {
    fn default() -> Self {
        DepthConfig {
            hand_real_width:  18.0,
            depth:            Range::new(30.0, 250.0),
            focal_length_px:  None,
            calibration_path: None,
        }
    }
}

impl DepthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("depth.hand_real_width", self.hand_real_width)?;
        self.depth.validate("depth.depth")?;
        if let Some(f) = self.focal_length_px {
            positive("depth.focal_length_px", f)?;
        }
        Ok(())
    }
}

/// Which hand drives which parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandsConfig {
    /// The side that controls frequency; the other side controls volume.
    pub frequency_hand: Handedness,
    /// Flip every handedness label before assignment.
    pub swap_handedness: bool,
    /// Hands beyond this count (in detector order) are ignored.
    pub max_hands: usize,
}

impl Default for HandsConfig {
    fn default() -> Self {
        HandsConfig {
            frequency_hand:  Handedness::Right,
            swap_handedness: false,
            max_hands:       2,
        }
    }
}

impl HandsConfig {
    pub fn volume_hand(&self) -> Handedness {
        self.frequency_hand.mirrored()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mapper: MapperKind,
    /// Output frequency bounds (Hz), shared by every mapper.
    pub frequency: FrequencyRange,
    pub crisp: CrispConfig,
    pub fuzzy: FuzzyConfig,
    pub depth: DepthConfig,
    pub hands: HandsConfig,
}

/// Newtype so the frequency bounds get their own serde default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyRange(pub Range);

impl Default for FrequencyRange {
    fn default() -> Self {
        FrequencyRange(Range::new(200.0, 600.0))
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn frequency_range(&self) -> Range {
        self.frequency.0
    }

    /// Check every invariant, including the sections of mappers that are
    /// not selected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frequency.0.validate("frequency")?;
        self.crisp.validate()?;
        self.fuzzy.validate()?;
        self.depth.validate()?;
        if self.hands.max_hands == 0 {
            return Err(ConfigError::NoHands);
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
