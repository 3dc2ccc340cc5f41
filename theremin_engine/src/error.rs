//! Error kinds raised by the mapping engine.
//!
//! Degenerate geometry and capture failures are handled by the frame
//! controller; configuration errors are only ever raised at construction.

use thiserror::Error;

/// A configured quantity violates its invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name}: min ({min}) must be less than max ({max})")]
    EmptyRange { name: &'static str, min: f64, max: f64 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("blend weights must be non-negative and sum to 1 (area={area}, openness={openness})")]
    BlendWeights { area: f64, openness: f64 },

    #[error("max_hands must be at least 1")]
    NoHands,

    #[error("depth mapper needs a focal length: set depth.focal_length_px or depth.calibration_path")]
    MissingFocalLength,
}

/// The hand observation cannot produce features.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("expected {expected} landmarks, got {actual}")]
    TooFewLandmarks { expected: usize, actual: usize },
}

/// The fuzzy engine could not produce an output for this frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Every rule fired with zero strength, so the aggregated output has no
    /// mass to take a centroid of.
    #[error("no rule covers inputs proximity={proximity} distance={distance} openness={openness}")]
    NoCoverage { proximity: f64, distance: f64, openness: f64 },
}

/// The persisted camera calibration could not be used.
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("failed to read calibration artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse calibration artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("camera_matrix must be 3x3, got {rows} rows")]
    MatrixShape { rows: usize },

    #[error("dist_coeffs must hold 1 to 14 values, got {0}")]
    DistortionShape(usize),

    #[error("focal length must be positive, got {0}")]
    FocalLength(f64),
}

/// The landmark source failed to deliver a frame.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("capture failed: {0}")]
    Capture(String),

    #[error("malformed frame on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
