//! Monocular depth estimate from the hand's bounding-box width.
//!
//! Pinhole model: an object of real width `W` at distance `D` projects to
//! `w = f·W / D` pixels, so `D = f·W / w`.  The estimate is then mapped onto
//! the frequency range, nearer hands playing higher.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{DepthConfig, Range};
use crate::error::{CalibrationError, ConfigError};

// ════════════════════════════════════════════════════════════════════════════
// Calibration artifact
// ════════════════════════════════════════════════════════════════════════════

/// Camera intrinsics produced by a chessboard calibration run.
///
/// Stored as JSON with two arrays keyed by name:
///
/// ```json
/// { "camera_matrix": [[fx, 0, cx], [0, fy, cy], [0, 0, 1]],
///   "dist_coeffs":   [k1, k2, p1, p2, k3] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    pub camera_matrix: Vec<Vec<f64>>,
    pub dist_coeffs:   Vec<f64>,
}

impl CameraCalibration {
    pub fn from_json_str(text: &str) -> Result<Self, CalibrationError> {
        let cal: CameraCalibration = serde_json::from_str(text)?;
        cal.check()?;
        Ok(cal)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Horizontal focal length `fx` in pixels.
    pub fn focal_length(&self) -> f64 {
        self.camera_matrix[0][0]
    }

    fn check(&self) -> Result<(), CalibrationError> {
        if self.camera_matrix.len() != 3 || self.camera_matrix.iter().any(|r| r.len() != 3) {
            return Err(CalibrationError::MatrixShape { rows: self.camera_matrix.len() });
        }
        if self.dist_coeffs.is_empty() || self.dist_coeffs.len() > 14 {
            return Err(CalibrationError::DistortionShape(self.dist_coeffs.len()));
        }
        let fx = self.focal_length();
        if !(fx > 0.0) {
            return Err(CalibrationError::FocalLength(fx));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DepthEstimator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct DepthEstimator {
    focal_length:    f64,
    hand_real_width: f64,
    depth:           Range,
    frequency:       Range,
}

impl DepthEstimator {
    pub fn new(
        focal_length:    f64,
        hand_real_width: f64,
        depth:           Range,
        frequency:       Range,
    ) -> Result<Self, ConfigError> {
        if !(focal_length > 0.0) {
            return Err(ConfigError::NotPositive { name: "depth.focal_length_px", value: focal_length });
        }
        if !(hand_real_width > 0.0) {
            return Err(ConfigError::NotPositive { name: "depth.hand_real_width", value: hand_real_width });
        }
        depth.validate("depth.depth")?;
        frequency.validate("frequency")?;
        Ok(DepthEstimator { focal_length, hand_real_width, depth, frequency })
    }

    /// Build from configuration and an already-loaded calibration, which
    /// takes precedence over an explicit focal length.
    pub fn from_config(
        cfg:         &DepthConfig,
        calibration: Option<&CameraCalibration>,
        frequency:   Range,
    ) -> Result<Self, ConfigError> {
        let focal = calibration
            .map(CameraCalibration::focal_length)
            .or(cfg.focal_length_px)
            .ok_or(ConfigError::MissingFocalLength)?;
        Self::new(focal, cfg.hand_real_width, cfg.depth, frequency)
    }

    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    /// Distance (cm) of a hand whose box is `bbox_width` pixels wide.
    /// A zero-width box is treated as the far limit.
    pub fn estimate_depth(&self, bbox_width: f64) -> f64 {
        if bbox_width == 0.0 {
            return self.depth.max;
        }
        self.focal_length * self.hand_real_width / bbox_width
    }

    /// Inverse-linear map of depth onto the frequency range.
    pub fn depth_to_frequency(&self, depth: f64) -> f64 {
        let d = self.depth.clamp(depth);
        let (f_min, f_max) = (self.frequency.min, self.frequency.max);
        f_min + (f_max - f_min) * (self.depth.max - d) / self.depth.span()
    }

    /// `(frequency, depth)` for a box width.
    pub fn compute_tone_depth(&self, bbox_width: f64) -> (f64, f64) {
        let depth = self.estimate_depth(bbox_width);
        (self.depth_to_frequency(depth), depth)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> DepthEstimator {
        DepthEstimator::new(600.0, 18.0, Range::new(30.0, 250.0), Range::new(200.0, 600.0)).unwrap()
    }

    #[test]
    fn zero_width_is_far() {
        assert_eq!(estimator().estimate_depth(0.0), 250.0);
    }

    #[test]
    fn pinhole_depth() {
        // 600 px · 18 cm / 108 px = 100 cm
        assert!((estimator().estimate_depth(108.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn boundary_inversion() {
        let e = estimator();
        assert_eq!(e.depth_to_frequency(30.0), 600.0);
        assert_eq!(e.depth_to_frequency(250.0), 200.0);
        assert_eq!(e.depth_to_frequency(140.0), 400.0);
    }

    #[test]
    fn out_of_range_depth_is_clamped() {
        let e = estimator();
        assert_eq!(e.depth_to_frequency(5.0), 600.0);
        assert_eq!(e.depth_to_frequency(1e6), 200.0);
    }

    #[test]
    fn nearer_is_higher() {
        let e = estimator();
        let (near, _) = e.compute_tone_depth(300.0);
        let (far, _)  = e.compute_tone_depth(60.0);
        assert!(near > far);
    }

    #[test]
    fn inverted_depth_range_is_rejected() {
        let r = DepthEstimator::new(600.0, 18.0, Range::new(250.0, 30.0), Range::new(200.0, 600.0));
        assert!(matches!(r, Err(ConfigError::EmptyRange { .. })));
    }

    #[test]
    fn calibration_sets_focal_length() {
        let cal = CameraCalibration::from_json_str(r#"{
            "camera_matrix": [[812.5, 0.0, 320.0], [0.0, 810.0, 240.0], [0.0, 0.0, 1.0]],
            "dist_coeffs":   [0.1, -0.2, 0.0, 0.0, 0.05]
        }"#).unwrap();
        let mut cfg = DepthConfig::default();
        cfg.focal_length_px = Some(100.0);
        let e = DepthEstimator::from_config(&cfg, Some(&cal), Range::new(200.0, 600.0)).unwrap();
        assert_eq!(e.focal_length(), 812.5);
    }

    #[test]
    fn missing_focal_length_disables_depth() {
        let r = DepthEstimator::from_config(&DepthConfig::default(), None, Range::new(200.0, 600.0));
        assert_eq!(r, Err(ConfigError::MissingFocalLength));
    }

    #[test]
    fn malformed_calibration_is_rejected() {
        let r = CameraCalibration::from_json_str(r#"{
            "camera_matrix": [[800.0, 0.0], [0.0, 800.0]],
            "dist_coeffs":   [0.0]
        }"#);
        assert!(matches!(r, Err(CalibrationError::MatrixShape { rows: 2 })));

        let r = CameraCalibration::from_json_str(r#"{
            "camera_matrix": [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            "dist_coeffs":   [0.0]
        }"#);
        assert!(matches!(r, Err(CalibrationError::FocalLength(_))));
    }
}
