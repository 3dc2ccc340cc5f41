//! Hand observations and the scalar features derived from them.
//!
//! A [`HandObservation`] is what the external landmark detector hands us for
//! one hand in one frame: 21 pixel-space landmarks, the bounding box around
//! them, its center and the handedness label.  Nothing here outlives the
//! frame it was built for.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (21-point hand model)
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Fingertips, thumb to pinky.  Openness walks consecutive pairs of these.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Value types
// ════════════════════════════════════════════════════════════════════════════

/// Which hand the detector believes it saw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// The opposite label.  Detectors that assume a mirrored (selfie) image
    /// report the wrong side for an unmirrored camera.
    pub fn mirrored(self) -> Self {
        match self {
            Handedness::Left  => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

/// One landmark: pixel x/y plus the detector's relative depth proxy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Landmark { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A single detected hand in the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks:  Vec<Landmark>,
    pub bbox:       BoundingBox,
    pub center:     Point,
    pub handedness: Handedness,
}

impl HandObservation {
    /// Build an observation from pixel-space landmarks, deriving the box
    /// the same way the detector does: truncate to whole pixels, take the
    /// min/max extent, and halve width/height with integer division for the
    /// center.
    pub fn from_landmarks(landmarks: Vec<Landmark>, handedness: Handedness) -> Self {
        if landmarks.is_empty() {
            return HandObservation {
                landmarks,
                bbox: BoundingBox::default(),
                center: Point::default(),
                handedness,
            };
        }

        let (mut xmin, mut xmax) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
        for lm in &landmarks {
            let (px, py) = (lm.x.trunc(), lm.y.trunc());
            xmin = xmin.min(px);
            xmax = xmax.max(px);
            ymin = ymin.min(py);
            ymax = ymax.max(py);
        }

        let (w, h) = (xmax - xmin, ymax - ymin);
        let bbox = BoundingBox { x: xmin, y: ymin, width: w, height: h };
        let center = Point {
            x: xmin + (w / 2.0).floor(),
            y: ymin + (h / 2.0).floor(),
        };

        HandObservation { landmarks, bbox, center, handedness }
    }

    /// Build an observation from detector-normalised coordinates in `[0, 1]`.
    /// Depth is scaled by the frame width, as the detector does.
    pub fn from_normalized(
        landmarks:    &[Landmark],
        frame_width:  u32,
        frame_height: u32,
        handedness:   Handedness,
    ) -> Self {
        let (w, h) = (frame_width as f64, frame_height as f64);
        let pixels = landmarks.iter()
            .map(|lm| Landmark::new(
                (lm.x * w).trunc(),
                (lm.y * h).trunc(),
                (lm.z * w).trunc(),
            ))
            .collect();
        Self::from_landmarks(pixels, handedness)
    }

    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Feature extraction
// ════════════════════════════════════════════════════════════════════════════

/// Scalar features of one hand, all in pixel units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFeatures {
    /// Bounding-box area (px²).
    pub area: f64,
    /// Geometric mean of the gaps between consecutive fingertips (px).
    pub openness: f64,
    /// Horizontal position of the hand center (px).
    pub horizontal_position: f64,
    /// Bounding-box width (px).
    pub bbox_width: f64,
}

/// Compute every feature of `hand`.
///
/// Fails only when the hand has fewer than 21 landmarks; callers treat that
/// as "no usable hand".
pub fn extract_features(hand: &HandObservation) -> Result<HandFeatures, GeometryError> {
    if !hand.is_complete() {
        return Err(GeometryError::TooFewLandmarks {
            expected: LANDMARK_COUNT,
            actual:   hand.landmarks.len(),
        });
    }

    Ok(HandFeatures {
        area:                hand.bbox.area(),
        openness:            openness(&hand.landmarks),
        horizontal_position: hand.center.x,
        bbox_width:          hand.bbox.width,
    })
}

/// 2D Euclidean distance between two landmarks; depth is ignored.
pub fn landmark_distance(a: &Landmark, b: &Landmark) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Geometric mean of the four consecutive fingertip gaps.
///
/// Returns 0 when a fingertip is missing or any gap is zero, where the
/// logarithm would be undefined.
pub fn openness(landmarks: &[Landmark]) -> f64 {
    let tips: Vec<&Landmark> = FINGERTIPS.iter()
        .filter_map(|&i| landmarks.get(i))
        .collect();
    if tips.len() < 2 {
        return 0.0;
    }

    let gaps: Vec<f64> = tips.windows(2)
        .map(|pair| landmark_distance(pair[0], pair[1]))
        .collect();
    if gaps.iter().any(|&d| d <= 0.0) {
        return 0.0;
    }

    let mean_log = gaps.iter().map(|d| d.ln()).sum::<f64>() / gaps.len() as f64;
    mean_log.exp()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
