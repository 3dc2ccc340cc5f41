//! Vertical hand position → volume.

/// Raising the hand (smaller `y`) raises the volume.  A frame with no
/// height yields silence.
pub fn volume_from_height(center_y: f64, frame_height: f64) -> f64 {
    if frame_height <= 0.0 {
        return 0.0;
    }
    ((frame_height - center_y) / frame_height).clamp(0.0, 1.0)
}
