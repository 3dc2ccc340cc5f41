//! Landmark sources — a scripted simulator and a JSON-lines reader for an
//! external detector process.
//!
//! Consumers only see [`LandmarkSource`]; whether frames came from a camera
//! pipeline or the simulator makes no difference to the controller.

use std::f64::consts::PI;
use std::io::BufRead;
use std::thread;
use std::time::Duration;

use serde::Deserialize;

use theremin_engine::controller::{Frame, LandmarkSource};
use theremin_engine::error::SourceError;
use theremin_engine::hand::{HandObservation, Handedness, Landmark, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// SimulatedSource — no detector needed
// ════════════════════════════════════════════════════════════════════════════

/// Synthesises a two-handed performance: the right hand breathes in size
/// and spread while sweeping sideways, the left hand rises and falls.
/// A hand leaves the frame for a moment every `cycle` frames so the mute
/// path is exercised too.
pub struct SimulatedSource {
    width:  u32,
    height: u32,
    frame:  usize,
    limit:  Option<usize>,
    cycle:  usize,
    pace:   Option<Duration>,
}

impl SimulatedSource {
    pub fn new(width: u32, height: u32) -> Self {
        SimulatedSource { width, height, frame: 0, limit: None, cycle: 240, pace: None }
    }

    /// Stop after `frames` frames.
    pub fn limit(mut self, frames: usize) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Sleep this long before each frame, like a camera would block.
    pub fn pace(mut self, period: Duration) -> Self {
        self.pace = Some(period);
        self
    }

    fn hands_at(&self, i: usize) -> Vec<HandObservation> {
        let phase = (i % self.cycle) as f64 / self.cycle as f64;
        // Last tenth of each cycle: nobody in front of the camera.
        if phase >= 0.9 {
            return Vec::new();
        }
        let (w, h) = (self.width as f64, self.height as f64);
        let wave = (2.0 * PI * phase).sin();

        let right = synthetic_hand(
            (w * (0.55 + 0.2 * wave), h * 0.5),
            h * (0.18 + 0.08 * wave),
            12.0 + 8.0 * wave,
            Handedness::Right,
        );
        let left = synthetic_hand(
            (w * 0.2, h * (0.5 - 0.35 * wave)),
            h * 0.15,
            10.0,
            Handedness::Left,
        );
        vec![left, right]
    }
}

impl LandmarkSource for SimulatedSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.limit.is_some_and(|n| self.frame >= n) {
            return Ok(None);
        }
        if let Some(p) = self.pace {
            thread::sleep(p);
        }
        let hands = self.hands_at(self.frame);
        self.frame += 1;
        Ok(Some(Frame { width: self.width, height: self.height, hands }))
    }
}

/// A plausible 21-point hand: five straight fingers of four joints fanning
/// out from the wrist, `spread_deg` apart, `size` px long.
pub fn synthetic_hand(palm: (f64, f64), size: f64, spread_deg: f64, handedness: Handedness) -> HandObservation {
    let wrist = Landmark::new(palm.0, palm.1 + size * 0.5, 0.0);
    let mut lms = Vec::with_capacity(LANDMARK_COUNT);
    lms.push(wrist);
    for finger in 0..5 {
        let angle = (-90.0 + (finger as f64 - 2.0) * spread_deg).to_radians();
        let (dx, dy) = (angle.cos(), angle.sin());
        for joint in 1..=4 {
            let reach = size * joint as f64 / 4.0;
            lms.push(Landmark::new(wrist.x + dx * reach, wrist.y + dy * reach, -(joint as f64)));
        }
    }
    HandObservation::from_landmarks(lms, handedness)
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — external detector
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: Handedness,
    landmarks:  Vec<[f64; 3]>,
}

#[derive(Deserialize, Debug)]
struct FrameJson {
    width:  u32,
    height: u32,
    /// Landmarks are in `[0, 1]` rather than pixels.
    #[serde(default)]
    normalized: bool,
    #[serde(default)]
    hands: Vec<HandJson>,
}

/// Reads one frame per line:
///
/// ```json
/// {"width":640,"height":480,"normalized":true,
///  "hands":[{"handedness":"Right","landmarks":[[0.51,0.62,-0.01], ...]}]}
/// ```
///
/// Blank lines are skipped.  A line that does not parse ends the session.
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line:   usize,
    buf:    String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource { reader, line: 0, buf: String::new() }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let line = self.line;
            let malformed = |reason: String| SourceError::Malformed { line, reason };
            let parsed: FrameJson = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
            return to_frame(parsed).map(Some).map_err(malformed);
        }
    }
}

/// Largest coordinate magnitude accepted from a detector, in either unit.
/// Anything beyond this is a broken detector, not a hand.
const MAX_COORDINATE: f64 = 1.0e6;

fn to_frame(f: FrameJson) -> Result<Frame, String> {
    let mut hands = Vec::with_capacity(f.hands.len());
    for (i, h) in f.hands.into_iter().enumerate() {
        let mut lms = Vec::with_capacity(h.landmarks.len());
        for [x, y, z] in h.landmarks {
            if [x, y, z].iter().any(|v| !v.is_finite() || v.abs() > MAX_COORDINATE) {
                return Err(format!("hand {}: landmark [{}, {}, {}] out of range", i, x, y, z));
            }
            lms.push(Landmark::new(x, y, z));
        }
        hands.push(if f.normalized {
            HandObservation::from_normalized(&lms, f.width, f.height, h.handedness)
        } else {
            HandObservation::from_landmarks(lms, h.handedness)
        });
    }
    Ok(Frame { width: f.width, height: f.height, hands })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
