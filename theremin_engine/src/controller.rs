//! Per-frame orchestration.
//!
//! The controller owns the selected frequency mapper and the audio sink.
//! For every frame it assigns hands to their roles, maps them, and pushes
//! exactly one frequency and one volume, so the instrument falls silent as
//! soon as the hands leave the picture.
//!
//! | Hands in frame | Frequency pushed | Volume pushed |
//! |---|---|---|
//! | none | 0 | 0 |
//! | frequency hand | mapper output | volume hand height, or 0 |
//! | volume hand only | last frequency (held) | volume hand height |

use log::{debug, warn};

use crate::config::{EngineConfig, MapperKind};
use crate::crisp::CrispMapper;
use crate::depth::{CameraCalibration, DepthEstimator};
use crate::error::{ConfigError, SourceError};
use crate::fuzzy::{CrispInputs, FuzzyEngine};
use crate::hand::{extract_features, HandFeatures, HandObservation, Handedness};
use crate::volume::volume_from_height;

// ════════════════════════════════════════════════════════════════════════════
// Collaborator interfaces
// ════════════════════════════════════════════════════════════════════════════

/// Everything the detector reports for one captured frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width:  u32,
    pub height: u32,
    pub hands:  Vec<HandObservation>,
}

impl Frame {
    pub fn empty(width: u32, height: u32) -> Self {
        Frame { width, height, hands: Vec::new() }
    }
}

/// Delivers frames in capture order.  `Ok(None)` ends the stream cleanly;
/// an error ends the session.  Blocking until the next frame is allowed.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

/// The tone generator.  Both calls are fire-and-forget and safe to repeat
/// with an unchanged value.
pub trait AudioSink {
    fn set_frequency(&mut self, hz: f64);
    /// `level` in `[0, 1]`.
    fn set_volume(&mut self, level: f64);
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn set_frequency(&mut self, hz: f64) { (**self).set_frequency(hz) }
    fn set_volume(&mut self, level: f64) { (**self).set_volume(level) }
}

// ════════════════════════════════════════════════════════════════════════════
// FrequencyMapper
// ════════════════════════════════════════════════════════════════════════════

/// The one frequency source active for a session.
#[derive(Debug, Clone)]
pub enum FrequencyMapper {
    Crisp(CrispMapper),
    Fuzzy(FuzzyEngine),
    Depth(DepthEstimator),
}

/// What the mapper made of the frequency hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mapped {
    Frequency(f64),
    /// The fuzzy rule base did not cover these inputs.
    NoCoverage(CrispInputs),
}

impl FrequencyMapper {
    /// Build the mapper `cfg.mapper` selects.  `calibration` is only
    /// consulted by the depth mapper.
    pub fn from_config(cfg: &EngineConfig, calibration: Option<&CameraCalibration>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let frequency = cfg.frequency_range();
        Ok(match cfg.mapper {
            MapperKind::Crisp => FrequencyMapper::Crisp(CrispMapper::new(cfg.crisp.clone(), frequency)?),
            MapperKind::Fuzzy => FrequencyMapper::Fuzzy(FuzzyEngine::new(&cfg.fuzzy, frequency)?),
            MapperKind::Depth => FrequencyMapper::Depth(DepthEstimator::from_config(&cfg.depth, calibration, frequency)?),
        })
    }

    pub fn kind(&self) -> MapperKind {
        match self {
            FrequencyMapper::Crisp(_) => MapperKind::Crisp,
            FrequencyMapper::Fuzzy(_) => MapperKind::Fuzzy,
            FrequencyMapper::Depth(_) => MapperKind::Depth,
        }
    }

    pub fn map(&self, features: &HandFeatures, frame_width: f64, frame_height: f64) -> Mapped {
        match self {
            FrequencyMapper::Crisp(m) => Mapped::Frequency(
                m.frequency(features.area, features.openness, frame_width, frame_height)),
            FrequencyMapper::Depth(m) => Mapped::Frequency(
                m.depth_to_frequency(m.estimate_depth(features.bbox_width))),
            FrequencyMapper::Fuzzy(m) => {
                let inputs = m.crisp_inputs(features, frame_width, frame_height);
                match m.infer(inputs) {
                    Ok(inf) => Mapped::Frequency(inf.frequency),
                    Err(e)  => {
                        warn!("{}", e);
                        Mapped::NoCoverage(inputs)
                    }
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameReport
// ════════════════════════════════════════════════════════════════════════════

/// What was pushed for one frame, and why.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frequency: f64,
    pub volume:    f64,
    /// Features of the frequency hand, when one was usable.
    pub features:  Option<HandFeatures>,
    /// The fuzzy engine could not cover this frame; `frequency` was held.
    pub no_coverage: bool,
    pub hands_seen:  usize,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameController
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameController<S: AudioSink> {
    mapper:          FrequencyMapper,
    frequency_hand:  Handedness,
    swap_handedness: bool,
    max_hands:       usize,
    sink:            S,
    /// Last frequency pushed; re-pushed when there is nothing new to say.
    last_frequency:  f64,
}

impl<S: AudioSink> FrameController<S> {
    pub fn new(cfg: &EngineConfig, mapper: FrequencyMapper, sink: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(FrameController {
            mapper,
            frequency_hand:  cfg.hands.frequency_hand,
            swap_handedness: cfg.hands.swap_handedness,
            max_hands:       cfg.hands.max_hands,
            sink,
            last_frequency:  0.0,
        })
    }

    pub fn mapper(&self) -> &FrequencyMapper { &self.mapper }
    pub fn sink(&self) -> &S { &self.sink }

    /// Map one frame and push both parameters.
    pub fn process(&mut self, frame: &Frame) -> FrameReport {
        let (w, h) = (frame.width as f64, frame.height as f64);
        let hands: Vec<&HandObservation> = frame.hands.iter().take(self.max_hands).collect();

        if hands.is_empty() {
            self.push(0.0, 0.0);
            debug!("no hands: frequency 0, volume 0");
            return FrameReport {
                frequency: 0.0, volume: 0.0, features: None,
                no_coverage: false, hands_seen: 0,
            };
        }

        let mut freq_hand = None;
        let mut vol_hand  = None;
        for hand in &hands {
            let side = if self.swap_handedness { hand.handedness.mirrored() } else { hand.handedness };
            if side == self.frequency_hand {
                freq_hand = Some(*hand);
            } else {
                vol_hand = Some(*hand);
            }
        }

        let features = freq_hand.and_then(|hand| match extract_features(hand) {
            Ok(f)  => Some(f),
            Err(e) => {
                warn!("frequency hand unusable: {}", e);
                None
            }
        });

        let mut no_coverage = false;
        let frequency = match features {
            Some(ref f) => match self.mapper.map(f, w, h) {
                Mapped::Frequency(hz)  => hz,
                Mapped::NoCoverage(_)  => {
                    no_coverage = true;
                    self.last_frequency
                }
            },
            None => self.last_frequency,
        };

        let volume = vol_hand.map_or(0.0, |hand| volume_from_height(hand.center.y, h));

        if let Some(f) = features {
            debug!(
                "area={:.0} openness={:.2} x={:.0} width={:.0} → {:.2} Hz, volume {:.2}",
                f.area, f.openness, f.horizontal_position, f.bbox_width, frequency, volume
            );
        }

        self.push(frequency, volume);
        FrameReport { frequency, volume, features, no_coverage, hands_seen: hands.len() }
    }

    /// Push silence.  Used when a session ends.
    pub fn mute(&mut self) {
        self.push(0.0, 0.0);
    }

    fn push(&mut self, frequency: f64, volume: f64) {
        self.last_frequency = frequency;
        self.sink.set_frequency(frequency);
        self.sink.set_volume(volume);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
