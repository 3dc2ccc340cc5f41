//! # theremin_engine
//!
//! Maps live hand geometry onto the two parameters of a tone generator.
//!
//! ## Hand → parameter mapping
//!
//! | Hand | Feature | Parameter |
//! |---|---|---|
//! | Frequency side (Right by default) | box area, fingertip spread, x, box width | frequency |
//! | Volume side | vertical center | volume `[0, 1]` |
//! | none | — | frequency 0, volume 0 |
//!
//! ## Frequency mappers
//!
//! Exactly one runs per session, chosen by [`config::MapperKind`]:
//!
//! * **Crisp** — weighted sum of normalised area and openness.
//! * **Fuzzy** (default) — 27-rule Mamdani system over proximity, distance
//!   and openness, centroid-defuzzified.
//! * **Depth** — pinhole-model distance from the box width, mapped inversely
//!   onto the frequency range.
//!
//! ## Quick start
//!
//! ```rust
//! use theremin_engine::config::EngineConfig;
//! use theremin_engine::controller::{AudioSink, Frame, FrameController, FrequencyMapper};
//!
//! struct Quiet;
//! impl AudioSink for Quiet {
//!     fn set_frequency(&mut self, _hz: f64) {}
//!     fn set_volume(&mut self, _level: f64) {}
//! }
//!
//! let cfg = EngineConfig::default();
//! let mapper = FrequencyMapper::from_config(&cfg, None).unwrap();
//! let mut controller = FrameController::new(&cfg, mapper, Quiet).unwrap();
//! let report = controller.process(&Frame::empty(640, 480));
//! assert_eq!(report.frequency, 0.0);
//! ```

pub mod error;
pub mod config;
pub mod hand;
pub mod depth;
pub mod crisp;
pub mod fuzzy;
pub mod volume;
pub mod controller;

pub use config::EngineConfig;
pub use controller::{AudioSink, Frame, FrameController, FrameReport, FrequencyMapper, LandmarkSource};
pub use hand::{HandFeatures, HandObservation, Handedness, Landmark};
