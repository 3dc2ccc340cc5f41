//! # theremin_live
//!
//! Runs the gesture theremin against real inputs and outputs.
//!
//! ## Sources
//!
//! | Source | Frames from |
//! |---|---|
//! | `sim` | A scripted two-handed performance, no camera needed |
//! | `jsonl` | One JSON frame per line from an external hand detector |
//!
//! ## Sinks
//!
//! | Sink | Output |
//! |---|---|
//! | `null` | Nothing |
//! | `log` | Frequency and volume changes at `info` |
//! | `midi` | A held note with pitch bend and channel volume on a MIDI port |
//!
//! Sinks run on their own thread behind [`sink::SinkWorker`] so output
//! latency never holds up the frame loop.

pub mod source;
pub mod sink;
pub mod app;
