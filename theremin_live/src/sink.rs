//! Audio sinks.
//!
//! The engine only knows [`AudioSink`]; this module supplies the concrete
//! ones.  A real oscillator lives outside the process, so the audible sink
//! drives an external synthesiser over MIDI: the frequency becomes the
//! nearest note plus a pitch bend, the volume becomes channel volume.
//!
//! [`SinkWorker`] moves any sink onto its own thread so a slow output port
//! never stalls the frame loop.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

use theremin_engine::AudioSink;

// ════════════════════════════════════════════════════════════════════════════
// NullSink / LogSink
// ════════════════════════════════════════════════════════════════════════════

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn set_frequency(&mut self, _hz: f64) {}
    fn set_volume(&mut self, _level: f64) {}
}

/// Logs changes at `info`, repeats at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink {
    frequency: f64,
    volume:    f64,
}

impl AudioSink for LogSink {
    fn set_frequency(&mut self, hz: f64) {
        if hz != self.frequency {
            info!("frequency {:.2} Hz", hz);
            self.frequency = hz;
        } else {
            debug!("frequency {:.2} Hz (unchanged)", hz);
        }
    }

    fn set_volume(&mut self, level: f64) {
        if level != self.volume {
            info!("volume {:.2}", level);
            self.volume = level;
        } else {
            debug!("volume {:.2} (unchanged)", level);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / recorder (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn send(&mut self, message: &[u8]);
}

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn send(&mut self, message: &[u8]) {
        if let Err(e) = self.conn.send(message) {
            warn!("MIDI send failed: {}", e);
        }
    }
}

/// Open a MIDI output port.  `wanted` selects by case-insensitive substring;
/// otherwise a software synthesiser is preferred, then the first port.
pub fn open_midi_output(wanted: Option<&str>) -> Result<Box<dyn MidiOut>> {
    let midi_out = midir::MidiOutput::new("theremin")
        .map_err(|e| anyhow!("MIDI init failed: {}", e))?;

    let ports = midi_out.ports();
    if ports.is_empty() {
        return Err(anyhow!(
            "no MIDI output ports found (start a synthesiser such as `fluidsynth` or `timidity -iA`)"
        ));
    }

    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let idx = match wanted {
        Some(w) => {
            let w = w.to_lowercase();
            names.iter()
                .position(|n| n.to_lowercase().contains(&w))
                .with_context(|| format!("no MIDI port matching {:?} (have: {})", w, names.join(", ")))?
        }
        None => names.iter()
            .position(|n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") || n.contains("microsoft") || n.contains("synth")
            })
            .unwrap_or(0),
    };

    info!("opening MIDI port: {}", names[idx]);
    let conn = midi_out
        .connect(&ports[idx], "theremin-out")
        .map_err(|e| anyhow!("failed to connect to {}: {}", names[idx], e))?;
    Ok(Box::new(MidirOut { conn }))
}

// ════════════════════════════════════════════════════════════════════════════
// Pitch arithmetic
// ════════════════════════════════════════════════════════════════════════════

/// Pitch bend range the synthesiser is expected to use, in semitones.
pub const BEND_RANGE: f64 = 2.0;
const BEND_CENTER: u16 = 8192;

/// Nearest MIDI note and the 14-bit bend that reaches `hz` from it.
/// `None` for frequencies that have no note (≤ 0 or beyond the MIDI range).
pub fn note_and_bend(hz: f64) -> Option<(u8, u16)> {
    if !(hz > 0.0) {
        return None;
    }
    let exact = 69.0 + 12.0 * (hz / 440.0).log2();
    let note = exact.round();
    if !(0.0..=127.0).contains(&note) {
        return None;
    }
    let offset = (exact - note) / BEND_RANGE;
    let bend = (BEND_CENTER as f64 + offset * BEND_CENTER as f64).round().clamp(0.0, 16383.0) as u16;
    Some((note as u8, bend))
}

// ════════════════════════════════════════════════════════════════════════════
// MidiSink
// ════════════════════════════════════════════════════════════════════════════

/// Plays the current frequency as one held note on `channel`.
///
/// A note sounds only while the frequency has a note and the volume is
/// above zero.  Moving within a semitone only bends; crossing to another
/// nearest note retriggers.
pub struct MidiSink {
    out:       Box<dyn MidiOut>,
    channel:   u8,
    velocity:  u8,
    frequency: f64,
    volume:    f64,
    sounding:  Option<u8>,
    bend:      u16,
    cc_volume: Option<u8>,
}

impl MidiSink {
    pub fn new(out: Box<dyn MidiOut>, channel: u8, program: u8) -> Self {
        let channel = channel & 0x0F;
        let mut sink = MidiSink {
            out,
            channel,
            velocity:  100,
            frequency: 0.0,
            volume:    0.0,
            sounding:  None,
            bend:      BEND_CENTER,
            cc_volume: None,
        };
        sink.out.send(&[0xC0 | channel, program & 0x7F]);
        sink
    }

    /// Open a port and wrap it.
    pub fn open(port: Option<&str>, channel: u8, program: u8) -> Result<Self> {
        Ok(MidiSink::new(open_midi_output(port)?, channel, program))
    }

    fn update(&mut self) {
        let target = if self.volume > 0.0 { note_and_bend(self.frequency) } else { None };

        match target {
            None => self.release(),
            Some((note, bend)) => {
                if bend != self.bend {
                    self.out.send(&[0xE0 | self.channel, (bend & 0x7F) as u8, (bend >> 7) as u8]);
                    self.bend = bend;
                }
                if self.sounding != Some(note) {
                    self.release();
                    self.out.send(&[0x90 | self.channel, note, self.velocity]);
                    self.sounding = Some(note);
                }
            }
        }
    }

    fn release(&mut self) {
        if let Some(note) = self.sounding.take() {
            self.out.send(&[0x80 | self.channel, note, 0]);
        }
    }
}

impl AudioSink for MidiSink {
    fn set_frequency(&mut self, hz: f64) {
        self.frequency = hz;
        self.update();
    }

    fn set_volume(&mut self, level: f64) {
        self.volume = level.clamp(0.0, 1.0);
        let cc = (self.volume * 127.0).round() as u8;
        if self.cc_volume != Some(cc) {
            self.out.send(&[0xB0 | self.channel, 7, cc]);
            self.cc_volume = Some(cc);
        }
        self.update();
    }
}

impl Drop for MidiSink {
    fn drop(&mut self) {
        self.release();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SinkWorker — a sink on its own thread
// ════════════════════════════════════════════════════════════════════════════

enum SinkCommand {
    SetFrequency(f64),
    SetVolume(f64),
    Quit,
}

/// Forwards every call, in order, to a sink owned by a background thread.
/// Dropping the worker mutes the sink and joins the thread.
pub struct SinkWorker {
    cmd_tx: Sender<SinkCommand>,
    handle: Option<JoinHandle<()>>,
}

impl SinkWorker {
    pub fn spawn<S: AudioSink + Send + 'static>(mut sink: S) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SinkCommand>();
        let handle = thread::spawn(move || {
            for cmd in cmd_rx {
                match cmd {
                    SinkCommand::SetFrequency(hz) => sink.set_frequency(hz),
                    SinkCommand::SetVolume(v)     => sink.set_volume(v),
                    SinkCommand::Quit             => break,
                }
            }
            debug!("sink worker stopped");
        });
        SinkWorker { cmd_tx, handle: Some(handle) }
    }

    fn send(&self, cmd: SinkCommand) {
        // The thread only goes away after Quit.
        let _ = self.cmd_tx.send(cmd);
    }
}

impl AudioSink for SinkWorker {
    fn set_frequency(&mut self, hz: f64) { self.send(SinkCommand::SetFrequency(hz)); }
    fn set_volume(&mut self, level: f64) { self.send(SinkCommand::SetVolume(level)); }
}

impl Drop for SinkWorker {
    fn drop(&mut self) {
        self.send(SinkCommand::SetFrequency(0.0));
        self.send(SinkCommand::SetVolume(0.0));
        self.send(SinkCommand::Quit);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                warn!("sink worker panicked");
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Wire(Arc<Mutex<Vec<Vec<u8>>>>);

    impl Wire {
        fn take(&self) -> Vec<Vec<u8>> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl MidiOut for Wire {
        fn send(&mut self, message: &[u8]) {
            self.0.lock().unwrap().push(message.to_vec());
        }
    }

    #[test]
    fn concert_a_is_note_69_unbent() {
        assert_eq!(note_and_bend(440.0), Some((69, 8192)));
    }

    #[test]
    fn sharp_a_bends_up_from_a() {
        // 49 cents above A4 stays on A4 and bends up 0.49 / 2 of the range.
        let hz = 440.0 * 2f64.powf(0.49 / 12.0);
        let (note, bend) = note_and_bend(hz).unwrap();
        assert_eq!(note, 69);
        assert!((bend as f64 - (8192.0 + 0.245 * 8192.0)).abs() <= 1.0);
    }

    #[test]
    fn silence_has_no_note() {
        assert_eq!(note_and_bend(0.0), None);
        assert_eq!(note_and_bend(-5.0), None);
        assert_eq!(note_and_bend(f64::NAN), None);
    }

    #[test]
    fn note_sounds_only_with_volume() {
        let wire = Wire::default();
        let mut sink = MidiSink::new(Box::new(wire.clone()), 0, 81);
        assert_eq!(wire.take(), vec![vec![0xC0, 81]]);

        sink.set_frequency(440.0);
        assert!(wire.take().is_empty());

        sink.set_volume(1.0);
        assert_eq!(wire.take(), vec![vec![0xB0, 7, 127], vec![0x90, 69, 100]]);

        sink.set_volume(0.0);
        assert_eq!(wire.take(), vec![vec![0xB0, 7, 0], vec![0x80, 69, 0]]);
    }

    #[test]
    fn crossing_a_note_retriggers() {
        let wire = Wire::default();
        let mut sink = MidiSink::new(Box::new(wire.clone()), 2, 0);
        sink.set_volume(0.5);
        sink.set_frequency(440.0);
        wire.take();

        sink.set_frequency(880.0);
        assert_eq!(wire.take(), vec![vec![0x82, 69, 0], vec![0x92, 81, 100]]);

        // Same frequency again: nothing to say.
        sink.set_frequency(880.0);
        assert!(wire.take().is_empty());
    }

    #[test]
    fn dropping_the_sink_releases_the_note() {
        let wire = Wire::default();
        let mut sink = MidiSink::new(Box::new(wire.clone()), 0, 0);
        sink.set_volume(1.0);
        sink.set_frequency(261.63);
        wire.take();
        drop(sink);
        assert_eq!(wire.take(), vec![vec![0x80, 60, 0]]);
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<(&'static str, f64)>>>);

    impl AudioSink for Shared {
        fn set_frequency(&mut self, hz: f64) { self.0.lock().unwrap().push(("f", hz)); }
        fn set_volume(&mut self, level: f64) { self.0.lock().unwrap().push(("v", level)); }
    }

    #[test]
    fn worker_preserves_order_and_mutes_on_drop() {
        let log = Shared::default();
        let mut worker = SinkWorker::spawn(log.clone());
        worker.set_frequency(300.0);
        worker.set_volume(0.4);
        worker.set_frequency(310.0);
        drop(worker);

        let calls = log.0.lock().unwrap().clone();
        assert_eq!(calls, vec![("f", 300.0), ("v", 0.4), ("f", 310.0), ("f", 0.0), ("v", 0.0)]);
    }
}
