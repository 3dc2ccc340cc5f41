//! theremin — command-line entry point.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, warn};

use theremin_engine::config::MapperKind;
use theremin_engine::{AudioSink, LandmarkSource};
use theremin_live::app::{build_controller, load_config, run_session};
use theremin_live::sink::{LogSink, MidiSink, NullSink, SinkWorker};
use theremin_live::source::{JsonLinesSource, SimulatedSource};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Scripted two-handed performance
    Sim,
    /// JSON frames, one per line
    Jsonl,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    Null,
    Log,
    Midi,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Gesture-controlled theremin", long_about = None)]
struct Args {
    /// Engine configuration (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured frequency mapper (crisp, fuzzy, depth)
    #[arg(short, long)]
    mapper: Option<MapperKind>,

    /// Where frames come from
    #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
    source: SourceKind,

    /// Input file for the jsonl source; `-` reads stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Where frequency and volume go
    #[arg(long, value_enum, default_value_t = SinkKind::Log)]
    sink: SinkKind,

    /// MIDI port name (substring match)
    #[arg(long)]
    port: Option<String>,

    /// MIDI channel 0–15
    #[arg(long, default_value_t = 0)]
    channel: u8,

    /// General MIDI program for the lead voice (default 81, Lead 2 sawtooth)
    #[arg(long, default_value_t = 81)]
    program: u8,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<usize>,

    /// Simulator frame rate
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Simulator frame size
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(m) = args.mapper {
        cfg.mapper = m;
    }

    let sink: Box<dyn AudioSink + Send> = match args.sink {
        SinkKind::Null => Box::new(NullSink),
        SinkKind::Log  => Box::new(LogSink::default()),
        SinkKind::Midi => match MidiSink::open(args.port.as_deref(), args.channel, args.program) {
            Ok(s)  => Box::new(s),
            Err(e) => {
                warn!("{:#}; falling back to the null sink", e);
                Box::new(NullSink)
            }
        },
    };
    let mut controller = build_controller(&cfg, SinkWorker::spawn(sink))?;

    let running = Arc::new(AtomicBool::new(true));
    let reads_stdin = args.source == SourceKind::Jsonl && args.input == "-";
    if !reads_stdin {
        spawn_quit_listener(Arc::clone(&running));
        info!("press q + Enter to stop");
    }

    let mut source: Box<dyn LandmarkSource> = match args.source {
        SourceKind::Sim => {
            let period = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
            let mut sim = SimulatedSource::new(args.width, args.height).pace(period);
            if let Some(n) = args.frames {
                sim = sim.limit(n);
            }
            Box::new(sim)
        }
        SourceKind::Jsonl if reads_stdin => Box::new(JsonLinesSource::new(BufReader::new(io::stdin()))),
        SourceKind::Jsonl => {
            let file = File::open(&args.input)
                .with_context(|| format!("opening {}", args.input))?;
            Box::new(JsonLinesSource::new(BufReader::new(file)))
        }
    };
    if let (Some(n), SourceKind::Jsonl) = (args.frames, args.source) {
        source = Box::new(Limited { inner: source, left: n });
    }

    let stats = run_session(source.as_mut(), &mut controller, &running)?;
    info!("done: {:?}", stats);
    Ok(())
}

/// Clear `running` when the user types `q`.
fn spawn_quit_listener(running: Arc<AtomicBool>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(l) if l.trim().eq_ignore_ascii_case("q") => {
                    running.store(false, Ordering::SeqCst);
                    return;
                }
                Ok(_)  => continue,
                Err(_) => return,
            }
        }
    });
}

/// Caps any source at a fixed number of frames.
struct Limited {
    inner: Box<dyn LandmarkSource>,
    left:  usize,
}

impl LandmarkSource for Limited {
    fn next_frame(&mut self) -> Result<Option<theremin_engine::Frame>, theremin_engine::error::SourceError> {
        if self.left == 0 {
            return Ok(None);
        }
        self.left -= 1;
        self.inner.next_frame()
    }
}
