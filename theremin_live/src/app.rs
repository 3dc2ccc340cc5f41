//! Session wiring: load configuration, build the controller, and run the
//! frame loop until the source ends or someone asks it to stop.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::{info, warn};

use theremin_engine::config::MapperKind;
use theremin_engine::depth::CameraCalibration;
use theremin_engine::{AudioSink, EngineConfig, FrameController, FrequencyMapper, LandmarkSource};

// ════════════════════════════════════════════════════════════════════════════
// Configuration
// ════════════════════════════════════════════════════════════════════════════

/// Read a TOML engine configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let cfg = match path {
        None => EngineConfig::default(),
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            EngineConfig::from_toml_str(&text)
                .with_context(|| format!("parsing config {}", p.display()))?
        }
    };
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

/// The camera calibration named by the depth section, if any.  Only loaded
/// when the depth mapper is selected.
pub fn load_calibration(cfg: &EngineConfig) -> Result<Option<CameraCalibration>> {
    if cfg.mapper != MapperKind::Depth {
        return Ok(None);
    }
    match &cfg.depth.calibration_path {
        None => {
            warn!("no camera calibration configured; depth needs focal_length_px");
            Ok(None)
        }
        Some(p) => {
            let cal = CameraCalibration::load(p)
                .with_context(|| format!("loading camera calibration {}", p.display()))?;
            info!("camera calibration {}: f = {:.1} px", p.display(), cal.focal_length());
            Ok(Some(cal))
        }
    }
}

/// Mapper plus controller for `cfg`, pushing into `sink`.
pub fn build_controller<S: AudioSink>(cfg: &EngineConfig, sink: S) -> Result<FrameController<S>> {
    let calibration = load_calibration(cfg)?;
    let mapper = FrequencyMapper::from_config(cfg, calibration.as_ref())
        .with_context(|| format!("building the {:?} mapper", cfg.mapper))?;
    let controller = FrameController::new(cfg, mapper, sink)?;
    info!(
        "mapper {:?}, frequency {:.0}–{:.0} Hz, frequency hand {:?}",
        controller.mapper().kind(), cfg.frequency_range().min, cfg.frequency_range().max, cfg.hands.frequency_hand,
    );
    Ok(controller)
}

// ════════════════════════════════════════════════════════════════════════════
// Frame loop
// ════════════════════════════════════════════════════════════════════════════

/// Counters for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub frames:            usize,
    pub frames_with_hands: usize,
    pub no_coverage:       usize,
}

/// Pull frames until the source ends, `running` is cleared, or the source
/// fails.  The sink is muted on every way out.
pub fn run_session<Src, S>(
    source:     &mut Src,
    controller: &mut FrameController<S>,
    running:    &AtomicBool,
) -> Result<SessionStats>
where
    Src: LandmarkSource + ?Sized,
    S:   AudioSink,
{
    let mut stats = SessionStats::default();

    let outcome = loop {
        if !running.load(Ordering::SeqCst) {
            info!("stop requested");
            break Ok(());
        }
        let frame = match source.next_frame() {
            Ok(Some(f)) => f,
            Ok(None)    => {
                info!("source ended");
                break Ok(());
            }
            Err(e) => break Err(e),
        };

        let report = controller.process(&frame);
        stats.frames += 1;
        if report.hands_seen > 0 {
            stats.frames_with_hands += 1;
        }
        if report.no_coverage {
            stats.no_coverage += 1;
        }
    };

    controller.mute();
    if stats.no_coverage > 0 {
        warn!("{} frame(s) fell outside the rule base", stats.no_coverage);
    }
    info!("{} frame(s), {} with hands", stats.frames, stats.frames_with_hands);

    outcome.with_context(|| format!("landmark source failed after {} frame(s)", stats.frames))?;
    Ok(stats)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
