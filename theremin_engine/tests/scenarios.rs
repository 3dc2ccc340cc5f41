//! End-to-end frames through the public API.

use theremin_engine::config::{EngineConfig, MapperKind};
use theremin_engine::controller::{AudioSink, Frame, FrameController, FrequencyMapper};
use theremin_engine::fuzzy::{CrispInputs, FuzzyEngine};
use theremin_engine::hand::{HandObservation, Handedness, Landmark, FINGERTIPS, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Recorder {
    pushes: Vec<(&'static str, f64)>,
}

impl AudioSink for Recorder {
    fn set_frequency(&mut self, hz: f64) { self.pushes.push(("frequency", hz)); }
    fn set_volume(&mut self, level: f64) { self.pushes.push(("volume", level)); }
}

fn controller(mapper: MapperKind) -> FrameController<Recorder> {
    let cfg = EngineConfig { mapper, ..EngineConfig::default() };
    let m = FrequencyMapper::from_config(&cfg, None).unwrap();
    FrameController::new(&cfg, m, Recorder::default()).unwrap()
}

/// A hand whose box is exactly (100, 100, 200, 200) with fingertip gaps of
/// 50 px along the top edge.
fn boxed_hand(handedness: Handedness) -> HandObservation {
    let mut lms = vec![Landmark::new(150.0, 200.0, 0.0); LANDMARK_COUNT];
    lms[0] = Landmark::new(100.0, 300.0, 0.0);
    lms[1] = Landmark::new(300.0, 300.0, 0.0);
    for (k, &tip) in FINGERTIPS.iter().enumerate() {
        lms[tip] = Landmark::new(100.0 + 50.0 * k as f64, 100.0, 0.0);
    }
    HandObservation::from_landmarks(lms, handedness)
}

/// A volume hand whose center sits at `y`.
fn hand_at(y: f64, handedness: Handedness) -> HandObservation {
    HandObservation::from_landmarks(vec![Landmark::new(400.0, y, 0.0); LANDMARK_COUNT], handedness)
}

// ════════════════════════════════════════════════════════════════════════════
// Scenarios
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn crisp_frequency_for_a_known_hand() {
    let hand = boxed_hand(Handedness::Right);
    assert_eq!((hand.bbox.x, hand.bbox.y, hand.bbox.width, hand.bbox.height), (100.0, 100.0, 200.0, 200.0));

    let mut c = controller(MapperKind::Crisp);
    let r = c.process(&Frame { width: 800, height: 600, hands: vec![hand] });

    let (min_f, max_f) = (200.0, 600.0);
    let expected = min_f
        + (40_000.0_f64 / 120_000.0).min(1.0) * max_f * 0.75
        + (50.0_f64 / 150.0).min(1.0) * max_f * 0.25;
    assert!((r.frequency - expected).abs() < 1e-9, "{} vs {}", r.frequency, expected);
    assert!((r.features.unwrap().openness - 50.0).abs() < 1e-9);
}

#[test]
fn no_hands_pushes_zero_frequency_and_volume() {
    let mut c = controller(MapperKind::Fuzzy);
    c.process(&Frame { width: 800, height: 600, hands: vec![boxed_hand(Handedness::Right)] });
    c.process(&Frame::empty(800, 600));
    let pushes = &c.sink().pushes;
    assert_eq!(&pushes[pushes.len() - 2..], &[("frequency", 0.0), ("volume", 0.0)]);
}

#[test]
fn volume_hand_height_sets_volume() {
    let mut c = controller(MapperKind::Crisp);
    let top = c.process(&Frame { width: 800, height: 600, hands: vec![hand_at(0.0, Handedness::Left)] });
    assert_eq!(top.volume, 1.0);
    let bottom = c.process(&Frame { width: 800, height: 600, hands: vec![hand_at(600.0, Handedness::Left)] });
    assert_eq!(bottom.volume, 0.0);
}

#[test]
fn two_hands_drive_both_parameters() {
    let mut c = controller(MapperKind::Fuzzy);
    let r = c.process(&Frame {
        width: 800,
        height: 600,
        hands: vec![hand_at(450.0, Handedness::Left), boxed_hand(Handedness::Right)],
    });
    assert!((200.0..=600.0).contains(&r.frequency));
    assert_eq!(r.volume, 0.25);
    assert!(!r.no_coverage);
}

#[test]
fn fuzzy_controller_matches_direct_inference() {
    let cfg = EngineConfig::default();
    let engine = FuzzyEngine::new(&cfg.fuzzy, cfg.frequency_range()).unwrap();
    // 100 · 40000 / 480000 ≈ 8, center x = 200, openness 50
    let direct = engine.infer(CrispInputs { proximity: 8.0, distance: 200.0, openness: 50.0 }).unwrap();

    let mut c = controller(MapperKind::Fuzzy);
    let r = c.process(&Frame { width: 800, height: 600, hands: vec![boxed_hand(Handedness::Right)] });
    assert_eq!(r.frequency, direct.frequency);
}

#[test]
fn depth_mapper_needs_a_focal_length() {
    let cfg = EngineConfig { mapper: MapperKind::Depth, ..EngineConfig::default() };
    assert!(FrequencyMapper::from_config(&cfg, None).is_err());
}
