//! Tests for fingertip touch detection

mod test_helpers;

use hand_pointer::{
    landmarks::{HandFrame, Landmark},
    touch::{Finger, TouchConfig, TouchDetector, TouchState},
};
use test_helpers::{resting_hand, touch_hand};

fn frame(index_z: f64, middle_z: f64) -> HandFrame {
    touch_hand(0.5, 0.5, index_z, middle_z)
}

/// Depth far from the surface; never a candidate
const LIFTED: f64 = 0.3;

/// Feed one warm-up frame and then `candidates` qualifying index frames
fn prime_index(detector: &mut TouchDetector, candidates: usize) -> Vec<Option<Finger>> {
    let mut events = vec![detector.update(Some(&frame(0.01, LIFTED))).map(|e| e.finger)];
    for i in 0..candidates {
        let z = if i % 2 == 0 { 0.03 } else { 0.01 };
        events.push(detector.update(Some(&frame(z, LIFTED))).map(|e| e.finger));
    }
    events
}

#[test]
fn test_first_frame_is_never_a_candidate() {
    let mut detector = TouchDetector::default();
    assert!(detector.update(Some(&frame(0.01, 0.01))).is_none());
    assert_eq!(detector.track(Finger::Index).consecutive_frames, 0);
    assert_eq!(detector.track(Finger::Index).last_depth, Some(0.01));
}

#[test]
fn test_touch_fires_on_third_candidate_frame() {
    let mut detector = TouchDetector::default();
    let events = prime_index(&mut detector, 3);
    assert_eq!(events, vec![None, None, None, Some(Finger::Index)]);
    assert_eq!(
        detector.state(),
        TouchState {
            is_touching: true,
            touch_type: Some(Finger::Index),
        }
    );
    // Counter restarts after a confirmed touch
    assert_eq!(detector.track(Finger::Index).consecutive_frames, 0);
}

#[test]
fn test_interrupted_run_does_not_fire() {
    let mut detector = TouchDetector::default();
    let events = prime_index(&mut detector, 2);
    assert!(events.iter().all(Option::is_none));
    assert_eq!(detector.track(Finger::Index).consecutive_frames, 2);

    // Too deep breaks the run
    assert!(detector.update(Some(&frame(0.2, LIFTED))).is_none());
    assert_eq!(detector.track(Finger::Index).consecutive_frames, 0);
    assert_eq!(detector.state(), TouchState::default());
}

#[test]
fn test_still_finger_is_not_a_touch() {
    let mut detector = TouchDetector::default();
    // Close to the surface but not moving
    for _ in 0..10 {
        assert!(detector.update(Some(&frame(0.01, LIFTED))).is_none());
    }
    assert_eq!(detector.track(Finger::Index).velocity, 0.0);
}

#[test]
fn test_negative_depth_uses_magnitude() {
    let mut detector = TouchDetector::default();
    detector.update(Some(&frame(-0.01, LIFTED)));
    detector.update(Some(&frame(-0.03, LIFTED)));
    detector.update(Some(&frame(-0.01, LIFTED)));
    let event = detector.update(Some(&frame(-0.03, LIFTED)));
    assert_eq!(event.map(|e| e.finger), Some(Finger::Index));
}

#[test]
fn test_index_has_priority_over_middle() {
    let mut detector = TouchDetector::default();
    let mut last = None;
    for i in 0..4 {
        let z = if i % 2 == 0 { 0.01 } else { 0.03 };
        last = detector.update(Some(&frame(z, z)));
    }
    assert_eq!(last.map(|e| e.finger), Some(Finger::Index));
    // The middle run is dropped when the index fires
    assert_eq!(detector.track(Finger::Middle).consecutive_frames, 0);
    assert_eq!(detector.state().touch_type, Some(Finger::Index));
}

#[test]
fn test_middle_touch() {
    let mut detector = TouchDetector::default();
    let mut events = Vec::new();
    for i in 0..4 {
        let z = if i % 2 == 0 { 0.01 } else { 0.03 };
        events.push(detector.update(Some(&frame(LIFTED, z))).map(|e| e.finger));
    }
    assert_eq!(events, vec![None, None, None, Some(Finger::Middle)]);
    assert_eq!(detector.state().touch_type, Some(Finger::Middle));
}

#[test]
fn test_latch_clears_only_when_both_fingers_lift() {
    let mut detector = TouchDetector::default();
    prime_index(&mut detector, 3);
    assert!(detector.state().is_touching);

    // Middle keeps qualifying while the index lifts: still latched
    detector.update(Some(&frame(LIFTED, 0.01)));
    detector.update(Some(&frame(LIFTED, 0.03)));
    assert_eq!(detector.state().touch_type, Some(Finger::Index));

    // Both out of range
    detector.update(Some(&frame(LIFTED, LIFTED)));
    assert_eq!(detector.state(), TouchState::default());
}

#[test]
fn test_missing_hand_resets() {
    let mut detector = TouchDetector::default();
    prime_index(&mut detector, 3);
    assert!(detector.update(None).is_none());
    assert_eq!(detector.state(), TouchState::default());
    assert_eq!(detector.track(Finger::Index).last_depth, None);
}

#[test]
fn test_short_or_depthless_frames_reset() {
    let mut detector = TouchDetector::default();
    prime_index(&mut detector, 2);

    let short = HandFrame::new(resting_hand().landmarks[..12].to_vec());
    assert!(detector.update(Some(&short)).is_none());
    assert_eq!(detector.track(Finger::Index).consecutive_frames, 0);

    prime_index(&mut detector, 2);
    let mut flat = frame(0.01, 0.01);
    flat.landmarks[8] = Landmark {
        x: 0.5,
        y: 0.5,
        z: None,
    };
    assert!(detector.update(Some(&flat)).is_none());
    assert_eq!(detector.track(Finger::Index).consecutive_frames, 0);
}

#[test]
fn test_thirteen_landmarks_are_enough() {
    let mut detector = TouchDetector::default();
    let mut last = None;
    for i in 0..4 {
        let z = if i % 2 == 0 { 0.01 } else { 0.03 };
        let full = frame(z, LIFTED);
        last = detector.update(Some(&HandFrame::new(full.landmarks[..13].to_vec())));
    }
    assert_eq!(last.map(|e| e.finger), Some(Finger::Index));
}

#[test]
fn test_custom_confirmation_frames() {
    let mut detector = TouchDetector::new(TouchConfig {
        confirmation_frames: 1,
        ..TouchConfig::default()
    });
    assert!(detector.update(Some(&frame(0.01, LIFTED))).is_none());
    assert_eq!(
        detector.update(Some(&frame(0.03, LIFTED))).map(|e| e.finger),
        Some(Finger::Index)
    );
}

#[test]
#[should_panic(expected = "Confirmation frames must be greater than 0")]
fn test_zero_confirmation_frames_panics() {
    let _ = TouchDetector::new(TouchConfig {
        confirmation_frames: 0,
        ..TouchConfig::default()
    });
}
