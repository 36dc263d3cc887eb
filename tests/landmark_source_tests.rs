//! Tests for landmark sources: detector responses, replays and the
//! subprocess handshake

mod test_helpers;

use hand_pointer::{
    error::AppError,
    geometry::ScreenSize,
    gesture::ClickKind,
    landmark_source::{parse_detection, LandmarkSource, ReplaySource, SubprocessConfig, SubprocessLandmarkSource},
    landmarks::{Handedness, HandFrame},
    scheduler::{CancelHandle, SimulatedTicker, TickSource},
    session::{NoFrames, Session},
};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use test_helpers::pinch_hand;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("hand_pointer_{}_{name}", std::process::id()))
}

fn hand_json(score: f32, handedness: &str, count: usize) -> String {
    let landmarks: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"x":{:.2},"y":0.5,"z":-0.01}}"#, i as f64 / 100.0))
        .collect();
    format!(
        r#"{{"handedness":"{handedness}","score":{score},"landmarks":[{}]}}"#,
        landmarks.join(",")
    )
}

#[test]
fn test_parse_full_hand() {
    let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.95, "Left", 21));
    let hand = parse_detection(&line, 0.5).unwrap().unwrap();
    assert_eq!(hand.landmarks.len(), 21);
    assert_eq!(hand.handedness, Some(Handedness::Left));
    assert_eq!(hand.index_tip().unwrap().x, 0.08);
    assert_eq!(hand.index_tip().unwrap().z, Some(-0.01));
}

#[test]
fn test_parse_low_confidence_is_no_hand() {
    let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.3, "Right", 21));
    assert!(parse_detection(&line, 0.5).unwrap().is_none());
    assert!(parse_detection(&line, 0.3).unwrap().is_some());
}

#[test]
fn test_parse_empty_and_unknown_handedness() {
    assert!(parse_detection(r#"{"hands":[]}"#, 0.5).unwrap().is_none());
    assert!(parse_detection("{}", 0.5).unwrap().is_none());

    let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.9, "Unknown", 21));
    let hand = parse_detection(&line, 0.5).unwrap().unwrap();
    assert_eq!(hand.handedness, None);
}

#[test]
fn test_parse_partial_hand_is_kept() {
    let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.9, "Right", 5));
    let hand = parse_detection(&line, 0.5).unwrap().unwrap();
    assert_eq!(hand.landmarks.len(), 5);
    assert!(hand.index_tip().is_none());
}

#[test]
fn test_parse_invalid_json() {
    assert!(matches!(parse_detection("{\"hands\": [", 0.5), Err(AppError::Json(_))));
}

#[test]
fn test_replay_drives_session_clicks() {
    let frames: Vec<Option<HandFrame>> = vec![
        Some(pinch_hand(0.5, 0.5, 0.2)),
        Some(pinch_hand(0.5, 0.5, 0.01)),
        Some(pinch_hand(0.5, 0.5, 0.2)),
        None,
    ];
    let recording: String = frames
        .iter()
        .map(|frame| serde_json::to_string(frame).unwrap() + "\n")
        .collect();

    let path = temp_path("replay.jsonl");
    std::fs::write(&path, recording).unwrap();
    let mut source = ReplaySource::open(&path).unwrap();

    let mut session = Session::with_defaults(ScreenSize::new(1280.0, 720.0));
    let mut now = Instant::now();
    let mut clicks = Vec::new();
    let mut ticks = 0;
    while !source.is_exhausted() {
        let hand = source.detect(None).unwrap();
        clicks.extend(session.tick(now, hand.as_ref(), &mut NoFrames).clicks);
        now += Duration::from_millis(16);
        ticks += 1;
    }
    // Let the debounce window close
    clicks.extend(session.tick(now + Duration::from_secs(1), None, &mut NoFrames).clicks);
    std::fs::remove_file(&path).ok();

    assert_eq!(ticks, 5);
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].kind, ClickKind::Left);
}

#[test]
fn test_replay_ending_inside_click_window_still_clicks() {
    let recording: String = [
        Some(pinch_hand(0.5, 0.5, 0.2)),
        Some(pinch_hand(0.5, 0.5, 0.01)),
        Some(pinch_hand(0.5, 0.5, 0.2)),
    ]
    .iter()
    .map(|frame| serde_json::to_string(frame).unwrap() + "\n")
    .collect();
    let mut source = ReplaySource::from_reader(Cursor::new(recording));

    let mut session = Session::with_defaults(ScreenSize::new(1280.0, 720.0));
    let mut ticker = SimulatedTicker::new(Instant::now(), 60, Some(600), CancelHandle::new());
    let mut input_ended = false;
    let mut clicks_at_end_of_input = None;
    let mut clicks = Vec::new();
    let mut ticks = 0;
    while let Some(now) = ticker.next_tick() {
        let hand = if input_ended { None } else { source.detect(None).unwrap() };
        input_ended |= source.is_exhausted();
        if input_ended && clicks_at_end_of_input.is_none() {
            clicks_at_end_of_input = Some(clicks.len());
            assert!(session.has_pending_click());
        }
        if input_ended && !session.has_pending_click() {
            break;
        }
        clicks.extend(session.tick(now, hand.as_ref(), &mut NoFrames).clicks);
        ticks += 1;
    }

    assert_eq!(clicks_at_end_of_input, Some(0));
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].kind, ClickKind::Left);
    // Stops once the window closes, well before the tick limit
    assert!(ticks < 60);
}

#[test]
fn test_replay_reports_bad_line_number() {
    let data = "null\n{\"landmarks\": 3}\n";
    let mut replay = ReplaySource::from_reader(Cursor::new(data));
    assert!(replay.detect(None).unwrap().is_none());
    match replay.detect(None) {
        Err(AppError::LandmarkSource(msg)) => assert!(msg.contains("line 2"), "{msg}"),
        other => panic!("Expected LandmarkSource error, got {other:?}"),
    }
}

#[test]
fn test_replay_missing_file() {
    assert!(matches!(
        ReplaySource::open(temp_path("missing.jsonl")),
        Err(AppError::Io(_))
    ));
}

#[test]
fn test_subprocess_missing_script() {
    let config = SubprocessConfig {
        script: temp_path("no_such_script.py"),
        ..SubprocessConfig::default()
    };
    match SubprocessLandmarkSource::spawn(&config) {
        Err(AppError::LandmarkSource(msg)) => assert!(msg.contains("script not found")),
        Err(other) => panic!("Expected LandmarkSource error, got {other:?}"),
        Ok(_) => panic!("Expected spawn to fail"),
    }
}

#[cfg(unix)]
#[test]
fn test_subprocess_handshake() {
    let script = temp_path("ready.sh");
    std::fs::write(&script, "echo READY\ncat > /dev/null\n").unwrap();
    let config = SubprocessConfig {
        python: PathBuf::from("/bin/sh"),
        script: script.clone(),
        min_confidence: 0.5,
    };

    let mut source = SubprocessLandmarkSource::spawn(&config).unwrap();
    // No frame, nothing sent
    assert!(source.detect(None).unwrap().is_none());
    assert!(!source.is_exhausted());
    drop(source);
    std::fs::remove_file(&script).ok();
}

#[cfg(unix)]
#[test]
fn test_subprocess_without_ready_line_fails() {
    let script = temp_path("not_ready.sh");
    std::fs::write(&script, "echo LOADING\n").unwrap();
    let config = SubprocessConfig {
        python: PathBuf::from("/bin/sh"),
        script: script.clone(),
        min_confidence: 0.5,
    };

    let result = SubprocessLandmarkSource::spawn(&config);
    std::fs::remove_file(&script).ok();
    match result {
        Err(AppError::LandmarkSource(msg)) => assert!(msg.contains("LOADING")),
        Err(other) => panic!("Expected LandmarkSource error, got {other:?}"),
        Ok(_) => panic!("Expected spawn to fail"),
    }
}
