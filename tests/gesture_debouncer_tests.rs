//! Tests for pinch-release click debouncing

use hand_pointer::{
    geometry::ScreenPoint,
    gesture::{ClickKind, GestureDebouncer, GestureKind, PendingClick},
};
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_millis(300);
const FEEDBACK: Duration = Duration::from_millis(500);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Pinch then release at `position`, starting at `t`; returns any click the
/// two updates produced
fn tap(debouncer: &mut GestureDebouncer, t: Instant, position: ScreenPoint) -> Vec<ClickKind> {
    let mut fired = Vec::new();
    fired.extend(debouncer.update(true, position, t).map(|e| e.kind));
    fired.extend(debouncer.update(false, position, t + ms(20)).map(|e| e.kind));
    fired
}

#[test]
fn test_single_release_is_left_click_after_timeout() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let at = ScreenPoint::new(100.0, 200.0);

    assert!(tap(&mut debouncer, start, at).is_empty());
    let released = start + ms(20);
    assert_eq!(debouncer.pending_releases(), 1);
    assert_eq!(debouncer.pending_deadline(), Some(released + TIMEOUT));

    // Not yet
    assert!(debouncer.update(false, at, released + ms(299)).is_none());

    let click = debouncer.update(false, ScreenPoint::new(0.0, 0.0), released + TIMEOUT).unwrap();
    assert_eq!(click.kind, ClickKind::Left);
    assert_eq!(click.position, at);
    assert_eq!(debouncer.pending_releases(), 0);
}

#[test]
fn test_double_release_is_right_click_at_latest_position() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let first = ScreenPoint::new(100.0, 100.0);
    let second = ScreenPoint::new(140.0, 90.0);

    assert!(tap(&mut debouncer, start, first).is_empty());
    assert!(tap(&mut debouncer, start + ms(150), second).is_empty());
    assert_eq!(debouncer.pending_releases(), 2);

    let second_release = start + ms(170);
    assert!(debouncer.poll(second_release + ms(299)).is_none());
    let click = debouncer.poll(second_release + TIMEOUT).unwrap();
    assert_eq!(click.kind, ClickKind::Right);
    assert_eq!(click.position, second);
}

#[test]
fn test_each_release_restarts_the_window() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let at = ScreenPoint::new(10.0, 10.0);

    // Three releases 250 ms apart never let the window close
    for i in 0..3 {
        assert!(tap(&mut debouncer, start + ms(250 * i), at).is_empty());
    }
    assert_eq!(debouncer.pending_releases(), 3);

    let last_release = start + ms(520);
    assert!(debouncer.poll(last_release + ms(290)).is_none());
    assert_eq!(debouncer.poll(last_release + TIMEOUT).unwrap().kind, ClickKind::Right);
}

#[test]
fn test_separate_windows_give_separate_clicks() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let at = ScreenPoint::new(50.0, 50.0);

    tap(&mut debouncer, start, at);
    let first = debouncer.poll(start + ms(400)).unwrap();
    tap(&mut debouncer, start + ms(500), at);
    let second = debouncer.poll(start + ms(900)).unwrap();

    assert_eq!(first.kind, ClickKind::Left);
    assert_eq!(second.kind, ClickKind::Left);
}

#[test]
fn test_no_release_no_click() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let at = ScreenPoint::new(0.0, 0.0);

    // A held pinch never clicks
    for i in 0..100 {
        assert!(debouncer.update(true, at, start + ms(10 * i)).is_none());
    }
    assert_eq!(debouncer.pending_releases(), 0);
}

#[test]
fn test_gesture_feedback_lifecycle() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let at = ScreenPoint::new(0.0, 0.0);

    assert_eq!(debouncer.current_gesture(start, false), GestureKind::None);
    assert_eq!(debouncer.current_gesture(start, true), GestureKind::Move);

    debouncer.update(true, at, start);
    assert_eq!(debouncer.current_gesture(start, true), GestureKind::PinchStart);

    debouncer.update(false, at, start + ms(10));
    let fired_at = start + ms(310);
    assert!(debouncer.poll(fired_at).is_some());
    assert_eq!(debouncer.current_gesture(fired_at, true), GestureKind::ClickLeft);
    assert_eq!(debouncer.current_gesture(fired_at + ms(499), true), GestureKind::ClickLeft);

    // Feedback expires after its display duration
    debouncer.poll(fired_at + FEEDBACK);
    assert_eq!(debouncer.current_gesture(fired_at + FEEDBACK, true), GestureKind::Move);
}

#[test]
fn test_external_feedback() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    debouncer.show_feedback(ClickKind::Right, start);
    assert_eq!(debouncer.last_gesture(start + ms(100)), GestureKind::ClickRight);
    assert_eq!(debouncer.last_gesture(start + FEEDBACK), GestureKind::None);
}

#[test]
fn test_reset_drops_pending_window() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    tap(&mut debouncer, start, ScreenPoint::new(1.0, 1.0));
    debouncer.reset();
    assert!(debouncer.poll(start + ms(1000)).is_none());
    assert_eq!(debouncer.pending_deadline(), None);
}

#[test]
fn test_pending_click_resolution() {
    let at = ScreenPoint::new(3.0, 4.0);
    assert!(PendingClick { releases: 0, position: at }.resolve().is_none());

    let one = PendingClick::register(None, at);
    assert_eq!(one.resolve().unwrap().kind, ClickKind::Left);

    let moved = ScreenPoint::new(7.0, 8.0);
    let two = PendingClick::register(Some(one), moved);
    let event = two.resolve().unwrap();
    assert_eq!(event.kind, ClickKind::Right);
    assert_eq!(event.position, moved);
}

#[test]
fn test_forget_pinch_drops_edge_but_keeps_window() {
    let start = Instant::now();
    let mut debouncer = GestureDebouncer::new(TIMEOUT, FEEDBACK);
    let at = ScreenPoint::new(10.0, 10.0);

    // Held pinch forgotten: opening the hand is not a release
    assert!(debouncer.update(true, at, start).is_none());
    debouncer.forget_pinch();
    assert!(debouncer.update(false, at, start + ms(16)).is_none());
    assert!(!debouncer.has_pending_click());

    // An open window survives and still resolves
    assert!(tap(&mut debouncer, start + ms(100), at).is_empty());
    assert!(debouncer.has_pending_click());
    debouncer.forget_pinch();
    let click = debouncer.poll(start + ms(120) + TIMEOUT).unwrap();
    assert_eq!(click.kind, ClickKind::Left);
    assert!(!debouncer.has_pending_click());
}
