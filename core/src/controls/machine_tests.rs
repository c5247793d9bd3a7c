//! Tests for ControlBarMachine transitions
//!
//! Verifies that:
//! - show/hide produce the right visibility and timer plans
//! - superseded timers never take effect
//! - leaving the player hides immediately

use unveil_types::ControlTiming;

use super::{ControlBarMachine, ControlEvent, MediaEvent, Step, Visibility};
use crate::timers::{ArmTimer, TimerPurpose, TimerToken};

fn machine() -> ControlBarMachine {
    ControlBarMachine::new(ControlTiming::default())
}

fn armed(step: &Step) -> ArmTimer {
    step.timers.arm.expect("expected an armed timer")
}

#[test]
fn starts_hidden_without_timer() {
    let m = machine();
    assert_eq!(m.state(), Visibility::Hidden);
    assert!(m.pending().is_none());
}

#[test]
fn transient_show_arms_dwell() {
    let mut m = machine();
    let step = m.show(false);

    assert_eq!(step.visible, Some(true));
    assert_eq!(m.state(), Visibility::VisibleTransient);
    assert_eq!(armed(&step).delay_ms, 2400);
    assert_eq!(m.pending().unwrap().purpose, TimerPurpose::AutoHide);
}

#[test]
fn persistent_show_cancels_and_arms_nothing() {
    let mut m = machine();
    let first = armed(&m.show(false));
    let step = m.show(true);

    assert_eq!(m.state(), Visibility::VisiblePersistent);
    assert_eq!(step.timers.cancel, Some(first.token));
    assert!(step.timers.arm.is_none());
    assert!(m.pending().is_none());
}

#[test]
fn superseded_token_is_ignored() {
    let mut m = machine();
    let transient = armed(&m.show(false));
    m.show(true);

    // Host failed to cancel: the late callback must be inert
    let step = m.on_timer(transient.token);
    assert_eq!(step, Step::default());
    assert_eq!(m.state(), Visibility::VisiblePersistent);
}

#[test]
fn current_token_hides() {
    let mut m = machine();
    let timer = armed(&m.show(false));
    let step = m.on_timer(timer.token);

    assert_eq!(step.visible, Some(false));
    assert_eq!(m.state(), Visibility::Hidden);
    assert!(m.pending().is_none());

    // Firing twice does nothing more
    assert_eq!(m.on_timer(timer.token), Step::default());
}

#[test]
fn delayed_hide_keeps_visibility_until_fired() {
    let mut m = machine();
    m.show(true);
    let step = m.hide(180);

    assert_eq!(step.visible, None);
    assert_eq!(armed(&step).delay_ms, 180);
    assert_eq!(m.state(), Visibility::VisiblePersistent);
    assert_eq!(m.pending().unwrap().purpose, TimerPurpose::DelayedHide);
}

#[test]
fn immediate_hide_overrides_pending_delay() {
    let mut m = machine();
    m.show(true);
    let graceful = armed(&m.hide(180));

    let step = m.handle(ControlEvent::LeavePlayer);
    assert_eq!(step.visible, Some(false));
    assert_eq!(step.timers.cancel, Some(graceful.token));
    assert!(step.timers.arm.is_none());
    assert_eq!(m.state(), Visibility::Hidden);
}

#[test]
fn event_mapping_uses_timing() {
    let timing = ControlTiming {
        transient_hide_ms: 1000,
        leave_hide_ms: 50,
        touch_release_ms: 700,
    };
    let mut m = ControlBarMachine::new(timing);

    for event in [ControlEvent::PointerEnter, ControlEvent::FocusIn, ControlEvent::TouchStart] {
        let step = m.handle(event);
        assert_eq!(step.visible, Some(true));
        assert_eq!(m.state(), Visibility::VisiblePersistent, "{event:?}");
    }
    assert_eq!(armed(&m.handle(ControlEvent::PointerLeave)).delay_ms, 50);
    assert_eq!(armed(&m.handle(ControlEvent::FocusOut)).delay_ms, 50);
    assert_eq!(armed(&m.handle(ControlEvent::TouchEnd)).delay_ms, 700);
    assert_eq!(armed(&m.handle(ControlEvent::TouchCancel)).delay_ms, 700);

    for media in MediaEvent::ALL {
        let step = m.handle(ControlEvent::Media(media));
        assert_eq!(armed(&step).delay_ms, 1000);
        assert_eq!(m.state(), Visibility::VisibleTransient);
    }
}

#[test]
fn tokens_are_never_reused() {
    let mut m = machine();
    let mut seen: Vec<TimerToken> = Vec::new();
    for _ in 0..5 {
        seen.push(armed(&m.show(false)).token);
        seen.push(armed(&m.hide(180)).token);
    }
    let mut deduped = seen.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), seen.len());
}

#[test]
fn every_transition_cancels_the_previous_timer() {
    let mut m = machine();
    let mut previous = armed(&m.show(false)).token;
    for event in [
        ControlEvent::TouchEnd,
        ControlEvent::Media(MediaEvent::Play),
        ControlEvent::PointerLeave,
    ] {
        let step = m.handle(event);
        assert_eq!(step.timers.cancel, Some(previous));
        previous = armed(&step).token;
    }
}
