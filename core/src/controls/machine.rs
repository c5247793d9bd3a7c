//! Control-bar visibility state machine
//!
//! Pure state: no DOM, no clock. Every transition returns a [`Step`] telling
//! the binding whether the visible class should be present and which timer to
//! cancel or arm.
//!
//! ```text
//!   show(true) ──────────────► VisiblePersistent
//!   show(false) ─────────────► VisibleTransient ──(dwell)──► Hidden
//!   hide(0) ─────────────────► Hidden
//!   hide(n) ──(n ms)─────────► Hidden
//! ```

use unveil_types::ControlTiming;

use crate::timers::{ArmTimer, PendingTimer, TimerPlan, TimerPurpose, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    /// Hides on its own once the dwell expires
    VisibleTransient,
    /// Stays until a hide-triggering event
    VisiblePersistent,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

/// Media element events that re-arm the transient display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Pause,
    Play,
    Seeked,
    Ended,
}

impl MediaEvent {
    pub const ALL: [MediaEvent; 4] = [
        MediaEvent::Pause,
        MediaEvent::Play,
        MediaEvent::Seeked,
        MediaEvent::Ended,
    ];

    pub fn dom_name(self) -> &'static str {
        match self {
            MediaEvent::Pause => "pause",
            MediaEvent::Play => "play",
            MediaEvent::Seeked => "seeked",
            MediaEvent::Ended => "ended",
        }
    }
}

/// Input events, already resolved to the element they happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Pointer entered the control bar or hotspot
    PointerEnter,
    /// Pointer left the control bar or hotspot
    PointerLeave,
    FocusIn,
    FocusOut,
    TouchStart,
    TouchEnd,
    TouchCancel,
    Media(MediaEvent),
    /// Pointer left the whole player root
    LeavePlayer,
}

/// Outcome of one transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    /// Desired presence of the visible class, if it changes now
    pub visible: Option<bool>,
    pub timers: TimerPlan,
}

#[derive(Debug, Clone)]
pub struct ControlBarMachine {
    state: Visibility,
    pending: Option<PendingTimer>,
    next_token: u64,
    timing: ControlTiming,
}

impl ControlBarMachine {
    /// New machine in `Hidden`; bindings immediately call `show(false)`
    pub fn new(timing: ControlTiming) -> Self {
        Self {
            state: Visibility::Hidden,
            pending: None,
            next_token: 0,
            timing,
        }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn pending(&self) -> Option<PendingTimer> {
        self.pending
    }

    fn arm(&mut self, purpose: TimerPurpose, delay_ms: u32) -> ArmTimer {
        self.next_token += 1;
        let token = TimerToken::new(self.next_token);
        self.pending = Some(PendingTimer {
            token,
            purpose,
            delay_ms,
        });
        ArmTimer { token, delay_ms }
    }

    pub fn show(&mut self, persist: bool) -> Step {
        let cancel = self.pending.take().map(|p| p.token);
        let arm = if persist {
            self.state = Visibility::VisiblePersistent;
            None
        } else {
            self.state = Visibility::VisibleTransient;
            Some(self.arm(TimerPurpose::AutoHide, self.timing.transient_hide_ms))
        };
        Step {
            visible: Some(true),
            timers: TimerPlan { cancel, arm },
        }
    }

    pub fn hide(&mut self, delay_ms: u32) -> Step {
        let cancel = self.pending.take().map(|p| p.token);
        if delay_ms == 0 {
            self.state = Visibility::Hidden;
            return Step {
                visible: Some(false),
                timers: TimerPlan { cancel, arm: None },
            };
        }
        // Visibility is unchanged until the timer fires
        let arm = self.arm(TimerPurpose::DelayedHide, delay_ms);
        Step {
            visible: None,
            timers: TimerPlan {
                cancel,
                arm: Some(arm),
            },
        }
    }

    pub fn handle(&mut self, event: ControlEvent) -> Step {
        match event {
            ControlEvent::PointerEnter | ControlEvent::FocusIn | ControlEvent::TouchStart => {
                self.show(true)
            }
            ControlEvent::PointerLeave | ControlEvent::FocusOut => {
                self.hide(self.timing.leave_hide_ms)
            }
            ControlEvent::TouchEnd | ControlEvent::TouchCancel => {
                self.hide(self.timing.touch_release_ms)
            }
            ControlEvent::Media(_) => self.show(false),
            ControlEvent::LeavePlayer => self.hide(0),
        }
    }

    /// Host timer callback. Tokens other than the current one are stale.
    pub fn on_timer(&mut self, token: TimerToken) -> Step {
        match self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                self.state = Visibility::Hidden;
                Step {
                    visible: Some(false),
                    timers: TimerPlan::default(),
                }
            }
            _ => Step::default(),
        }
    }
}
