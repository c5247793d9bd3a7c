//! Pending timer state
//!
//! A `PendingTimer` is the single outstanding delayed transition of a control
//! bar. The host receives only a [`TimerPlan`]: what to cancel and what to arm.
//!
//! # Lifecycle
//!
//! 1. show/hide arms a timer → token handed to the host in `TimerPlan::arm`
//! 2. another show/hide supersedes it → token returned in `TimerPlan::cancel`
//! 3. host callback fires → machine compares tokens, stale ones are ignored

/// Identity of one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Why a timer was armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Dwell expiry after a transient show
    AutoHide,
    /// Graceful hide after pointer-leave, focus-out or touch release
    DelayedHide,
}

/// The one outstanding timer of a control bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub token: TimerToken,
    pub purpose: TimerPurpose,
    pub delay_ms: u32,
}

/// A timer the host must start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmTimer {
    pub token: TimerToken,
    pub delay_ms: u32,
}

/// Timer instructions for the host, applied in order: cancel, then arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerPlan {
    pub cancel: Option<TimerToken>,
    pub arm: Option<ArmTimer>,
}

impl TimerPlan {
    pub fn is_empty(&self) -> bool {
        self.cancel.is_none() && self.arm.is_none()
    }
}
