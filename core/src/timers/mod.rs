//! Hide timers
//!
//! This module provides:
//! - **Tokens**: identity of one armed timer, never reused
//! - **Plans**: the cancel/arm instructions a control bar hands to its host
//! - **Virtual queue**: a simulated clock that plays the host's role in tests
//!   and headless runs
//!
//! # Supersession
//!
//! A control bar owns at most one pending timer. Every show or hide cancels the
//! previous token before arming a new one, and the state machine ignores any
//! token that is not its current one, so a late callback can never take effect.

mod active;
mod queue;

pub use active::{ArmTimer, PendingTimer, TimerPlan, TimerPurpose, TimerToken};
pub use queue::VirtualTimers;
