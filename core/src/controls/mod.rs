//! Control-bar behavior
//!
//! This module provides:
//! - **Machine**: pure hidden / transient / persistent visibility state
//! - **Binding**: a machine tied to one player's root, bar, hotspot and video
//! - **Registry**: at most one binding per player root, pruned on detach
//!
//! # Event flow
//!
//! ```text
//!   DOM event (host listener) ──► ControlRegistry::dispatch ──► machine
//!                                                                  │
//!          visible class toggled on the bar ◄── Step ─────────────┘
//!          TimerPlan returned to the host (cancel old, arm new)
//! ```

mod binding;
mod machine;
mod registry;

#[cfg(test)]
mod machine_tests;
#[cfg(test)]
mod registry_tests;

pub use binding::{BindingId, ControlBinding, Listener, ListenerRole};
pub use machine::{ControlBarMachine, ControlEvent, MediaEvent, Step, Visibility};
pub use registry::{ControlRegistry, NewBinding};
