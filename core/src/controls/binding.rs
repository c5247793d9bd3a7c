//! One control-bar binding per player root
//!
//! A binding ties a [`ControlBarMachine`] to the elements it drives and lists
//! the DOM listeners the host must install to feed it.

use crate::dom::{Dom, toggle_class};
use crate::timers::{TimerPlan, TimerToken};

use super::machine::{ControlBarMachine, ControlEvent, MediaEvent, Step, Visibility};

/// Stable identity of a binding, never reused within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Which part of the player a listener sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerRole {
    Hotspot,
    ControlBar,
    Video,
    Root,
}

/// A DOM listener the host installs for a binding
#[derive(Debug, Clone, PartialEq)]
pub struct Listener<E> {
    pub target: E,
    pub role: ListenerRole,
    /// DOM event type
    pub event: &'static str,
    pub signal: ControlEvent,
    pub passive: bool,
}

const HOTSPOT_WIRING: &[(&str, ControlEvent, bool)] = &[
    ("mouseenter", ControlEvent::PointerEnter, false),
    ("mouseleave", ControlEvent::PointerLeave, false),
    ("touchstart", ControlEvent::TouchStart, true),
    ("touchend", ControlEvent::TouchEnd, true),
    ("touchcancel", ControlEvent::TouchCancel, true),
];

const CONTROL_BAR_WIRING: &[(&str, ControlEvent, bool)] = &[
    ("mouseenter", ControlEvent::PointerEnter, false),
    ("mouseleave", ControlEvent::PointerLeave, false),
    ("focusin", ControlEvent::FocusIn, false),
    ("focusout", ControlEvent::FocusOut, false),
    ("touchstart", ControlEvent::TouchStart, true),
    ("touchend", ControlEvent::TouchEnd, true),
    ("touchcancel", ControlEvent::TouchCancel, true),
];

const ROOT_WIRING: &[(&str, ControlEvent, bool)] = &[("mouseleave", ControlEvent::LeavePlayer, false)];

fn wire<E: Clone>(
    out: &mut Vec<Listener<E>>,
    target: &E,
    role: ListenerRole,
    table: &[(&'static str, ControlEvent, bool)],
) {
    out.extend(table.iter().map(|&(event, signal, passive)| Listener {
        target: target.clone(),
        role,
        event,
        signal,
        passive,
    }));
}

#[derive(Debug)]
pub struct ControlBinding<E> {
    id: BindingId,
    root: E,
    control_bar: E,
    hotspot: Option<E>,
    video: Option<E>,
    machine: ControlBarMachine,
}

impl<E: Clone> ControlBinding<E> {
    pub(crate) fn new(
        id: BindingId,
        root: E,
        control_bar: E,
        hotspot: Option<E>,
        video: Option<E>,
        machine: ControlBarMachine,
    ) -> Self {
        Self {
            id,
            root,
            control_bar,
            hotspot,
            video,
            machine,
        }
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn root(&self) -> &E {
        &self.root
    }

    pub fn control_bar(&self) -> &E {
        &self.control_bar
    }

    pub fn hotspot(&self) -> Option<&E> {
        self.hotspot.as_ref()
    }

    pub fn video(&self) -> Option<&E> {
        self.video.as_ref()
    }

    pub fn state(&self) -> Visibility {
        self.machine.state()
    }

    pub fn machine(&self) -> &ControlBarMachine {
        &self.machine
    }

    /// Every listener this binding needs, in installation order
    pub fn listeners(&self) -> Vec<Listener<E>> {
        let mut out = Vec::new();
        if let Some(hotspot) = &self.hotspot {
            wire(&mut out, hotspot, ListenerRole::Hotspot, HOTSPOT_WIRING);
        }
        wire(&mut out, &self.control_bar, ListenerRole::ControlBar, CONTROL_BAR_WIRING);
        if let Some(video) = &self.video {
            out.extend(MediaEvent::ALL.into_iter().map(|media| Listener {
                target: video.clone(),
                role: ListenerRole::Video,
                event: media.dom_name(),
                signal: ControlEvent::Media(media),
                passive: false,
            }));
        }
        wire(&mut out, &self.root, ListenerRole::Root, ROOT_WIRING);
        out
    }

    fn apply<D: Dom<Element = E>>(&self, dom: &D, visible_class: &str, step: Step) -> TimerPlan {
        if let Some(visible) = step.visible {
            toggle_class(dom, &self.control_bar, visible_class, visible);
        }
        step.timers
    }

    pub(crate) fn show<D: Dom<Element = E>>(&mut self, dom: &D, visible_class: &str, persist: bool) -> TimerPlan {
        let step = self.machine.show(persist);
        self.apply(dom, visible_class, step)
    }

    pub(crate) fn hide<D: Dom<Element = E>>(&mut self, dom: &D, visible_class: &str, delay_ms: u32) -> TimerPlan {
        let step = self.machine.hide(delay_ms);
        self.apply(dom, visible_class, step)
    }

    pub(crate) fn handle<D: Dom<Element = E>>(
        &mut self,
        dom: &D,
        visible_class: &str,
        event: ControlEvent,
    ) -> TimerPlan {
        let step = self.machine.handle(event);
        self.apply(dom, visible_class, step)
    }

    pub(crate) fn fire<D: Dom<Element = E>>(
        &mut self,
        dom: &D,
        visible_class: &str,
        token: TimerToken,
    ) -> TimerPlan {
        let step = self.machine.on_timer(token);
        self.apply(dom, visible_class, step)
    }
}
