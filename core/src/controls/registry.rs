//! Binding registry
//!
//! Side table from player root to its binding, keyed by element identity rather
//! than by any attribute the page could reset. Entries do not outlive their
//! root's presence in the document: [`ControlRegistry::prune`] drops every
//! binding whose root is no longer connected, and runs before each pass.

use std::fmt;

use unveil_types::{ControlTiming, FixConfig};

use super::binding::{BindingId, ControlBinding, Listener};
use super::machine::{ControlBarMachine, ControlEvent};
use crate::config::Fingerprints;
use crate::dom::Dom;
use crate::timers::{TimerPlan, TimerToken};

/// A binding created during a pass, with everything the host must set up
#[derive(Debug, Clone)]
pub struct NewBinding<E> {
    pub id: BindingId,
    pub listeners: Vec<Listener<E>>,
    /// Timer armed by the initial transient show
    pub timers: TimerPlan,
}

#[derive(Debug)]
pub struct ControlRegistry<E> {
    bindings: Vec<ControlBinding<E>>,
    next_id: u64,
    visible_class: String,
    hotspot_class: String,
    timing: ControlTiming,
}

impl<E: Clone + PartialEq + fmt::Debug> ControlRegistry<E> {
    pub fn new(config: &FixConfig) -> Self {
        Self {
            bindings: Vec::new(),
            next_id: 0,
            visible_class: config.visible_class.clone(),
            hotspot_class: config.hotspot_class.clone(),
            timing: config.timing,
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_bound(&self, root: &E) -> bool {
        self.find(root).is_some()
    }

    pub fn find(&self, root: &E) -> Option<&ControlBinding<E>> {
        self.bindings.iter().find(|b| b.root() == root)
    }

    pub fn get(&self, id: BindingId) -> Option<&ControlBinding<E>> {
        self.bindings.iter().find(|b| b.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlBinding<E>> {
        self.bindings.iter()
    }

    /// Forget bindings whose root left the document. Returns their ids so the
    /// host can release listeners and timers.
    pub fn prune<D: Dom<Element = E>>(&mut self, dom: &D) -> Vec<BindingId> {
        let mut dropped = Vec::new();
        self.bindings.retain(|binding| {
            if dom.is_connected(binding.root()) {
                return true;
            }
            dropped.push(binding.id());
            false
        });
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "forgot bindings of detached player roots");
        }
        dropped
    }

    /// Bind `root` unless it is already bound or has no control bar yet.
    pub fn attach<D: Dom<Element = E>>(
        &mut self,
        dom: &D,
        fingerprints: &Fingerprints,
        root: &E,
    ) -> Option<NewBinding<E>> {
        if self.is_bound(root) {
            return None;
        }
        // No control bar yet: left unregistered, the next pass retries
        let control_bar = dom.query_within(root, &fingerprints.control_bar)?;
        let hotspot = self.ensure_hotspot(dom, fingerprints, root);
        let video = dom.query_within(root, &fingerprints.video_tag);

        self.next_id += 1;
        let id = BindingId::new(self.next_id);
        let mut binding = ControlBinding::new(
            id,
            root.clone(),
            control_bar,
            hotspot,
            video,
            ControlBarMachine::new(self.timing),
        );

        // Shown briefly on first sight so the user notices the controls
        let timers = binding.show(dom, &self.visible_class, false);
        let listeners = binding.listeners();
        tracing::debug!(
            binding = id.raw(),
            has_video = binding.video().is_some(),
            has_hotspot = binding.hotspot().is_some(),
            "control bar bound"
        );
        self.bindings.push(binding);

        Some(NewBinding {
            id,
            listeners,
            timers,
        })
    }

    /// Existing hotspot in `root`, or a freshly appended one
    fn ensure_hotspot<D: Dom<Element = E>>(
        &self,
        dom: &D,
        fingerprints: &Fingerprints,
        root: &E,
    ) -> Option<E> {
        if let Some(existing) = dom.query_within(root, &fingerprints.hotspot) {
            return Some(existing);
        }
        let hotspot = dom.create_element("div")?;
        dom.add_class(&hotspot, &self.hotspot_class);
        dom.append_child(root, &hotspot);
        Some(hotspot)
    }

    /// Route an input event to binding `id`. Unknown ids are ignored.
    pub fn dispatch<D: Dom<Element = E>>(&mut self, dom: &D, id: BindingId, event: ControlEvent) -> TimerPlan {
        let Self {
            bindings,
            visible_class,
            ..
        } = self;
        match bindings.iter_mut().find(|b| b.id() == id) {
            Some(binding) => binding.handle(dom, visible_class, event),
            None => TimerPlan::default(),
        }
    }

    /// Deliver a timer callback to binding `id`
    pub fn fire<D: Dom<Element = E>>(&mut self, dom: &D, id: BindingId, token: TimerToken) -> TimerPlan {
        let Self {
            bindings,
            visible_class,
            ..
        } = self;
        match bindings.iter_mut().find(|b| b.id() == id) {
            Some(binding) => binding.fire(dom, visible_class, token),
            None => TimerPlan::default(),
        }
    }

    pub fn show<D: Dom<Element = E>>(&mut self, dom: &D, root: &E, persist: bool) -> Option<(BindingId, TimerPlan)> {
        let Self {
            bindings,
            visible_class,
            ..
        } = self;
        let binding = bindings.iter_mut().find(|b| b.root() == root)?;
        Some((binding.id(), binding.show(dom, visible_class, persist)))
    }

    pub fn hide<D: Dom<Element = E>>(&mut self, dom: &D, root: &E, delay_ms: u32) -> Option<(BindingId, TimerPlan)> {
        let Self {
            bindings,
            visible_class,
            ..
        } = self;
        let binding = bindings.iter_mut().find(|b| b.root() == root)?;
        Some((binding.id(), binding.hide(dom, visible_class, delay_ms)))
    }
}
