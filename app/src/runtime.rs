//! Host side of the engine
//!
//! Owns the [`OverlayFix`] over the live page and carries out what it asks
//! for: DOM listeners per binding and one `setTimeout` per control bar.
//!
//! Every browser callback holds only a `Weak` handle. A callback that finds the
//! runtime gone or already borrowed is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use hashbrown::HashMap;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Element, Event, MutationObserver};

use unveil_core::{
    BindingId, Dom, FixConfig, Listener, MutationKind, OverlayFix, Reconciliation, TimerPlan,
    TimerToken,
};

use crate::error::HostError;
use crate::host::WebDom;
use crate::observer::MutationWatcher;

type Shared = Rc<RefCell<Runtime>>;
type Handle = Weak<RefCell<Runtime>>;

thread_local! {
    static ACTIVE: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

/// A listener attached to the page, removed again on drop
struct InstalledListener {
    target: Element,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl InstalledListener {
    fn install(listener: &Listener<Element>, handle: &Handle, id: BindingId) -> Result<Self, HostError> {
        let weak = handle.clone();
        let signal = listener.signal;
        let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            enter(&weak, |rt, handle| {
                let plan = rt.fix.dispatch(id, signal);
                rt.apply(handle, id, plan);
            });
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(listener.passive);
        listener
            .target
            .add_event_listener_with_callback_and_add_event_listener_options(
                listener.event,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| HostError::js("addEventListener", e))?;

        Ok(Self {
            target: listener.target.clone(),
            event: listener.event,
            callback,
        })
    }
}

impl Drop for InstalledListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Armed hide timer; dropping it clears the timeout
struct ArmedTimer {
    token: TimerToken,
    _timeout: Timeout,
}

/// Page resources held for one binding
#[derive(Default)]
struct Wiring {
    listeners: Vec<InstalledListener>,
    timer: Option<ArmedTimer>,
}

pub struct Runtime {
    fix: OverlayFix<WebDom>,
    wiring: HashMap<BindingId, Wiring>,
    watcher: Option<MutationWatcher>,
}

impl Runtime {
    /// Run the first pass over the page and subscribe to its mutations.
    pub fn boot(config: FixConfig) -> Result<Shared, HostError> {
        let dom = WebDom::from_window()?;
        let body = dom.body().ok_or(HostError::NoBody)?;
        let fix = OverlayFix::new(dom, config)?;

        let shared = Rc::new(RefCell::new(Self {
            fix,
            wiring: HashMap::new(),
            watcher: None,
        }));
        let handle = Rc::downgrade(&shared);

        let first = shared.borrow_mut().fix.start();
        if let Some(pass) = first {
            let mut rt = shared.borrow_mut();
            rt.absorb(&handle, pass);

            let batch_handle = handle.clone();
            let watcher = MutationWatcher::new(move |batch, observer| {
                on_batch(&batch_handle, batch, observer);
            })?;
            watcher.observe(&body, rt.fix.watcher().options())?;
            rt.watcher = Some(watcher);
            tracing::info!(players = rt.fix.controls().len(), "overlay fix active");
        }
        Ok(shared)
    }

    /// Stop reacting to mutations. Bound control bars keep working.
    pub fn stop(&mut self) {
        self.fix.stop();
        self.watcher = None;
    }

    pub fn show(&mut self, handle: &Handle, root: &Element, persist: bool) -> bool {
        match self.fix.show_controls(root, persist) {
            Some((id, plan)) => {
                self.apply(handle, id, plan);
                true
            }
            None => false,
        }
    }

    pub fn hide(&mut self, handle: &Handle, root: &Element, delay_ms: u32) -> bool {
        match self.fix.hide_controls(root, delay_ms) {
            Some((id, plan)) => {
                self.apply(handle, id, plan);
                true
            }
            None => false,
        }
    }

    fn absorb(&mut self, handle: &Handle, pass: Reconciliation<Element>) {
        for id in &pass.pruned {
            self.wiring.remove(id);
        }
        for bound in pass.media.bound {
            let mut wiring = Wiring::default();
            for listener in &bound.listeners {
                match InstalledListener::install(listener, handle, bound.id) {
                    Ok(installed) => wiring.listeners.push(installed),
                    Err(err) => tracing::warn!(error = %err, event = listener.event, "listener not installed"),
                }
            }
            self.wiring.insert(bound.id, wiring);
            self.apply(handle, bound.id, bound.timers);
        }
    }

    fn apply(&mut self, handle: &Handle, id: BindingId, plan: TimerPlan) {
        let Some(wiring) = self.wiring.get_mut(&id) else {
            return;
        };
        if let Some(token) = plan.cancel
            && wiring.timer.as_ref().is_some_and(|t| t.token == token)
        {
            wiring.timer = None;
        }
        if let Some(arm) = plan.arm {
            let weak = handle.clone();
            let timeout = Timeout::new(arm.delay_ms, move || {
                enter(&weak, |rt, handle| {
                    let plan = rt.fix.fire(id, arm.token);
                    rt.apply(handle, id, plan);
                });
            });
            wiring.timer = Some(ArmedTimer {
                token: arm.token,
                _timeout: timeout,
            });
        }
    }
}

fn on_batch(handle: &Handle, batch: Vec<MutationKind>, observer: &MutationObserver) {
    enter(handle, |rt, handle| {
        if let Some(pass) = rt.fix.on_mutations(&batch) {
            rt.absorb(handle, pass);
        }
    });
    // Everything queued during the pass is our own writes
    let echoed = observer.take_records().length();
    if echoed > 0 {
        tracing::trace!(echoed, "dropped own mutation records");
    }
}

fn enter<R>(handle: &Handle, f: impl FnOnce(&mut Runtime, &Handle) -> R) -> Option<R> {
    let shared = handle.upgrade()?;
    let Ok(mut rt) = shared.try_borrow_mut() else {
        tracing::trace!("runtime busy, callback dropped");
        return None;
    };
    Some(f(&mut rt, handle))
}

/// Keep `shared` alive for the rest of the page's life
pub fn install(shared: Shared) {
    ACTIVE.with(|slot| *slot.borrow_mut() = Some(shared));
}

/// Run `f` against the installed runtime, if any
pub fn with_active<R>(f: impl FnOnce(&mut Runtime, &Handle) -> R) -> Option<R> {
    let shared = ACTIVE.with(|slot| slot.borrow().clone())?;
    enter(&Rc::downgrade(&shared), f)
}
