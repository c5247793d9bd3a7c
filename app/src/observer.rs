//! Page-wide `MutationObserver`
//!
//! Translates native records into [`MutationKind`]s and hands each delivered
//! batch to a callback. Disconnects when dropped.

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};

use unveil_core::{MutationKind, WatchOptions};

use crate::error::HostError;

pub struct MutationWatcher {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl MutationWatcher {
    pub fn new<F>(mut on_batch: F) -> Result<Self, HostError>
    where
        F: FnMut(Vec<MutationKind>, &MutationObserver) + 'static,
    {
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, observer: MutationObserver| {
                on_batch(record_kinds(&records), &observer);
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| HostError::js("new MutationObserver", e))?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn observe(&self, target: &Node, options: &WatchOptions) -> Result<(), HostError> {
        let init = MutationObserverInit::new();
        init.set_child_list(options.child_list);
        init.set_subtree(options.subtree);
        if options.watches_attributes() {
            init.set_attributes(true);
            let filter: Array = options
                .attribute_filter
                .iter()
                .map(|name| JsValue::from_str(name))
                .collect();
            init.set_attribute_filter(&filter);
        }
        self.observer
            .observe_with_options(target, &init)
            .map_err(|e| HostError::js("MutationObserver.observe", e))
    }
}

impl Drop for MutationWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn record_kinds(records: &Array) -> Vec<MutationKind> {
    records
        .iter()
        .filter_map(|value| value.dyn_into::<MutationRecord>().ok())
        .filter_map(|record| match record.type_().as_str() {
            "childList" => Some(MutationKind::ChildList),
            "attributes" => record
                .attribute_name()
                .map(|name| MutationKind::Attribute(name.to_ascii_lowercase())),
            _ => None,
        })
        .collect()
}
