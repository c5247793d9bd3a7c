//! unveil userscript
//!
//! Wasm entry point. Once the document is interactive, installs the corrective
//! stylesheet, runs the first overlay and media pass, binds every player's
//! control bar and keeps all of it applied as the page mutates.

mod error;
mod host;
mod logging;
mod observer;
mod runtime;
mod settings;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element};

use unveil_types::FixConfig;

use crate::error::HostError;
use crate::runtime::Runtime;

#[wasm_bindgen(start)]
pub fn main() {
    let stored = settings::load_override();
    let config = match &stored {
        Ok(Some(config)) => config.clone(),
        _ => FixConfig::default(),
    };
    logging::init(config.debug_logging);

    match stored {
        Ok(Some(_)) => tracing::info!(key = settings::STORAGE_KEY, "using stored config override"),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "ignoring stored config override"),
    }

    if let Err(err) = when_ready(move || boot(config)) {
        tracing::warn!(error = %err, "could not wait for document readiness");
    }
}

fn boot(config: FixConfig) {
    match Runtime::boot(config) {
        Ok(shared) => runtime::install(shared),
        Err(err) => tracing::warn!(error = %err, "overlay fix not started"),
    }
}

/// Run `start` now if the document is past loading, else once on `DOMContentLoaded`.
fn when_ready(start: impl FnOnce() + 'static) -> Result<(), HostError> {
    let window = web_sys::window().ok_or(HostError::NoWindow)?;
    let document = window.document().ok_or(HostError::NoDocument)?;

    if document.ready_state() != "loading" {
        start();
        return Ok(());
    }

    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let callback = Closure::once_into_js(start);
    document
        .add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            callback.unchecked_ref(),
            &options,
        )
        .map_err(|e| HostError::js("addEventListener", e))
}

/// Stop reacting to page mutations. Bound control bars keep working.
#[wasm_bindgen]
pub fn stop() {
    runtime::with_active(|rt, _| rt.stop());
}

/// Show the control bar of the player rooted at `root`. Returns false if that
/// element is not a bound player.
#[wasm_bindgen(js_name = showControls)]
pub fn show_controls(root: &Element, persist: bool) -> bool {
    runtime::with_active(|rt, handle| rt.show(handle, root, persist)).unwrap_or(false)
}

/// Hide the control bar of the player rooted at `root` after `delay_ms`.
#[wasm_bindgen(js_name = hideControls)]
pub fn hide_controls(root: &Element, delay_ms: u32) -> bool {
    runtime::with_active(|rt, handle| rt.hide(handle, root, delay_ms)).unwrap_or(false)
}
