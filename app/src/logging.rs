//! Console logging for the userscript.
//!
//! INFO and above by default; `debug_logging = true` in the stored config
//! override enables DEBUG for the engine's binding and watcher events.

use dioxus_logger::tracing::Level;

/// Install the panic hook and the console subscriber. Safe to call once.
pub fn init(debug_logging: bool) {
    console_error_panic_hook::set_once();

    let level = if debug_logging { Level::DEBUG } else { Level::INFO };
    if let Err(err) = dioxus_logger::init(level) {
        // No subscriber to report through
        web_sys::console::warn_1(&format!("unveil: logging not initialized: {err}").into());
    }
}
