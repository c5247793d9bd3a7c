use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

use unveil_core::ConfigError;

/// Failures talking to the browser
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("document has no body yet")]
    NoBody,

    #[error("{op} failed: {message}")]
    Js { op: &'static str, message: String },

    #[error("stored config override is invalid")]
    Config(#[from] ConfigError),
}

impl HostError {
    /// Wrap a thrown JS value
    pub fn js(op: &'static str, value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Js { op, message }
    }
}
