//! Stored configuration override
//!
//! Users can tune selectors, marker names and timings by putting a TOML
//! document under `localStorage["unveil-config"]`. Missing keys keep their
//! defaults.

use unveil_core::{FixConfig, load_config};

use crate::error::HostError;

pub const STORAGE_KEY: &str = "unveil-config";

/// Read and validate the override. `Ok(None)` when nothing is stored.
pub fn load_override() -> Result<Option<FixConfig>, HostError> {
    let window = web_sys::window().ok_or(HostError::NoWindow)?;
    let Some(storage) = window
        .local_storage()
        .map_err(|e| HostError::js("localStorage", e))?
    else {
        return Ok(None);
    };
    let Some(text) = storage
        .get_item(STORAGE_KEY)
        .map_err(|e| HostError::js("localStorage.getItem", e))?
    else {
        return Ok(None);
    };
    Ok(Some(load_config(&text)?))
}
