//! Configuration loading and compilation
//!
//! [`FixConfig`] is plain data. Before the engine can use it, every selector is
//! parsed once into [`Fingerprints`]; invalid selectors or malformed marker names are
//! rejected up front so sweeps never have to handle them.

use thiserror::Error;
use unveil_types::FixConfig;

use crate::selector::{SelectorError, SelectorList};

/// Errors while loading or compiling a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config TOML")]
    Parse(#[from] toml::de::Error),

    #[error("invalid selector in {field}")]
    InvalidSelector {
        field: &'static str,
        #[source]
        source: SelectorError,
    },

    #[error("{field} must not be empty")]
    EmptyMarker { field: &'static str },

    #[error("{field} is not a valid class or id name: {value:?}")]
    InvalidMarker { field: &'static str, value: String },
}

/// Parse a TOML override on top of the built-in defaults and validate it.
pub fn load_config(text: &str) -> Result<FixConfig, ConfigError> {
    let config: FixConfig = toml::from_str(text)?;
    Fingerprints::compile(&config)?;
    Ok(config)
}

/// Every selector the engine queries, parsed once.
#[derive(Debug, Clone)]
pub struct Fingerprints {
    pub overlays: Vec<SelectorList>,
    pub videos: Vec<SelectorList>,
    pub player: SelectorList,
    pub control_bar: SelectorList,
    pub hotspot: SelectorList,
    pub dimmed: SelectorList,
    /// Plain `video`, for the media-event source inside a player root
    pub video_tag: SelectorList,
}

fn compile_one(field: &'static str, source: &str) -> Result<SelectorList, ConfigError> {
    SelectorList::parse(source).map_err(|source| ConfigError::InvalidSelector { field, source })
}

fn compile_all(field: &'static str, sources: &[String]) -> Result<Vec<SelectorList>, ConfigError> {
    sources.iter().map(|s| compile_one(field, s)).collect()
}

/// Plain CSS identifier: ASCII letters, digits, `-` and `_`, not starting
/// with a digit or `-` followed by a digit.
fn is_marker_ident(value: &str) -> bool {
    let bytes = value.as_bytes();
    let starts_numeric = match bytes {
        [first, ..] if first.is_ascii_digit() => true,
        [b'-', second, ..] => second.is_ascii_digit(),
        _ => false,
    };
    !starts_numeric
        && value != "-"
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
}

fn require_marker(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyMarker { field });
    }
    if !is_marker_ident(value) {
        return Err(ConfigError::InvalidMarker {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl Fingerprints {
    pub fn compile(config: &FixConfig) -> Result<Self, ConfigError> {
        require_marker("style_id", &config.style_id)?;
        require_marker("visible_class", &config.visible_class)?;
        require_marker("hotspot_class", &config.hotspot_class)?;
        require_marker("dimmed_class", &config.dimmed_class)?;

        Ok(Self {
            overlays: compile_all("overlay_selectors", &config.overlay_selectors)?,
            videos: compile_all("video_selectors", &config.video_selectors)?,
            player: compile_one("player_selector", &config.player_selector)?,
            control_bar: compile_one("control_bar_selector", &config.control_bar_selector)?,
            hotspot: compile_one("hotspot_class", &config.hotspot_selector())?,
            dimmed: compile_one("dimmed_class", &config.dimmed_selector())?,
            video_tag: compile_one("video", "video")?,
        })
    }
}
