//! Shared configuration types for unveil
//!
//! This crate contains serializable configuration types that are shared between
//! the host-independent engine (unveil-core) and the WASM userscript (unveil-app).
//!
//! Every marker string the engine relies on for idempotence lives here instead of
//! in globals, so independent engine instances never collide.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Default Fingerprints
// ─────────────────────────────────────────────────────────────────────────────

/// Selectors identifying elements of the dimming overlay.
///
/// The substring entries (`overlay`, `mask`, `fade`, `shade`, black inline
/// backgrounds) are heuristic and can match unrelated page elements.
pub const DEFAULT_OVERLAY_SELECTORS: &[&str] = &[
    "#a-popover-lgtbox",
    "#ivFullscreenVideoBackdrop",
    ".vjs-big-play-button",
    ".vjs-poster",
    ".dim-video-player",
    r#"div[class*="overlay"]"#,
    r#"div[class*="mask"]"#,
    r#"div[class*="fade"]"#,
    r#"div[class*="shade"]"#,
    r#"div[style*="rgba(0, 0, 0"]"#,
    r#"div[style*="background-color: rgba(0, 0, 0"]"#,
    r#"div[style*="background-color: black"]"#,
];

/// Selectors identifying the player's video elements.
pub const DEFAULT_VIDEO_SELECTORS: &[&str] = &[
    ".video-js video",
    "video.vjs-tech",
    r#"video[id*="container-element_html5_api"]"#,
];

// ─────────────────────────────────────────────────────────────────────────────
// Control Bar Timing
// ─────────────────────────────────────────────────────────────────────────────

/// Delays (milliseconds) used by the control-bar visibility machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTiming {
    /// Dwell before a transiently shown control bar hides again
    #[serde(default = "default_transient_hide_ms")]
    pub transient_hide_ms: u32,
    /// Grace period after the pointer leaves the bar or hotspot, or focus leaves the bar
    #[serde(default = "default_leave_hide_ms")]
    pub leave_hide_ms: u32,
    /// Grace period after a touch on the bar or hotspot is released
    #[serde(default = "default_touch_release_ms")]
    pub touch_release_ms: u32,
}

fn default_transient_hide_ms() -> u32 {
    2400
}
fn default_leave_hide_ms() -> u32 {
    180
}
fn default_touch_release_ms() -> u32 {
    2400
}

impl Default for ControlTiming {
    fn default() -> Self {
        Self {
            transient_hide_ms: default_transient_hide_ms(),
            leave_hide_ms: default_leave_hide_ms(),
            touch_release_ms: default_touch_release_ms(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fix Config
// ─────────────────────────────────────────────────────────────────────────────

/// Complete configuration for one engine instance.
///
/// Missing fields deserialize to the built-in defaults, so an override only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixConfig {
    /// `id` of the injected `<style>` element
    #[serde(default = "default_style_id")]
    pub style_id: String,

    /// Class toggled on the control bar while it is visible
    #[serde(default = "default_visible_class")]
    pub visible_class: String,

    /// Class carried by the injected hover hotspot
    #[serde(default = "default_hotspot_class")]
    pub hotspot_class: String,

    /// Class the player adds to dim the video
    #[serde(default = "default_dimmed_class")]
    pub dimmed_class: String,

    /// Selector for the player root container
    #[serde(default = "default_player_selector")]
    pub player_selector: String,

    /// Selector for the control bar inside a player root
    #[serde(default = "default_control_bar_selector")]
    pub control_bar_selector: String,

    #[serde(default = "default_overlay_selectors")]
    pub overlay_selectors: Vec<String>,

    #[serde(default = "default_video_selectors")]
    pub video_selectors: Vec<String>,

    /// Attribute names whose changes trigger a reconciliation pass
    #[serde(default = "default_watched_attributes")]
    pub watched_attributes: Vec<String>,

    #[serde(default)]
    pub timing: ControlTiming,

    /// Raise log verbosity to DEBUG
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_style_id() -> String {
    "amazon-video-overlay-fix-style".to_string()
}
fn default_visible_class() -> String {
    "amazon-liquid-glass-visible".to_string()
}
fn default_hotspot_class() -> String {
    "amazon-liquid-glass-hotspot".to_string()
}
fn default_dimmed_class() -> String {
    "dim-video-player".to_string()
}
fn default_player_selector() -> String {
    ".video-js".to_string()
}
fn default_control_bar_selector() -> String {
    ".vjs-control-bar".to_string()
}
fn default_overlay_selectors() -> Vec<String> {
    DEFAULT_OVERLAY_SELECTORS.iter().map(|s| s.to_string()).collect()
}
fn default_video_selectors() -> Vec<String> {
    DEFAULT_VIDEO_SELECTORS.iter().map(|s| s.to_string()).collect()
}
fn default_watched_attributes() -> Vec<String> {
    vec!["style".to_string(), "class".to_string()]
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            style_id: default_style_id(),
            visible_class: default_visible_class(),
            hotspot_class: default_hotspot_class(),
            dimmed_class: default_dimmed_class(),
            player_selector: default_player_selector(),
            control_bar_selector: default_control_bar_selector(),
            overlay_selectors: default_overlay_selectors(),
            video_selectors: default_video_selectors(),
            watched_attributes: default_watched_attributes(),
            timing: ControlTiming::default(),
            debug_logging: false,
        }
    }
}

impl FixConfig {
    /// Selector matching the injected hotspot inside a player root
    pub fn hotspot_selector(&self) -> String {
        format!(".{}", self.hotspot_class)
    }

    /// Selector matching the nearest dimmed ancestor of a video
    pub fn dimmed_selector(&self) -> String {
        format!(".{}", self.dimmed_class)
    }

    /// Copy of this config with every marker class and the style id suffixed,
    /// so a second instance can share a document without colliding.
    pub fn with_marker_suffix(&self, suffix: &str) -> Self {
        Self {
            style_id: format!("{}-{suffix}", self.style_id),
            visible_class: format!("{}-{suffix}", self.visible_class),
            hotspot_class: format!("{}-{suffix}", self.hotspot_class),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_full_fingerprint_sets() {
        let config = FixConfig::default();
        assert_eq!(config.overlay_selectors.len(), 12);
        assert_eq!(config.video_selectors.len(), 3);
        assert_eq!(config.watched_attributes, vec!["style", "class"]);
        assert_eq!(config.timing.transient_hide_ms, 2400);
        assert_eq!(config.timing.leave_hide_ms, 180);
    }

    #[test]
    fn derived_selectors_use_marker_classes() {
        let config = FixConfig::default();
        assert_eq!(config.hotspot_selector(), ".amazon-liquid-glass-hotspot");
        assert_eq!(config.dimmed_selector(), ".dim-video-player");
    }

    #[test]
    fn marker_suffix_leaves_fingerprints_alone() {
        let config = FixConfig::default().with_marker_suffix("b");
        assert_eq!(config.style_id, "amazon-video-overlay-fix-style-b");
        assert_eq!(config.visible_class, "amazon-liquid-glass-visible-b");
        assert_eq!(config.dimmed_class, "dim-video-player");
        assert_eq!(config.overlay_selectors, FixConfig::default().overlay_selectors);
    }
}
