//! Corrective stylesheet
//!
//! One `<style>` element, identified by the configured id, carries the static
//! half of the fix: overlay transparency, filter neutralization, and the glass
//! control bar whose visible variant is switched on by the visible class.

use unveil_types::FixConfig;

use crate::dom::Dom;

/// Result of an install attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyPresent,
    /// `<head>` not available yet; call again later
    Deferred,
}

/// Split a selector list at top-level commas, leaving commas inside
/// attribute brackets and quoted values alone.
fn split_list(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(list[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

/// Every item of `list` with `suffix` appended.
fn each(list: &[&str], suffix: &str) -> Vec<String> {
    list.iter().map(|item| format!("{item}{suffix}")).collect()
}

/// Descendant combinations of every ancestor with every tail, one per line.
fn within(ancestors: &[&str], tails: &[String]) -> String {
    ancestors
        .iter()
        .flat_map(move |a| tails.iter().map(move |t| format!("{a} {t}")))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Render the full rule set for `config`.
///
/// Player, control bar and video rules are built from the configured
/// selectors, so an override of those still gets a hidden-by-default bar
/// with a visible variant.
pub fn render_css(config: &FixConfig) -> String {
    let overlays = config.overlay_selectors.join(",\n");
    let dimmed = &config.dimmed_class;
    let visible = &config.visible_class;
    let hotspot = &config.hotspot_class;

    let players = split_list(&config.player_selector);
    let bars = split_list(&config.control_bar_selector);
    let videos: Vec<&str> = config
        .video_selectors
        .iter()
        .flat_map(|s| split_list(s))
        .collect();

    let player = players.join(",\n");
    let player_all = [player.clone(), each(&players, " *").join(",\n")].join(",\n");
    let video = videos.join(",\n");
    let dimmed_video = [vec![format!(".{dimmed}")], each(&videos, &format!(".{dimmed}"))]
        .concat()
        .join(",\n");
    let bar = within(&players, &each(&bars, ""));
    let bar_visible = within(&players, &each(&bars, &format!(".{visible}")));
    let bar_controls = within(&players, &each(&bars, " .vjs-control"));
    let bar_pseudo = within(&players, &[each(&bars, "::before"), each(&bars, "::after")].concat());
    let progress_holder = within(&players, &[".vjs-progress-holder".to_string()]);
    let play_progress = within(&players, &[".vjs-play-progress".to_string()]);
    let load_progress = within(
        &players,
        &[".vjs-load-progress".to_string(), ".vjs-load-progress div".to_string()],
    );
    let hotspot_rule = within(&players, &[format!(".{hotspot}")]);

    format!(
        r#"{overlays} {{
  background: transparent !important;
  opacity: 0 !important;
  transition: none !important;
  pointer-events: none !important;
}}

{dimmed_video} {{
  opacity: 1 !important;
  transition: none !important;
  filter: brightness(1) !important;
  -webkit-filter: brightness(1) !important;
}}

{player_all} {{
  filter: none !important;
  -webkit-filter: none !important;
}}

{video} {{
  filter: brightness(1) !important;
  -webkit-filter: brightness(1) !important;
  opacity: 1 !important;
  transition: none !important;
  mix-blend-mode: normal !important;
  background: black !important;
}}

{player} {{
  position: relative !important;
}}

{bar} {{
  position: relative !important;
  background: rgba(28, 28, 30, 0.32) !important;
  border: 1px solid rgba(255, 255, 255, 0.16) !important;
  border-radius: 18px !important;
  backdrop-filter: blur(22px) saturate(180%) !important;
  -webkit-backdrop-filter: blur(22px) saturate(180%) !important;
  box-shadow: 0 12px 24px rgba(0, 0, 0, 0.35) !important;
  opacity: 0 !important;
  pointer-events: none !important;
  transform: translateY(14px) !important;
  transition: opacity 180ms ease, transform 180ms ease !important;
  z-index: 3 !important;
}}

{bar_visible} {{
  opacity: 1 !important;
  pointer-events: auto !important;
  transform: translateY(0) !important;
}}

{bar_controls} {{
  color: rgba(255, 255, 255, 0.92) !important;
  text-shadow: 0 2px 6px rgba(0, 0, 0, 0.45) !important;
}}

{progress_holder} {{
  background: rgba(255, 255, 255, 0.18) !important;
  border-radius: 999px !important;
  overflow: hidden !important;
}}

{play_progress} {{
  background: linear-gradient(90deg, rgba(255, 255, 255, 0.9), rgba(116, 203, 255, 0.9)) !important;
  box-shadow: 0 0 16px rgba(85, 190, 255, 0.65) !important;
}}

{load_progress} {{
  background: rgba(255, 255, 255, 0.28) !important;
}}

{bar_pseudo} {{
  display: none !important;
}}

{hotspot_rule} {{
  position: absolute !important;
  left: 0 !important;
  right: 0 !important;
  bottom: 0 !important;
  height: 72px !important;
  pointer-events: auto !important;
  background: transparent !important;
  z-index: 2 !important;
}}
"#
    )
}

/// Ensures the corrective `<style>` element exists exactly once.
#[derive(Debug, Clone)]
pub struct StyleSheetInstaller {
    id: String,
    css: String,
}

impl StyleSheetInstaller {
    pub fn new(config: &FixConfig) -> Self {
        Self {
            id: config.style_id.clone(),
            css: render_css(config),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn ensure_installed<D: Dom>(&self, dom: &D) -> InstallOutcome {
        if dom.element_by_id(&self.id).is_some() {
            return InstallOutcome::AlreadyPresent;
        }
        let Some(head) = dom.head() else {
            return InstallOutcome::Deferred;
        };
        let Some(style) = dom.create_element("style") else {
            return InstallOutcome::Deferred;
        };
        dom.set_id(&style, &self.id);
        dom.set_text(&style, &self.css);
        dom.append_child(&head, &style);
        tracing::debug!(id = %self.id, bytes = self.css.len(), "corrective stylesheet installed");
        InstallOutcome::Installed
    }
}
