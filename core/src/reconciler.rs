//! Reconciliation loop
//!
//! [`OverlayFix`] owns one engine instance over one document: the stylesheet
//! installer, both sweeps, the control registry and the change watcher. It is
//! sans-IO. The host feeds it mutation batches, DOM events and timer callbacks,
//! and carries out the listener and timer work it hands back.
//!
//! ```text
//!   start() ──► pass ──► host subscribes the observer
//!
//!   mutation batch ──► on_mutations ──► ChangeWatcher::admit ──► pass
//!
//!   pass = prune detached roots
//!        → ensure stylesheet
//!        → overlay sweep   (always completes first)
//!        → media sweep     (binds newly seen players)
//! ```

use unveil_types::FixConfig;

use crate::config::{ConfigError, Fingerprints};
use crate::controls::{BindingId, ControlEvent, ControlRegistry};
use crate::dom::Dom;
use crate::media::{MediaReinforcer, MediaReport};
use crate::overlay::{OverlayNeutralizer, OverlayReport};
use crate::stylesheet::{InstallOutcome, StyleSheetInstaller};
use crate::timers::{TimerPlan, TimerToken};
use crate::watcher::{ChangeWatcher, MutationKind, WatchOptions};

/// Everything one pass did, for the host to act on
#[derive(Debug, Clone)]
pub struct Reconciliation<E> {
    pub stylesheet: InstallOutcome,
    pub overlays: OverlayReport,
    pub media: MediaReport<E>,
    /// Bindings forgotten because their root left the document
    pub pruned: Vec<BindingId>,
}

impl<E> Reconciliation<E> {
    /// Whether the pass changed anything in the document
    pub fn wrote(&self) -> bool {
        self.stylesheet == InstallOutcome::Installed
            || self.overlays.writes > 0
            || self.media.writes > 0
            || !self.media.bound.is_empty()
    }
}

pub struct OverlayFix<D: Dom> {
    dom: D,
    config: FixConfig,
    fingerprints: Fingerprints,
    installer: StyleSheetInstaller,
    watcher: ChangeWatcher,
    registry: ControlRegistry<D::Element>,
}

impl<D: Dom> OverlayFix<D> {
    pub fn new(dom: D, config: FixConfig) -> Result<Self, ConfigError> {
        let fingerprints = Fingerprints::compile(&config)?;
        Ok(Self {
            installer: StyleSheetInstaller::new(&config),
            watcher: ChangeWatcher::new(WatchOptions::from_config(&config)),
            registry: ControlRegistry::new(&config),
            dom,
            config,
            fingerprints,
        })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn config(&self) -> &FixConfig {
        &self.config
    }

    pub fn fingerprints(&self) -> &Fingerprints {
        &self.fingerprints
    }

    pub fn controls(&self) -> &ControlRegistry<D::Element> {
        &self.registry
    }

    pub fn watcher(&self) -> &ChangeWatcher {
        &self.watcher
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_observing()
    }

    /// Run the initial pass and begin observing. Returns `None` if already
    /// started (or stopped), in which case the host must not subscribe again.
    pub fn start(&mut self) -> Option<Reconciliation<D::Element>> {
        if !self.watcher.start() {
            return None;
        }
        Some(self.reconcile())
    }

    /// Halt the loop. Later batches are ignored; bindings keep answering
    /// events until their roots leave the document.
    pub fn stop(&mut self) {
        self.watcher.stop();
    }

    /// Handle one mutation notification batch
    pub fn on_mutations(&mut self, batch: &[MutationKind]) -> Option<Reconciliation<D::Element>> {
        if !self.watcher.admit(batch) {
            return None;
        }
        Some(self.reconcile())
    }

    /// One full pass over the document
    pub fn reconcile(&mut self) -> Reconciliation<D::Element> {
        let pruned = self.registry.prune(&self.dom);
        let stylesheet = self.installer.ensure_installed(&self.dom);
        let overlays =
            OverlayNeutralizer::new(&self.fingerprints.overlays, &self.fingerprints.videos).sweep(&self.dom);
        let media = MediaReinforcer::new(&self.fingerprints, &self.config.dimmed_class)
            .sweep(&self.dom, &mut self.registry);

        tracing::trace!(
            overlays = overlays.matched,
            overlay_writes = overlays.writes,
            videos = media.videos,
            media_writes = media.writes,
            bound = media.bound.len(),
            pruned = pruned.len(),
            "reconciled"
        );

        Reconciliation {
            stylesheet,
            overlays,
            media,
            pruned,
        }
    }

    /// Route a DOM event from a binding's listener
    pub fn dispatch(&mut self, id: BindingId, event: ControlEvent) -> TimerPlan {
        self.registry.dispatch(&self.dom, id, event)
    }

    /// Deliver a fired hide timer
    pub fn fire(&mut self, id: BindingId, token: TimerToken) -> TimerPlan {
        self.registry.fire(&self.dom, id, token)
    }

    /// Show the control bar of the player at `root`, if bound
    pub fn show_controls(&mut self, root: &D::Element, persist: bool) -> Option<(BindingId, TimerPlan)> {
        self.registry.show(&self.dom, root, persist)
    }

    /// Hide the control bar of the player at `root` after `delay_ms`, if bound
    pub fn hide_controls(&mut self, root: &D::Element, delay_ms: u32) -> Option<(BindingId, TimerPlan)> {
        self.registry.hide(&self.dom, root, delay_ms)
    }
}

impl<D: Dom> std::fmt::Debug for OverlayFix<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayFix")
            .field("style_id", &self.config.style_id)
            .field("watch", &self.watcher.state())
            .field("bindings", &self.registry.len())
            .finish()
    }
}
