//! Media reinforcer
//!
//! Undoes brightness and opacity suppression on every fingerprinted video and
//! its containers, and hands each player root to the control registry the first
//! time it is seen. Every lookup tolerates absence: a video without a player
//! ancestor still gets its own styles fixed, it just is not bound.

use crate::config::Fingerprints;
use crate::controls::{ControlRegistry, NewBinding};
use crate::dom::{Dom, enforce_important};

/// Inline overrides forced onto every fingerprinted video
pub const VIDEO_STYLES: &[(&str, &str)] = &[
    ("filter", "brightness(1)"),
    ("-webkit-filter", "brightness(1)"),
    ("opacity", "1"),
    ("transition", "none"),
    ("mix-blend-mode", "normal"),
];

/// Inline overrides forced onto the player root holding a video
pub const PLAYER_STYLES: &[(&str, &str)] = &[
    ("position", "relative"),
    ("background", "black"),
    ("filter", "none"),
    ("-webkit-filter", "none"),
];

/// Inline overrides forced onto the nearest dimmed-marker ancestor of a video
pub const DIMMED_ANCESTOR_STYLES: &[(&str, &str)] = &[("opacity", "1"), ("transition", "none")];

/// Outcome of one reinforcement pass
#[derive(Debug, Clone)]
pub struct MediaReport<E> {
    /// Matches across all video fingerprints
    pub videos: usize,
    /// Declarations written plus marker classes removed
    pub writes: usize,
    /// Players bound for the first time during this pass
    pub bound: Vec<NewBinding<E>>,
}

impl<E> Default for MediaReport<E> {
    fn default() -> Self {
        Self {
            videos: 0,
            writes: 0,
            bound: Vec::new(),
        }
    }
}

pub struct MediaReinforcer<'a> {
    fingerprints: &'a Fingerprints,
    dimmed_class: &'a str,
}

impl<'a> MediaReinforcer<'a> {
    pub fn new(fingerprints: &'a Fingerprints, dimmed_class: &'a str) -> Self {
        Self {
            fingerprints,
            dimmed_class,
        }
    }

    pub fn sweep<D: Dom>(&self, dom: &D, registry: &mut ControlRegistry<D::Element>) -> MediaReport<D::Element> {
        let mut report = MediaReport::default();
        for fingerprint in &self.fingerprints.videos {
            for video in dom.query_all(fingerprint) {
                report.videos += 1;
                report.writes += enforce_important(dom, &video, VIDEO_STYLES);

                if dom.has_class(&video, self.dimmed_class) {
                    dom.remove_class(&video, self.dimmed_class);
                    report.writes += 1;
                }

                if let Some(player) = dom.closest(&video, &self.fingerprints.player) {
                    report.writes += enforce_important(dom, &player, PLAYER_STYLES);
                    if let Some(bound) = registry.attach(dom, self.fingerprints, &player) {
                        report.bound.push(bound);
                    }
                }

                // Looked up after the video's own marker is gone, so this is an ancestor
                if let Some(dimmed) = dom.closest(&video, &self.fingerprints.dimmed) {
                    report.writes += enforce_important(dom, &dimmed, DIMMED_ANCESTOR_STYLES);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId, StyleDecl};
    use unveil_types::FixConfig;

    struct Fixture {
        config: FixConfig,
        fingerprints: Fingerprints,
        registry: ControlRegistry<NodeId>,
    }

    impl Fixture {
        fn new() -> Self {
            let config = FixConfig::default();
            let fingerprints = Fingerprints::compile(&config).unwrap();
            let registry = ControlRegistry::new(&config);
            Self {
                config,
                fingerprints,
                registry,
            }
        }

        fn sweep(&mut self, dom: &MemoryDom) -> MediaReport<NodeId> {
            MediaReinforcer::new(&self.fingerprints, &self.config.dimmed_class).sweep(dom, &mut self.registry)
        }
    }

    #[test]
    fn dimmed_video_recovers_in_one_pass() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let player = dom.insert(body, "div", &[("class", "video-js")]);
        let shade = dom.insert(player, "div", &[("class", "dim-video-player"), ("style", "opacity: 0.3")]);
        let video = dom.insert(
            shade,
            "video",
            &[
                ("class", "vjs-tech dim-video-player"),
                ("style", "filter: brightness(0.4)"),
            ],
        );
        let mut fx = Fixture::new();

        let report = fx.sweep(&dom);
        // `.video-js video` and `video.vjs-tech` both match
        assert_eq!(report.videos, 2);
        assert_eq!(dom.style_value(&video, "filter"), Some(StyleDecl::important("brightness(1)")));
        assert!(!dom.has_class(&video, "dim-video-player"));
        assert_eq!(dom.style_value(&shade, "opacity"), Some(StyleDecl::important("1")));
        assert_eq!(dom.style_value(&player, "background"), Some(StyleDecl::important("black")));
        // No control bar in this player yet
        assert!(report.bound.is_empty());
    }

    #[test]
    fn player_is_bound_once_across_sweeps() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let player = dom.insert(body, "div", &[("class", "video-js")]);
        // Matches two video fingerprints
        dom.insert(player, "video", &[("class", "vjs-tech")]);
        dom.insert(player, "div", &[("class", "vjs-control-bar")]);
        let mut fx = Fixture::new();

        let first = fx.sweep(&dom);
        assert_eq!(first.videos, 2);
        assert_eq!(first.bound.len(), 1);

        for _ in 0..3 {
            assert!(fx.sweep(&dom).bound.is_empty());
        }
        assert_eq!(fx.registry.len(), 1);
        let hotspots = dom
            .children(player)
            .into_iter()
            .filter(|c| dom.classes(*c).contains(&fx.config.hotspot_class))
            .count();
        assert_eq!(hotspots, 1);
    }

    #[test]
    fn orphan_video_is_fixed_without_binding() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let video = dom.insert(body, "video", &[("class", "vjs-tech"), ("style", "opacity: 0.2")]);
        let mut fx = Fixture::new();

        let report = fx.sweep(&dom);
        assert_eq!(report.videos, 1);
        assert_eq!(report.writes, VIDEO_STYLES.len());
        assert_eq!(dom.style_value(&video, "opacity"), Some(StyleDecl::important("1")));
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn second_pass_is_quiet() {
        let dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let player = dom.insert(body, "div", &[("class", "video-js")]);
        dom.insert(player, "video", &[("id", "container-element_html5_api")]);
        dom.insert(player, "div", &[("class", "vjs-control-bar")]);
        let mut fx = Fixture::new();

        assert!(fx.sweep(&dom).writes > 0);
        dom.take_mutations();

        let again = fx.sweep(&dom);
        assert_eq!(again.writes, 0);
        assert_eq!(dom.pending_mutations(), 0);
    }
}
