//! Overlay neutralizer
//!
//! Voids the visual and interactive effect of every element matching an
//! overlay fingerprint. Elements are never removed or restructured: page
//! scripts may still hold references to them.
//!
//! An element that is or contains a fingerprinted video is never neutralized:
//! voiding it would hide the video, and the media pass would restore it on the
//! same batch, so the two passes would rewrite each other forever.

use crate::dom::{Dom, enforce_important};
use crate::selector::SelectorList;

/// Inline overrides forced onto every overlay element
pub const OVERLAY_STYLES: &[(&str, &str)] = &[
    ("background", "transparent"),
    ("opacity", "0"),
    ("transition", "none"),
    ("pointer-events", "none"),
    ("mix-blend-mode", "normal"),
];

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Matches across all fingerprints (an element matching two counts twice)
    pub matched: usize,
    /// Matches left alone because they hold a video. These receive none of the
    /// overlay overrides, background and `mix-blend-mode` included.
    pub spared: usize,
    /// Declarations actually written
    pub writes: usize,
}

pub struct OverlayNeutralizer<'a> {
    fingerprints: &'a [SelectorList],
    videos: &'a [SelectorList],
}

impl<'a> OverlayNeutralizer<'a> {
    pub fn new(fingerprints: &'a [SelectorList], videos: &'a [SelectorList]) -> Self {
        Self { fingerprints, videos }
    }

    pub fn sweep<D: Dom>(&self, dom: &D) -> OverlayReport {
        let mut report = OverlayReport::default();
        for fingerprint in self.fingerprints {
            for element in dom.query_all(fingerprint) {
                report.matched += 1;
                if self.holds_video(dom, &element) {
                    report.spared += 1;
                    continue;
                }
                report.writes += enforce_important(dom, &element, OVERLAY_STYLES);
            }
        }
        report
    }

    fn holds_video<D: Dom>(&self, dom: &D, element: &D::Element) -> bool {
        self.videos.iter().any(|video| {
            dom.closest(element, video).as_ref() == Some(element) || dom.query_within(element, video).is_some()
        })
    }
}
