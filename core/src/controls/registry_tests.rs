//! Tests for ControlRegistry binding lifecycle
//!
//! Verifies binding uniqueness, hotspot reuse, listener wiring and pruning of
//! detached player roots.

use unveil_types::FixConfig;

use super::{ControlEvent, ControlRegistry, ListenerRole, Visibility};
use crate::config::Fingerprints;
use crate::dom::{Dom, MemoryDom, NodeId};

struct Player {
    root: NodeId,
    bar: NodeId,
}

fn player(dom: &MemoryDom, with_video: bool) -> Player {
    let body = dom.body().unwrap();
    let root = dom.insert(body, "div", &[("class", "video-js")]);
    if with_video {
        dom.insert(root, "video", &[("class", "vjs-tech")]);
    }
    let bar = dom.insert(root, "div", &[("class", "vjs-control-bar")]);
    Player { root, bar }
}

fn setup() -> (FixConfig, Fingerprints, ControlRegistry<NodeId>) {
    let config = FixConfig::default();
    let fingerprints = Fingerprints::compile(&config).unwrap();
    let registry = ControlRegistry::new(&config);
    (config, fingerprints, registry)
}

fn hotspots(dom: &MemoryDom, root: NodeId, config: &FixConfig) -> usize {
    dom.children(root)
        .into_iter()
        .filter(|c| dom.classes(*c).contains(&config.hotspot_class))
        .count()
}

#[test]
fn attach_binds_once() {
    let dom = MemoryDom::new();
    let p = player(&dom, true);
    let (config, fp, mut registry) = setup();

    let first = registry.attach(&dom, &fp, &p.root).expect("first attach binds");
    assert!(registry.attach(&dom, &fp, &p.root).is_none());
    assert!(registry.attach(&dom, &fp, &p.root).is_none());

    assert_eq!(registry.len(), 1);
    assert_eq!(hotspots(&dom, p.root, &config), 1);
    assert_eq!(first.timers.arm.unwrap().delay_ms, 2400);
}

#[test]
fn initial_state_is_transient_and_visible() {
    let dom = MemoryDom::new();
    let p = player(&dom, true);
    let (config, fp, mut registry) = setup();

    let bound = registry.attach(&dom, &fp, &p.root).unwrap();
    assert_eq!(registry.get(bound.id).unwrap().state(), Visibility::VisibleTransient);
    assert!(dom.classes(p.bar).contains(&config.visible_class));
}

#[test]
fn root_without_control_bar_is_retried_later() {
    let dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let root = dom.insert(body, "div", &[("class", "video-js")]);
    let (config, fp, mut registry) = setup();

    assert!(registry.attach(&dom, &fp, &root).is_none());
    assert!(registry.is_empty());
    assert_eq!(hotspots(&dom, root, &config), 0);

    dom.insert(root, "div", &[("class", "vjs-control-bar")]);
    assert!(registry.attach(&dom, &fp, &root).is_some());
}

#[test]
fn existing_hotspot_is_adopted() {
    let dom = MemoryDom::new();
    let p = player(&dom, false);
    let (config, fp, mut registry) = setup();
    let existing = dom.insert(p.root, "div", &[("class", config.hotspot_class.as_str())]);

    let bound = registry.attach(&dom, &fp, &p.root).unwrap();
    assert_eq!(registry.get(bound.id).unwrap().hotspot(), Some(&existing));
    assert_eq!(hotspots(&dom, p.root, &config), 1);
}

#[test]
fn listeners_cover_every_part() {
    let dom = MemoryDom::new();
    let p = player(&dom, true);
    let (_, fp, mut registry) = setup();

    let bound = registry.attach(&dom, &fp, &p.root).unwrap();
    let count = |role: ListenerRole| bound.listeners.iter().filter(|l| l.role == role).count();
    assert_eq!(count(ListenerRole::Hotspot), 5);
    assert_eq!(count(ListenerRole::ControlBar), 7);
    assert_eq!(count(ListenerRole::Video), 4);
    assert_eq!(count(ListenerRole::Root), 1);

    let root_leave = bound
        .listeners
        .iter()
        .find(|l| l.role == ListenerRole::Root)
        .unwrap();
    assert_eq!(root_leave.event, "mouseleave");
    assert_eq!(root_leave.signal, ControlEvent::LeavePlayer);
    assert_eq!(root_leave.target, p.root);

    assert!(
        bound
            .listeners
            .iter()
            .filter(|l| l.event.starts_with("touch"))
            .all(|l| l.passive)
    );
}

#[test]
fn player_without_video_has_no_media_listeners() {
    let dom = MemoryDom::new();
    let p = player(&dom, false);
    let (_, fp, mut registry) = setup();

    let bound = registry.attach(&dom, &fp, &p.root).unwrap();
    assert!(bound.listeners.iter().all(|l| l.role != ListenerRole::Video));
}

#[test]
fn dispatch_toggles_visible_class() {
    let dom = MemoryDom::new();
    let p = player(&dom, true);
    let (config, fp, mut registry) = setup();
    let bound = registry.attach(&dom, &fp, &p.root).unwrap();

    registry.dispatch(&dom, bound.id, ControlEvent::LeavePlayer);
    assert!(!dom.classes(p.bar).contains(&config.visible_class));

    registry.dispatch(&dom, bound.id, ControlEvent::PointerEnter);
    assert!(dom.classes(p.bar).contains(&config.visible_class));
    assert_eq!(registry.get(bound.id).unwrap().state(), Visibility::VisiblePersistent);
}

#[test]
fn detached_root_is_pruned_and_rebound_on_return() {
    let dom = MemoryDom::new();
    let p = player(&dom, true);
    let (config, fp, mut registry) = setup();
    let first = registry.attach(&dom, &fp, &p.root).unwrap();

    assert!(registry.prune(&dom).is_empty());
    dom.remove(p.root);
    assert_eq!(registry.prune(&dom), vec![first.id]);
    assert!(registry.is_empty());

    // Late callbacks for the forgotten binding are inert
    assert!(
        registry
            .dispatch(&dom, first.id, ControlEvent::PointerEnter)
            .is_empty()
    );

    dom.append_child(&dom.body().unwrap(), &p.root);
    let second = registry.attach(&dom, &fp, &p.root).unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(hotspots(&dom, p.root, &config), 1);
}

#[test]
fn show_and_hide_by_root() {
    let dom = MemoryDom::new();
    let p = player(&dom, true);
    let (config, fp, mut registry) = setup();
    let bound = registry.attach(&dom, &fp, &p.root).unwrap();

    let (id, plan) = registry.hide(&dom, &p.root, 0).unwrap();
    assert_eq!(id, bound.id);
    assert!(plan.arm.is_none());
    assert!(!dom.classes(p.bar).contains(&config.visible_class));

    let (_, plan) = registry.show(&dom, &p.root, true).unwrap();
    assert!(plan.arm.is_none());
    assert!(dom.classes(p.bar).contains(&config.visible_class));

    assert!(registry.show(&dom, &p.bar, true).is_none());
}
