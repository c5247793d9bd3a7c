pub mod config;
pub mod controls;
pub mod dom;
pub mod media;
pub mod overlay;
pub mod reconciler;
pub mod selector;
pub mod stylesheet;
pub mod timers;
pub mod watcher;


// Re-exports for convenience
pub use config::{ConfigError, Fingerprints, load_config};
pub use controls::{
    BindingId, ControlBarMachine, ControlBinding, ControlEvent, ControlRegistry, Listener,
    ListenerRole, MediaEvent, NewBinding, Visibility,
};
pub use dom::{Dom, MemoryDom, NodeId, StyleDecl};
pub use media::{MediaReinforcer, MediaReport};
pub use overlay::{OverlayNeutralizer, OverlayReport};
pub use reconciler::{OverlayFix, Reconciliation};
pub use selector::{SelectorError, SelectorList};
pub use stylesheet::{InstallOutcome, StyleSheetInstaller, render_css};
pub use timers::{TimerPlan, TimerToken, VirtualTimers};
pub use watcher::{ChangeWatcher, MutationKind, WatchOptions, WatchState};
pub use unveil_types::{ControlTiming, FixConfig};
