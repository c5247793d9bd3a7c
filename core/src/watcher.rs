//! Page-wide change watcher
//!
//! Host-independent half of the mutation subscription. The host owns the actual
//! observer (a `MutationObserver` in the browser, the mutation log of
//! [`MemoryDom`](crate::dom::MemoryDom) in tests) and feeds every notification
//! batch through [`ChangeWatcher::admit`], which decides whether the batch
//! warrants a reconciliation pass.
//!
//! Lifecycle is start-only in normal operation: `Idle -> Observing`, with
//! `stop()` available so tests can halt the loop deterministically.

use unveil_types::FixConfig;

/// Kind of a single DOM mutation record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Children added or removed
    ChildList,
    /// Attribute changed (lowercase name)
    Attribute(String),
}

/// What the page-wide subscription covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub child_list: bool,
    pub subtree: bool,
    /// Attribute names that count; empty means no attribute records
    pub attribute_filter: Vec<String>,
}

impl WatchOptions {
    pub fn from_config(config: &FixConfig) -> Self {
        Self {
            child_list: true,
            subtree: true,
            attribute_filter: config
                .watched_attributes
                .iter()
                .map(|a| a.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn watches_attributes(&self) -> bool {
        !self.attribute_filter.is_empty()
    }

    pub fn accepts(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attribute(name) => self.attribute_filter.iter().any(|a| a == name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Observing,
    Stopped,
}

/// Subscription state plus batch accounting.
#[derive(Debug)]
pub struct ChangeWatcher {
    options: WatchOptions,
    state: WatchState,
    batches: u64,
}

impl ChangeWatcher {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            state: WatchState::Idle,
            batches: 0,
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn is_observing(&self) -> bool {
        self.state == WatchState::Observing
    }

    /// Begin observing. Returns false if the watcher was already started, so the
    /// host subscribes exactly once.
    pub fn start(&mut self) -> bool {
        if self.state != WatchState::Idle {
            return false;
        }
        self.state = WatchState::Observing;
        tracing::debug!(options = ?self.options, "change watcher started");
        true
    }

    pub fn stop(&mut self) {
        if self.state == WatchState::Observing {
            tracing::debug!(batches = self.batches, "change watcher stopped");
        }
        self.state = WatchState::Stopped;
    }

    /// Decide whether a notification batch triggers a reconciliation pass.
    ///
    /// One pass per batch no matter how many records it carries; batches with
    /// no accepted record, and batches arriving while not observing, are dropped.
    pub fn admit<'a, I>(&mut self, batch: I) -> bool
    where
        I: IntoIterator<Item = &'a MutationKind>,
    {
        if !self.is_observing() {
            return false;
        }
        if !batch.into_iter().any(|kind| self.options.accepts(kind)) {
            return false;
        }
        self.batches += 1;
        true
    }

    /// Batches admitted since start
    pub fn batches(&self) -> u64 {
        self.batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str) -> MutationKind {
        MutationKind::Attribute(name.to_string())
    }

    #[test]
    fn options_follow_config() {
        let options = WatchOptions::from_config(&FixConfig::default());
        assert!(options.child_list && options.subtree);
        assert!(options.accepts(&MutationKind::ChildList));
        assert!(options.accepts(&attr("style")));
        assert!(options.accepts(&attr("class")));
        assert!(!options.accepts(&attr("src")));
    }

    #[test]
    fn batches_are_ignored_until_started() {
        let mut watcher = ChangeWatcher::new(WatchOptions::from_config(&FixConfig::default()));
        assert!(!watcher.admit(&[MutationKind::ChildList]));

        assert!(watcher.start());
        assert!(!watcher.start());
        assert!(watcher.admit(&[MutationKind::ChildList, attr("style")]));
        assert_eq!(watcher.batches(), 1);
    }

    #[test]
    fn filtered_batches_do_not_count() {
        let mut watcher = ChangeWatcher::new(WatchOptions::from_config(&FixConfig::default()));
        watcher.start();
        assert!(!watcher.admit(&[attr("aria-hidden"), attr("src")]));
        assert!(!watcher.admit(&[]));
        assert_eq!(watcher.batches(), 0);
    }

    #[test]
    fn stop_is_final() {
        let mut watcher = ChangeWatcher::new(WatchOptions::from_config(&FixConfig::default()));
        watcher.start();
        watcher.stop();
        assert_eq!(watcher.state(), WatchState::Stopped);
        assert!(!watcher.start());
        assert!(!watcher.admit(&[MutationKind::ChildList]));
    }
}
