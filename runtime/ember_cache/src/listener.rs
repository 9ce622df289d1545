//! Load completion listeners.
//!
//! A listener is told once per completed load of the track it waits on.
//! Callbacks run outside the cache's locks so they may call back into the
//! cache; a listener set that is mid-notification remembers removals so a
//! listener removed while its batch is firing is not put back afterwards.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashSet;

use crate::ids::ScriptId;

/// Handle used to remove a listener before it fires.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ListenerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// What happened to the track.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LoadOutcome {
    Loaded,
    /// The load failed; the track stays unloaded and may be retried.
    Failed,
    /// A compiled function was removed from the script.
    Unloaded,
}

/// Returned by a callback to stay registered for later loads (hot reload)
/// or to drop out.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ListenerResult {
    Keep,
    Remove,
}

type Callback = Box<dyn FnMut(ScriptId, LoadOutcome) -> ListenerResult + Send>;

/// A registered completion callback.
pub struct LoadListener {
    id: ListenerId,
    callback: Callback,
}

impl LoadListener {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(ScriptId, LoadOutcome) -> ListenerResult + Send + 'static,
    {
        LoadListener {
            id: ListenerId::next(),
            callback: Box::new(callback),
        }
    }

    /// A listener that removes itself after its first notification.
    pub fn once<F>(callback: F) -> Self
    where
        F: FnOnce(ScriptId, LoadOutcome) + Send + 'static,
    {
        let mut callback = Some(callback);
        Self::new(move |script, outcome| {
            if let Some(callback) = callback.take() {
                callback(script, outcome);
            }
            ListenerResult::Remove
        })
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Run the callback; `None` when it asked to be removed.
    pub(crate) fn notify(mut self, script: ScriptId, outcome: LoadOutcome) -> Option<Self> {
        match (self.callback)(script, outcome) {
            ListenerResult::Keep => Some(self),
            ListenerResult::Remove => None,
        }
    }
}

impl fmt::Debug for LoadListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadListener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Listeners waiting on one track.
#[derive(Debug, Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<LoadListener>,
    firing: usize,
    removed: FxHashSet<ListenerId>,
}

impl ListenerSet {
    pub(crate) fn push(&mut self, listener: LoadListener) {
        self.listeners.push(listener);
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        if let Some(pos) = self.listeners.iter().position(|l| l.id == id) {
            self.listeners.swap_remove(pos);
            return true;
        }
        if self.firing > 0 {
            self.removed.insert(id);
        }
        false
    }

    /// Take the current listeners for notification.
    pub(crate) fn begin_fire(&mut self) -> Vec<LoadListener> {
        self.firing += 1;
        std::mem::take(&mut self.listeners)
    }

    /// Put back the listeners that asked to stay, minus any removed while
    /// they were firing.
    pub(crate) fn end_fire(&mut self, kept: Vec<LoadListener>) {
        let removed = &self.removed;
        self.listeners
            .extend(kept.into_iter().filter(|l| !removed.contains(&l.id)));
        self.firing = self.firing.saturating_sub(1);
        if self.firing == 0 {
            self.removed.clear();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Notify every listener in `batch`; returns the ones that stay.
pub(crate) fn notify_all(
    batch: Vec<LoadListener>,
    script: ScriptId,
    outcome: LoadOutcome,
) -> Vec<LoadListener> {
    batch
        .into_iter()
        .filter_map(|listener| listener.notify(script, outcome))
        .collect()
}
