//! Reference-counted identifier pools.
//!
//! Long-lived tables and script functions live in pools and are referred to
//! by a [`PoolId`] (slot index + generation). A [`Handle`] owns one
//! reference: cloning adds a reference, dropping removes one, and the last
//! drop evicts the entry and bumps the slot's generation so stale ids are
//! detected on their next use instead of aliasing a newer entry.
//!
//! Pools are shared across threads: a closure created on one worker may be
//! released on another, so every count update happens under the pool mutex.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;

/// Raw pool identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PoolId {
    index: u32,
    generation: u32,
}

impl PoolId {
    /// Slot index; reused after eviction.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    refs: u32,
    value: Option<Arc<T>>,
}

struct Slots<T> {
    entries: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Slots<T> {
    fn live(&mut self, id: PoolId) -> Option<&mut Slot<T>> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.value.is_some())
    }
}

/// Generation-checked, reference-counted storage.
pub struct IdentifierPool<T> {
    slots: Mutex<Slots<T>>,
}

impl<T> IdentifierPool<T> {
    pub fn new() -> Self {
        IdentifierPool {
            slots: Mutex::new(Slots {
                entries: Vec::new(),
                free: Vec::new(),
            }),
        }
    }

    /// Store a value and return its id. The entry starts with no references;
    /// wrap it in a [`Handle`] to manage its lifetime.
    pub fn add(&self, value: T) -> PoolId {
        let value = Some(Arc::new(value));
        let mut slots = self.slots.lock();
        if let Some(index) = slots.free.pop() {
            let slot = &mut slots.entries[index as usize];
            slot.refs = 0;
            slot.value = value;
            PoolId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(slots.entries.len()).unwrap_or(u32::MAX);
            slots.entries.push(Slot {
                generation: 0,
                refs: 0,
                value,
            });
            PoolId {
                index,
                generation: 0,
            }
        }
    }

    /// Fetch the entry, or `None` if the id is stale.
    pub fn get(&self, id: PoolId) -> Option<Arc<T>> {
        self.slots.lock().live(id).and_then(|slot| slot.value.clone())
    }

    /// Add one reference. Returns false for a stale id.
    pub fn add_reference(&self, id: PoolId) -> bool {
        match self.slots.lock().live(id) {
            Some(slot) => {
                slot.refs = slot.refs.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Remove one reference, evicting the entry when none remain.
    /// Returns false for a stale id or an entry with no references.
    pub fn remove_reference(&self, id: PoolId) -> bool {
        let evicted = {
            let mut slots = self.slots.lock();
            let Some(slot) = slots.live(id) else {
                return false;
            };
            if slot.refs == 0 {
                return false;
            }
            slot.refs -= 1;
            if slot.refs > 0 {
                return true;
            }
            slot.generation = slot.generation.wrapping_add(1);
            let evicted = slot.value.take();
            slots.free.push(id.index);
            evicted
        };
        // Dropping an entry may release handles into this same pool.
        drop(evicted);
        true
    }

    /// Current reference count, or `None` for a stale id.
    pub fn reference_count(&self, id: PoolId) -> Option<u32> {
        self.slots.lock().live(id).map(|slot| slot.refs)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .entries
            .iter()
            .filter(|slot| slot.value.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for IdentifierPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for IdentifierPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierPool")
            .field("live", &self.len())
            .finish()
    }
}

/// Managed reference to a pool entry.
pub struct Handle<T> {
    pool: Arc<IdentifierPool<T>>,
    id: PoolId,
}

impl<T> Handle<T> {
    /// Take a reference to an existing entry. `None` if the id is stale.
    pub fn new(pool: &Arc<IdentifierPool<T>>, id: PoolId) -> Option<Self> {
        pool.add_reference(id).then(|| Handle {
            pool: Arc::clone(pool),
            id,
        })
    }

    /// Store a value and return the first handle to it.
    pub fn insert(pool: &Arc<IdentifierPool<T>>, value: T) -> Self {
        let id = pool.add(value);
        pool.add_reference(id);
        Handle {
            pool: Arc::clone(pool),
            id,
        }
    }

    #[inline]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Fetch the entry. A live handle keeps its entry alive, so this only
    /// fails if the pool was manipulated through raw ids.
    pub fn get(&self) -> Option<Arc<T>> {
        self.pool.get(self.id)
    }

    pub fn pool(&self) -> &Arc<IdentifierPool<T>> {
        &self.pool
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        self.pool.add_reference(self.id);
        Handle {
            pool: Arc::clone(&self.pool),
            id: self.id,
        }
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        self.pool.remove_reference(self.id);
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool) && self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:?})", self.id)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
