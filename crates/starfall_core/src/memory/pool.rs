//! # Object Pool
//!
//! Recycling allocator for objects that are acquired and released many times
//! per second.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::stats::PoolStats;

/// Source of unique pool ids. Handles carry the id of the pool that issued
/// them, so a handle released into the wrong pool is rejected.
static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

fn next_pool_id() -> u32 {
    NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed)
}

/// Handle to an object currently handed out by an [`ObjectPool`].
///
/// The generation is bumped on every release, so a handle kept past its
/// release never reaches the recycled object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Id of the issuing pool.
    pool_id: u32,
    /// Slot index.
    index: u32,
    /// Slot generation at the time of `get`.
    generation: u32,
}

impl PoolHandle {
    /// A handle no pool will ever accept.
    pub const NULL: Self = Self {
        pool_id: 0,
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Id of the pool that issued this handle.
    #[inline]
    #[must_use]
    pub const fn pool_id(self) -> u32 {
        self.pool_id
    }

    /// Slot index inside the issuing pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// One stored object plus its bookkeeping.
struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

/// A growable pool of reusable objects.
///
/// Every object owned by the pool is either *available* (on the free list)
/// or *active* (handed out through a [`PoolHandle`]), never both.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is driven from the single simulation tick.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = ObjectPool::new(Vec::<f32>::new, Vec::clear, 32, 8);
///
/// let handle = pool.get();            // never fails, grows if empty
/// pool.get_mut(handle).unwrap().push(1.0);
///
/// assert!(pool.release(handle));      // reset + back to available
/// assert!(!pool.release(handle));     // second release is a no-op
/// ```
pub struct ObjectPool<T> {
    /// Id stamped into every issued handle.
    id: u32,
    /// Object storage. Slots are never removed until disposal.
    slots: Vec<Slot<T>>,
    /// Free list - indices of available slots.
    available: Vec<u32>,
    /// Number of active objects.
    active_count: usize,
    /// Builds a new object in its default state.
    factory: Box<dyn FnMut() -> T>,
    /// Restores an object to its default state on release.
    reset: Box<dyn FnMut(&mut T)>,
    /// Objects constructed each time the pool runs dry.
    expand_size: usize,
    /// Hit/miss counters, possibly shared with other pools.
    stats: Arc<PoolStats>,
}

impl<T> ObjectPool<T> {
    /// Creates a pool and pre-warms it with `initial_size` objects.
    ///
    /// # Arguments
    ///
    /// * `factory` - Builds a fresh object
    /// * `reset` - Restores a released object to its default state
    /// * `initial_size` - Objects constructed up front
    /// * `expand_size` - Objects constructed whenever the pool runs dry (minimum 1)
    pub fn new<F, R>(factory: F, reset: R, initial_size: usize, expand_size: usize) -> Self
    where
        F: FnMut() -> T + 'static,
        R: FnMut(&mut T) + 'static,
    {
        Self::with_stats(
            factory,
            reset,
            initial_size,
            expand_size,
            Arc::new(PoolStats::new()),
        )
    }

    /// Creates a pool that reports into an existing [`PoolStats`].
    pub fn with_stats<F, R>(
        factory: F,
        reset: R,
        initial_size: usize,
        expand_size: usize,
        stats: Arc<PoolStats>,
    ) -> Self
    where
        F: FnMut() -> T + 'static,
        R: FnMut(&mut T) + 'static,
    {
        let mut pool = Self {
            id: next_pool_id(),
            slots: Vec::with_capacity(initial_size),
            available: Vec::with_capacity(initial_size),
            active_count: 0,
            factory: Box::new(factory),
            reset: Box::new(reset),
            expand_size: expand_size.max(1),
            stats,
        };
        pool.expand(initial_size);
        // Lowest slot first, like a fresh free list.
        pool.available.reverse();
        pool
    }

    /// Id stamped into handles issued by this pool.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Number of active objects.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of available objects.
    #[inline]
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Total objects owned (active + available).
    #[inline]
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Objects constructed each time the pool runs dry.
    #[inline]
    #[must_use]
    pub const fn expand_size(&self) -> usize {
        self.expand_size
    }

    /// Counters this pool reports into.
    #[must_use]
    pub fn stats(&self) -> &Arc<PoolStats> {
        &self.stats
    }

    fn push_new_slot(&mut self) -> u32 {
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        let value = (self.factory)();
        self.slots.push(Slot {
            value,
            generation: 0,
            active: false,
        });
        index
    }

    /// Eagerly constructs `count` objects and adds them to the available list.
    pub fn expand(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.slots.reserve(count);
        self.available.reserve(count);
        for _ in 0..count {
            let index = self.push_new_slot();
            self.available.push(index);
        }
        self.stats.record_created(count as u64);
        tracing::debug!(
            "pool {} expanded by {} (total {})",
            self.id,
            count,
            self.slots.len()
        );
    }

    /// Hands out an available object, growing the pool first if none is left.
    ///
    /// This never fails. Growth is linear (`expand_size` per miss) to bound
    /// burst memory.
    pub fn get(&mut self) -> PoolHandle {
        let index = if let Some(index) = self.available.pop() {
            self.stats.record_hit();
            index
        } else {
            self.stats.record_miss();
            // One of the new objects is handed out directly.
            self.expand(self.expand_size - 1);
            self.stats.record_created(1);
            self.push_new_slot()
        };

        let slot = &mut self.slots[index as usize];
        slot.active = true;
        self.active_count += 1;

        PoolHandle {
            pool_id: self.id,
            index,
            generation: slot.generation,
        }
    }

    fn live_slot(&self, handle: PoolHandle) -> Option<&Slot<T>> {
        if handle.pool_id != self.id {
            return None;
        }
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
    }

    fn live_slot_mut(&mut self, handle: PoolHandle) -> Option<&mut Slot<T>> {
        if handle.pool_id != self.id {
            return None;
        }
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
    }

    /// Returns an object to the pool.
    ///
    /// Returns `false` (and changes nothing) when the handle is not currently
    /// active in this pool: double releases, stale handles and handles from
    /// other pools are all ignored.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        if !self.is_active(handle) {
            return false;
        }

        let slot = &mut self.slots[handle.index as usize];
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        (self.reset)(&mut slot.value);

        self.available.push(handle.index);
        self.active_count -= 1;
        self.stats.record_release();
        true
    }

    /// Checks whether `handle` refers to an active object of this pool.
    #[inline]
    #[must_use]
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.live_slot(handle).is_some()
    }

    /// Gets a reference to an active object.
    #[inline]
    #[must_use]
    pub fn get_ref(&self, handle: PoolHandle) -> Option<&T> {
        self.live_slot(handle).map(|slot| &slot.value)
    }

    /// Gets a mutable reference to an active object.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.live_slot_mut(handle).map(|slot| &mut slot.value)
    }

    fn handle_for(&self, index: usize, slot: &Slot<T>) -> PoolHandle {
        PoolHandle {
            pool_id: self.id,
            index: u32::try_from(index).unwrap_or(u32::MAX),
            generation: slot.generation,
        }
    }

    /// Iterates over all active objects in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (self.handle_for(index, slot), &slot.value))
    }

    /// Iterates mutably over all active objects in slot order.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        let id = self.id;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, slot)| {
                (
                    PoolHandle {
                        pool_id: id,
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        generation: slot.generation,
                    },
                    &mut slot.value,
                )
            })
    }

    /// Appends the handles of all active objects to `out`.
    ///
    /// Lets callers collect release candidates into a reused buffer.
    pub fn active_handles_into(&self, out: &mut Vec<PoolHandle>) {
        out.extend(self.iter_active().map(|(handle, _)| handle));
    }

    /// Tears the pool down, passing every object (active or available) to
    /// `teardown` exactly once.
    ///
    /// Handles issued before disposal are stale afterwards, even if the pool
    /// is used again.
    pub fn dispose_with<D>(&mut self, mut teardown: D)
    where
        D: FnMut(T),
    {
        let disposed = self.slots.len();
        for slot in self.slots.drain(..) {
            teardown(slot.value);
        }
        self.available.clear();
        self.active_count = 0;
        self.id = next_pool_id();
        tracing::debug!("pool disposed ({} objects)", disposed);
    }

    /// Drops every object. See [`ObjectPool::dispose_with`].
    pub fn dispose(&mut self) {
        self.dispose_with(drop);
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("active", &self.active_count)
            .field("available", &self.available.len())
            .field("expand_size", &self.expand_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn counter_pool(initial: usize, expand: usize) -> ObjectPool<u32> {
        ObjectPool::new(|| 0, |v| *v = 0, initial, expand)
    }

    #[test]
    fn test_pool_prewarm() {
        let pool = counter_pool(10, 4);
        assert_eq!(pool.available_count(), 10);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.total_count(), 10);
    }

    #[test]
    fn test_pool_get_release() {
        let mut pool = counter_pool(2, 1);

        let h1 = pool.get();
        *pool.get_mut(h1).unwrap() = 42;
        assert_eq!(*pool.get_ref(h1).unwrap(), 42);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.available_count(), 1);

        assert!(pool.release(h1));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available_count(), 2);
    }

    #[test]
    fn test_pool_reuse_resets_value() {
        let mut pool = counter_pool(1, 1);

        let h1 = pool.get();
        *pool.get_mut(h1).unwrap() = 99;
        pool.release(h1);

        let h2 = pool.get();
        assert_eq!(h1.index(), h2.index()); // Same slot reused
        assert_ne!(h1.generation(), h2.generation());
        assert_eq!(*pool.get_ref(h2).unwrap(), 0);
    }

    #[test]
    fn test_empty_pool_expands_linearly() {
        let mut pool = counter_pool(0, 5);

        let h = pool.get();
        assert!(pool.is_active(h));
        assert_eq!(pool.total_count(), 5);
        assert_eq!(pool.available_count(), 4);

        for _ in 0..4 {
            let _ = pool.get();
        }
        assert_eq!(pool.available_count(), 0);
        let _ = pool.get();
        assert_eq!(pool.total_count(), 10);

        let snap = pool.stats().snapshot();
        assert_eq!(snap.misses, 2);
        assert_eq!(snap.hits, 4);
        assert_eq!(snap.created, 10);
    }

    #[test]
    fn test_zero_expand_size_still_grows() {
        let mut pool = counter_pool(0, 0);
        let h = pool.get();
        assert!(pool.is_active(h));
        assert_eq!(pool.total_count(), 1);
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool = counter_pool(3, 1);
        let h = pool.get();

        assert!(pool.release(h));
        let available = pool.available_count();
        assert!(!pool.release(h));
        assert_eq!(pool.available_count(), available);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_stale_handle_cannot_touch_reused_object() {
        let mut pool = counter_pool(1, 1);
        let stale = pool.get();
        pool.release(stale);

        let fresh = pool.get();
        *pool.get_mut(fresh).unwrap() = 7;

        assert!(pool.get_ref(stale).is_none());
        assert!(!pool.release(stale));
        assert!(pool.is_active(fresh));
        assert_eq!(*pool.get_ref(fresh).unwrap(), 7);
    }

    #[test]
    fn test_foreign_handle_is_ignored() {
        let mut a = counter_pool(2, 1);
        let mut b = counter_pool(2, 1);
        let ha = a.get();
        let _hb = b.get();

        assert!(!b.release(ha));
        assert_eq!(b.active_count(), 1);
        assert!(a.is_active(ha));
        assert!(!b.release(PoolHandle::NULL));
    }

    #[test]
    fn test_partition_invariant_over_random_sequence() {
        let mut pool = counter_pool(4, 3);
        let mut held: Vec<PoolHandle> = Vec::new();
        let mut seed = 0x2545_F491_u32;

        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if seed % 3 == 0 && !held.is_empty() {
                let victim = held.swap_remove(seed as usize % held.len());
                assert!(pool.release(victim));
            } else {
                held.push(pool.get());
            }

            // Disjoint and complete.
            let active: HashSet<u32> = pool.iter_active().map(|(h, _)| h.index()).collect();
            let available: HashSet<u32> = pool.available.iter().copied().collect();
            assert!(active.is_disjoint(&available));
            assert_eq!(active.len() + available.len(), pool.total_count());
            assert_eq!(active.len(), held.len());
            for h in &held {
                assert!(pool.is_active(*h));
            }
        }
    }

    #[test]
    fn test_dispose_visits_every_object_once() {
        let mut pool = ObjectPool::new(|| 1u32, |_| {}, 6, 2);
        let _a = pool.get();
        let b = pool.get();
        pool.release(b);

        let mut visited = 0;
        pool.dispose_with(|v| visited += v);
        assert_eq!(visited, 6);
        assert_eq!(pool.total_count(), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available_count(), 0);
    }

    #[test]
    fn test_handles_stale_after_dispose_and_reuse() {
        let mut pool = counter_pool(1, 1);
        let old = pool.get();
        pool.dispose();

        let new = pool.get();
        assert_eq!(old.index(), new.index());
        assert!(!pool.is_active(old));
        assert!(pool.is_active(new));
    }

    #[test]
    fn test_shared_stats_aggregate() {
        let stats = Arc::new(PoolStats::new());
        let mut a = ObjectPool::with_stats(|| 0u8, |_| {}, 1, 1, Arc::clone(&stats));
        let mut b = ObjectPool::with_stats(|| 0u8, |_| {}, 1, 1, Arc::clone(&stats));
        let _ = a.get();
        let _ = b.get();
        let _ = b.get();
        let snap = stats.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);
    }
}
