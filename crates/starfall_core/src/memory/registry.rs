//! # Pool Registry
//!
//! Named free-lists for small ad-hoc object kinds (scratch vectors, hit
//! records, debris chunks). Unlike [`super::ObjectPool`], objects are moved
//! out on `get` and moved back on `release`; the registry only keeps what is
//! available, capped at a per-key maximum.

use std::any::{type_name, Any};
use std::collections::HashMap;

use super::stats::{PoolStats, PoolStatsSnapshot};
use crate::error::{PoolError, PoolResult};

/// Objects that know how to reset themselves on reuse.
///
/// `Args` carries per-acquisition parameters (spawn position, owner id, ...).
pub trait Resettable<Args = ()> {
    /// Restores the object to a fresh state configured by `args`.
    fn reset(&mut self, args: Args);
}

/// Objects that know how to clear themselves when returned.
pub trait Clearable {
    /// Drops any per-use state.
    fn clear(&mut self);
}

/// Pool-level reset applied when the object type has no reset of its own.
pub type ResetFn<T> = Box<dyn FnMut(&mut T)>;

/// One registered free-list.
struct KeyedPool<T> {
    available: Vec<T>,
    factory: Box<dyn FnMut() -> T>,
    reset: Option<ResetFn<T>>,
    max_size: usize,
    stats: PoolStats,
}

impl<T> KeyedPool<T> {
    /// Pops an available object or builds one. Returns `(object, was_hit)`.
    fn take(&mut self) -> (T, bool) {
        if let Some(obj) = self.available.pop() {
            self.stats.record_hit();
            (obj, true)
        } else {
            self.stats.record_miss();
            self.stats.record_created(1);
            ((self.factory)(), false)
        }
    }

    /// Pushes `obj` back if under capacity. Returns whether it was kept.
    fn put_back(&mut self, obj: T) -> bool {
        if self.available.len() < self.max_size {
            self.available.push(obj);
            self.stats.record_release();
            true
        } else {
            self.stats.record_dropped();
            false
        }
    }
}

/// Type-erased view used for key-level operations.
trait ErasedPool {
    fn clear(&mut self);
    fn available(&self) -> usize;
    fn snapshot(&self) -> PoolStatsSnapshot;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedPool for KeyedPool<T> {
    fn clear(&mut self) {
        self.available.clear();
    }

    fn available(&self) -> usize {
        self.available.len()
    }

    fn snapshot(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A keyed collection of named pools with shared statistics.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = PoolRegistry::new();
/// registry.register("hits", Vec::<u32>::new, Some(Box::new(|v: &mut Vec<u32>| v.clear())), 8, 32);
///
/// let mut scratch: Vec<u32> = registry.get("hits")?;
/// scratch.push(3);
/// registry.release("hits", scratch)?;
///
/// // Unknown keys fail loudly.
/// assert!(registry.get::<Vec<u32>>("nope").is_err());
/// ```
#[derive(Default)]
pub struct PoolRegistry {
    pools: HashMap<String, Box<dyn ErasedPool>>,
    global: PoolStats,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pool under `key`.
    ///
    /// Idempotent: if `key` is already registered the existing pool is left
    /// untouched and `false` is returned.
    ///
    /// # Arguments
    ///
    /// * `key` - Type key
    /// * `factory` - Builds a new object when the pool is empty
    /// * `reset` - Pool-level reset, applied on `get` and `release`
    /// * `preallocate` - Objects built up front (capped at `max_size`)
    /// * `max_size` - Available objects kept at most; use `usize::MAX` for no cap
    pub fn register<T, F>(
        &mut self,
        key: &str,
        mut factory: F,
        reset: Option<ResetFn<T>>,
        preallocate: usize,
        max_size: usize,
    ) -> bool
    where
        T: 'static,
        F: FnMut() -> T + 'static,
    {
        if self.pools.contains_key(key) {
            return false;
        }

        let count = preallocate.min(max_size);
        let stats = PoolStats::new();
        stats.record_created(count as u64);
        self.global.record_created(count as u64);

        let available: Vec<T> = (0..count).map(|_| factory()).collect();
        let pool = KeyedPool {
            available,
            factory: Box::new(factory),
            reset,
            max_size,
            stats,
        };
        self.pools.insert(key.to_owned(), Box::new(pool));
        tracing::debug!("registered pool `{}` ({} preallocated)", key, count);
        true
    }

    /// Checks whether `key` is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pools.contains_key(key)
    }

    fn typed_mut<T: 'static>(&mut self, key: &str) -> PoolResult<&mut KeyedPool<T>> {
        let Some(erased) = self.pools.get_mut(key) else {
            tracing::error!("pool `{}` is not registered", key);
            return Err(PoolError::Unregistered {
                key: key.to_owned(),
            });
        };
        erased
            .as_any_mut()
            .downcast_mut::<KeyedPool<T>>()
            .ok_or_else(|| {
                tracing::error!("pool `{}` does not hold `{}`", key, type_name::<T>());
                PoolError::TypeMismatch {
                    key: key.to_owned(),
                    requested: type_name::<T>(),
                }
            })
    }

    fn record_global(&self, hit: bool) {
        if hit {
            self.global.record_hit();
        } else {
            self.global.record_miss();
            self.global.record_created(1);
        }
    }

    /// Pulls (or builds) an object and applies the pool-level reset.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered or holds another type.
    pub fn get<T: 'static>(&mut self, key: &str) -> PoolResult<T> {
        let pool = self.typed_mut::<T>(key)?;
        let (mut obj, hit) = pool.take();
        if let Some(reset) = pool.reset.as_mut() {
            reset(&mut obj);
        }
        self.record_global(hit);
        Ok(obj)
    }

    /// Pulls (or builds) an object and applies its own [`Resettable`] reset,
    /// passing `args` through. The pool-level reset is not used.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered or holds another type.
    pub fn get_with<T, A>(&mut self, key: &str, args: A) -> PoolResult<T>
    where
        T: Resettable<A> + 'static,
    {
        let pool = self.typed_mut::<T>(key)?;
        let (mut obj, hit) = pool.take();
        obj.reset(args);
        self.record_global(hit);
        Ok(obj)
    }

    /// Returns an object after applying the pool-level reset.
    ///
    /// Returns `Ok(false)` when the pool is at capacity and the object was
    /// dropped instead.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered or holds another type.
    pub fn release<T: 'static>(&mut self, key: &str, mut obj: T) -> PoolResult<bool> {
        let pool = self.typed_mut::<T>(key)?;
        if let Some(reset) = pool.reset.as_mut() {
            reset(&mut obj);
        }
        let kept = pool.put_back(obj);
        self.record_put(kept);
        Ok(kept)
    }

    /// Returns an object after calling its own [`Clearable::clear`], which
    /// takes precedence over the pool-level reset.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered or holds another type.
    pub fn release_clearable<T>(&mut self, key: &str, mut obj: T) -> PoolResult<bool>
    where
        T: Clearable + 'static,
    {
        let pool = self.typed_mut::<T>(key)?;
        obj.clear();
        let kept = pool.put_back(obj);
        self.record_put(kept);
        Ok(kept)
    }

    fn record_put(&self, kept: bool) {
        if kept {
            self.global.record_release();
        } else {
            self.global.record_dropped();
        }
    }

    /// Truncates the available list of `key` without any disposal.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered.
    pub fn clear(&mut self, key: &str) -> PoolResult<()> {
        let pool = self.pools.get_mut(key).ok_or_else(|| PoolError::Unregistered {
            key: key.to_owned(),
        })?;
        pool.clear();
        Ok(())
    }

    /// Truncates every available list. Used on scene resets, not shutdown.
    pub fn clear_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.clear();
        }
    }

    /// Number of available objects under `key`.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered.
    pub fn available(&self, key: &str) -> PoolResult<usize> {
        self.pools
            .get(key)
            .map(|pool| pool.available())
            .ok_or_else(|| PoolError::Unregistered {
                key: key.to_owned(),
            })
    }

    /// Counters for a single key.
    ///
    /// # Errors
    ///
    /// Fails if `key` is unregistered.
    pub fn stats(&self, key: &str) -> PoolResult<PoolStatsSnapshot> {
        self.pools
            .get(key)
            .map(|pool| pool.snapshot())
            .ok_or_else(|| PoolError::Unregistered {
                key: key.to_owned(),
            })
    }

    /// Counters across every key.
    #[must_use]
    pub fn global_stats(&self) -> PoolStatsSnapshot {
        self.global.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Debris {
        position: [f32; 3],
        mass: f32,
        cleared: bool,
    }

    impl Resettable<([f32; 3], f32)> for Debris {
        fn reset(&mut self, (position, mass): ([f32; 3], f32)) {
            self.position = position;
            self.mass = mass;
        }
    }

    impl Clearable for Debris {
        fn clear(&mut self) {
            self.mass = 0.0;
            self.cleared = true;
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = PoolRegistry::new();
        assert!(registry.register("debris", Debris::default, None, 4, 16));
        assert!(!registry.register("debris", Debris::default, None, 10, 1));
        assert_eq!(registry.available("debris").unwrap(), 4);
    }

    #[test]
    fn test_unregistered_key_fails_loudly() {
        let mut registry = PoolRegistry::new();
        let err = registry.get::<Debris>("missing").unwrap_err();
        assert_eq!(
            err,
            PoolError::Unregistered {
                key: "missing".into()
            }
        );
        assert!(registry.release("missing", Debris::default()).is_err());
        assert!(registry.clear("missing").is_err());
    }

    #[test]
    fn test_type_mismatch_fails_loudly() {
        let mut registry = PoolRegistry::new();
        registry.register("debris", Debris::default, None, 1, 4);
        assert!(matches!(
            registry.get::<u32>("debris"),
            Err(PoolError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_capacity_cap_drops_excess() {
        let mut registry = PoolRegistry::new();
        let n = 8;
        registry.register("debris", Debris::default, None, 0, n);

        for _ in 0..n + 5 {
            let _ = registry.release("debris", Debris::default()).unwrap();
        }
        assert_eq!(registry.available("debris").unwrap(), n);
        assert_eq!(registry.stats("debris").unwrap().dropped, 5);
    }

    #[test]
    fn test_pool_level_reset_applies() {
        let mut registry = PoolRegistry::new();
        registry.register(
            "scratch",
            Vec::<u32>::new,
            Some(Box::new(|v: &mut Vec<u32>| v.clear())),
            0,
            usize::MAX,
        );

        let mut v: Vec<u32> = registry.get("scratch").unwrap();
        v.extend([1, 2, 3]);
        registry.release("scratch", v).unwrap();

        let v: Vec<u32> = registry.get("scratch").unwrap();
        assert!(v.is_empty());
        assert!(v.capacity() >= 3);
    }

    #[test]
    fn test_own_reset_receives_arguments() {
        let mut registry = PoolRegistry::new();
        registry.register("debris", Debris::default, None, 1, 4);

        let d: Debris = registry.get_with("debris", ([1.0, 2.0, 3.0], 9.0)).unwrap();
        assert_eq!(d.position, [1.0, 2.0, 3.0]);
        assert!((d.mass - 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_own_clear_preferred_on_release() {
        let mut registry = PoolRegistry::new();
        registry.register(
            "debris",
            Debris::default,
            Some(Box::new(|d: &mut Debris| d.mass = -1.0)),
            0,
            4,
        );

        let d = Debris {
            mass: 5.0,
            ..Debris::default()
        };
        assert!(registry.release_clearable("debris", d).unwrap());
        let back: Debris = registry.get_with("debris", ([0.0; 3], 1.0)).unwrap();
        assert!(back.cleared);
        assert_eq!(registry.stats("debris").unwrap().hits, 1);
    }

    #[test]
    fn test_clear_all_truncates_without_touching_registration() {
        let mut registry = PoolRegistry::new();
        registry.register("a", Debris::default, None, 3, 8);
        registry.register("b", || 0u64, None, 5, 8);

        registry.clear_all();
        assert_eq!(registry.available("a").unwrap(), 0);
        assert_eq!(registry.available("b").unwrap(), 0);
        assert!(registry.contains("a"));
        let _: u64 = registry.get("b").unwrap();
    }

    #[test]
    fn test_global_stats_span_keys() {
        let mut registry = PoolRegistry::new();
        registry.register("a", Debris::default, None, 1, 8);
        registry.register("b", || 0u64, None, 0, 8);

        let _: Debris = registry.get("a").unwrap();
        let _: u64 = registry.get("b").unwrap();
        let global = registry.global_stats();
        assert_eq!(global.hits, 1);
        assert_eq!(global.misses, 1);
    }
}
