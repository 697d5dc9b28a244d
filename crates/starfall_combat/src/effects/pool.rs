//! Pool of one effect archetype.

use std::sync::Arc;

use starfall_core::{ObjectPool, PoolHandle, PoolStats};

use super::{Effect, EffectBehavior, EffectHandle};
use crate::config::PoolSizing;
use crate::scene::{GuardedRenderer, NodeId, NodePart, SceneNode};

/// Pool of effects of archetype `B::KIND`.
pub struct EffectPool<B: EffectBehavior> {
    pool: ObjectPool<Effect>,
    behavior: B,
}

impl<B: EffectBehavior> EffectPool<B> {
    /// Creates the pool and pre-warms it.
    pub fn new(behavior: B, template: Effect, sizing: PoolSizing, stats: Arc<PoolStats>) -> Self {
        debug_assert_eq!(template.kind, B::KIND);
        let reset_template = template.clone();
        let pool = ObjectPool::with_stats(
            move || template.clone(),
            move |effect: &mut Effect| effect.reset_from(&reset_template),
            sizing.initial,
            sizing.expand,
            stats,
        );
        Self { pool, behavior }
    }

    /// Hands out an effect and attaches it to the scene.
    ///
    /// The object's material clone is created on its first use.
    pub fn acquire(&mut self, renderer: &mut GuardedRenderer, now: f64) -> EffectHandle {
        let handle = self.pool.get();
        if let Some(effect) = self.pool.get_mut(handle) {
            if effect.material_instance.is_none() {
                effect.material_instance = Some(renderer.clone_material(effect.material));
            }
            effect.active = true;
            effect.created_at = now;
            renderer.add(&SceneNode {
                id: NodeId::for_handle(handle, NodePart::Body),
                geometry: effect.geometry,
                material: effect.draw_material(),
            });
        }
        EffectHandle {
            kind: B::KIND,
            handle,
        }
    }

    /// Detaches an effect and returns it to the pool.
    pub fn release(&mut self, handle: PoolHandle, renderer: &mut GuardedRenderer) -> bool {
        if !self.pool.is_active(handle) {
            return false;
        }
        renderer.remove(NodeId::for_handle(handle, NodePart::Body));
        self.pool.release(handle)
    }

    /// Gets an active effect.
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&Effect> {
        self.pool.get_ref(handle)
    }

    /// Gets an active effect mutably.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut Effect> {
        self.pool.get_mut(handle)
    }

    /// Animates every active effect and appends finished ones to `finished`.
    pub fn advance(&mut self, dt: f32, finished: &mut Vec<PoolHandle>) {
        let behavior = &mut self.behavior;
        for (handle, effect) in self.pool.iter_active_mut() {
            if !behavior.advance(effect, dt) {
                finished.push(handle);
            }
        }
    }

    /// Iterates over active effects.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &Effect)> {
        self.pool.iter_active()
    }

    /// Active effects.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Available effects.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.pool.available_count()
    }

    /// Total effects owned.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.pool.total_count()
    }

    /// Detaches active effects, then disposes every object's material
    /// clone exactly once.
    pub fn dispose(&mut self, renderer: &mut GuardedRenderer) {
        for (handle, _) in self.pool.iter_active() {
            renderer.remove(NodeId::for_handle(handle, NodePart::Body));
        }
        self.pool.dispose_with(|effect| {
            if let Some(clone) = effect.material_instance {
                renderer.dispose_material(clone);
            }
        });
    }
}

impl<B: EffectBehavior> std::fmt::Debug for EffectPool<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectPool")
            .field("kind", &B::KIND)
            .field("pool", &self.pool)
            .finish()
    }
}
