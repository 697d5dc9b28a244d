//! Pool of one projectile archetype.

use std::sync::Arc;

use starfall_core::{ObjectPool, PoolHandle, PoolStats};

use super::{Projectile, ProjectileBehavior, ProjectileHandle};
use crate::config::PoolSizing;
use crate::scene::{GuardedRenderer, NodeId, NodePart, SceneNode};

/// Pool of projectiles of archetype `B::KIND`.
///
/// Acquiring attaches the projectile's nodes to the scene, releasing
/// detaches them and overwrites the projectile with the archetype template.
pub struct ProjectilePool<B: ProjectileBehavior> {
    pool: ObjectPool<Projectile>,
    behavior: B,
}

impl<B: ProjectileBehavior> ProjectilePool<B> {
    /// Creates the pool and pre-warms it.
    ///
    /// # Arguments
    ///
    /// * `behavior` - Archetype motion
    /// * `template` - Inactive projectile every object starts from
    /// * `sizing` - Pre-allocation and growth step
    /// * `stats` - Counters shared with the other combat pools
    pub fn new(behavior: B, template: Projectile, sizing: PoolSizing, stats: Arc<PoolStats>) -> Self {
        debug_assert_eq!(template.kind, B::KIND);
        let pool = ObjectPool::with_stats(
            move || template,
            move |projectile: &mut Projectile| *projectile = template,
            sizing.initial,
            sizing.expand,
            stats,
        );
        Self { pool, behavior }
    }

    /// Hands out a projectile and attaches it to the scene.
    pub fn acquire(&mut self, renderer: &mut GuardedRenderer, now: f64) -> ProjectileHandle {
        let handle = self.pool.get();
        if let Some(projectile) = self.pool.get_mut(handle) {
            projectile.active = true;
            projectile.created_at = now;
            self.behavior.on_acquire(projectile);
            attach(renderer, handle, projectile);
        }
        ProjectileHandle {
            kind: B::KIND,
            handle,
        }
    }

    /// Detaches a projectile and returns it to the pool.
    ///
    /// Returns `false` for handles that are not active in this pool.
    pub fn release(&mut self, handle: PoolHandle, renderer: &mut GuardedRenderer) -> bool {
        let Some(projectile) = self.pool.get_ref(handle) else {
            return false;
        };
        detach(renderer, handle, projectile);
        self.pool.release(handle)
    }

    /// Gets an active projectile.
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&Projectile> {
        self.pool.get_ref(handle)
    }

    /// Gets an active projectile mutably.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut Projectile> {
        self.pool.get_mut(handle)
    }

    /// Moves every active projectile and appends the expired ones to `expired`.
    ///
    /// Expired projectiles are NOT released here; the manager owns the
    /// release order (trail first).
    pub fn advance(&mut self, dt: f32, expired: &mut Vec<PoolHandle>) {
        let behavior = &mut self.behavior;
        for (handle, projectile) in self.pool.iter_active_mut() {
            projectile.age += dt;
            projectile.previous_position = projectile.transform.position;
            behavior.advance(projectile, dt);
            if projectile.is_expired() {
                expired.push(handle);
            }
        }
    }

    /// Iterates over active projectiles.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &Projectile)> {
        self.pool.iter_active()
    }

    /// Active projectiles.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Available projectiles.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.pool.available_count()
    }

    /// Total projectiles owned.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.pool.total_count()
    }

    /// Behaviour driving this archetype.
    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    /// Detaches every active projectile and drops all objects.
    ///
    /// Projectiles only reference shared resources, which the manager
    /// disposes separately.
    pub fn dispose(&mut self, renderer: &mut GuardedRenderer) {
        for (handle, projectile) in self.pool.iter_active() {
            detach(renderer, handle, projectile);
        }
        self.pool.dispose();
    }
}

fn attach(renderer: &mut GuardedRenderer, handle: PoolHandle, projectile: &Projectile) {
    renderer.add(&SceneNode {
        id: NodeId::for_handle(handle, NodePart::Body),
        geometry: projectile.geometry,
        material: projectile.material,
    });
    if let Some((geometry, material)) = projectile.glow {
        renderer.add(&SceneNode {
            id: NodeId::for_handle(handle, NodePart::Glow),
            geometry,
            material,
        });
    }
}

fn detach(renderer: &mut GuardedRenderer, handle: PoolHandle, projectile: &Projectile) {
    renderer.remove(NodeId::for_handle(handle, NodePart::Body));
    if projectile.glow.is_some() {
        renderer.remove(NodeId::for_handle(handle, NodePart::Glow));
    }
}

impl<B: ProjectileBehavior> std::fmt::Debug for ProjectilePool<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectilePool")
            .field("kind", &B::KIND)
            .field("pool", &self.pool)
            .finish()
    }
}
