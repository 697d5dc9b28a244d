//! # Combat Pool Manager
//!
//! The single facade the simulation uses for projectiles and effects.
//!
//! ## Frame order
//!
//! ```text
//! update(dt)
//!   1. projectile behaviour   beam → guided → area → kinetic (expired released)
//!   2. trail feeding          each trail samples its projectile's position
//!   3. effect aging/fading    flash → impact → trail (finished released)
//!   4. tracer decay           released at zero opacity
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut pools = CombatPoolManager::new(&CombatPoolConfig::default(), GuardedRenderer::headless(), 42);
//!
//! let shot = pools.fire(ProjectileKind::Kinetic, muzzle, forward);
//! pools.update(1.0 / 60.0);
//!
//! pools.release_projectile(shot);   // trail (if any) first, then the slug
//! pools.dispose();
//! ```

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starfall_core::{PoolHandle, PoolStats, PoolStatsSnapshot};
use starfall_shared::{Quaternion, Vec3};

use crate::assets::SharedAssets;
use crate::config::CombatPoolConfig;
use crate::effects::{
    Effect, EffectHandle, EffectKind, EffectPool, FlashBehavior, ImpactBehavior, TracerBehavior,
    TrailBehavior,
};
use crate::instance::RenderInstance;
use crate::projectiles::{
    self, AreaBehavior, BeamBehavior, GuidedBehavior, KineticBehavior, Projectile,
    ProjectileHandle, ProjectileKind, ProjectilePool,
};
use crate::scene::GuardedRenderer;

/// Stream id mixed into the seed for kinetic spin.
const KINETIC_STREAM: u64 = 0x4b49_4e45;

/// An active projectile as returned by [`CombatPoolManager::active_projectiles`].
#[derive(Clone, Copy, Debug)]
pub struct ActiveProjectile<'a> {
    /// Handle for release or mutation.
    pub handle: ProjectileHandle,
    /// Current state.
    pub projectile: &'a Projectile,
}

/// Owns every projectile and effect pool plus the shared assets.
pub struct CombatPoolManager {
    renderer: GuardedRenderer,
    assets: SharedAssets,

    beam: ProjectilePool<BeamBehavior>,
    guided: ProjectilePool<GuidedBehavior>,
    area: ProjectilePool<AreaBehavior>,
    kinetic: ProjectilePool<KineticBehavior>,

    flash: EffectPool<FlashBehavior>,
    trail: EffectPool<TrailBehavior>,
    impact: EffectPool<ImpactBehavior>,
    tracer: EffectPool<TracerBehavior>,

    /// Counters shared by all eight pools.
    stats: Arc<PoolStats>,
    /// Seconds of simulated time.
    clock: f64,
    /// Reused buffer for expired handles.
    scratch: Vec<PoolHandle>,
    disposed: bool,
}

impl CombatPoolManager {
    /// Builds the shared assets, then every pool.
    ///
    /// # Arguments
    ///
    /// * `config` - Pool sizes and archetype tuning
    /// * `renderer` - Scene facade (may be headless)
    /// * `seed` - Seed for archetype randomness (kinetic spin)
    #[must_use]
    pub fn new(config: &CombatPoolConfig, mut renderer: GuardedRenderer, seed: u64) -> Self {
        let assets = SharedAssets::new(&mut renderer, config);
        let stats = Arc::new(PoolStats::new());

        let projectile_template = |kind: ProjectileKind| {
            Projectile::template(
                kind,
                config.projectiles.get(kind),
                assets.projectile(kind),
                Some(assets.glow()),
            )
        };
        let effect_template = |kind: EffectKind| {
            let (geometry, material) = assets.effect(kind);
            Effect::template(kind, config.effects.get(kind), geometry, material)
        };
        let sizing = &config.sizing;

        let beam = ProjectilePool::new(
            BeamBehavior,
            projectile_template(ProjectileKind::Beam),
            sizing.beam,
            Arc::clone(&stats),
        );
        let guided = ProjectilePool::new(
            GuidedBehavior,
            projectile_template(ProjectileKind::Guided),
            sizing.guided,
            Arc::clone(&stats),
        );
        let area = ProjectilePool::new(
            AreaBehavior,
            projectile_template(ProjectileKind::Area),
            sizing.area,
            Arc::clone(&stats),
        );
        let kinetic = ProjectilePool::new(
            KineticBehavior::new(ChaCha8Rng::seed_from_u64(seed ^ KINETIC_STREAM)),
            projectile_template(ProjectileKind::Kinetic),
            sizing.kinetic,
            Arc::clone(&stats),
        );
        let flash = EffectPool::new(
            FlashBehavior,
            effect_template(EffectKind::MuzzleFlash),
            sizing.muzzle_flash,
            Arc::clone(&stats),
        );
        let trail = EffectPool::new(
            TrailBehavior,
            effect_template(EffectKind::Trail),
            sizing.trail,
            Arc::clone(&stats),
        );
        let impact = EffectPool::new(
            ImpactBehavior,
            effect_template(EffectKind::Impact),
            sizing.impact,
            Arc::clone(&stats),
        );
        let tracer = EffectPool::new(
            TracerBehavior,
            effect_template(EffectKind::Tracer),
            sizing.tracer,
            Arc::clone(&stats),
        );

        let manager = Self {
            beam,
            guided,
            area,
            kinetic,
            flash,
            trail,
            impact,
            tracer,
            renderer,
            assets,
            stats,
            clock: 0.0,
            scratch: Vec::with_capacity(64),
            disposed: false,
        };

        tracing::info!(
            "combat pools ready ({} projectiles, {} effects pre-warmed)",
            manager.total_projectiles(),
            manager.total_effects()
        );
        manager
    }

    // =========================================================================
    // PROJECTILES
    // =========================================================================

    /// Hands out a projectile of `kind`, attached to the scene.
    ///
    /// After [`CombatPoolManager::dispose`] this returns a handle no pool
    /// accepts and touches neither the pools nor the scene.
    pub fn get_projectile(&mut self, kind: ProjectileKind) -> ProjectileHandle {
        if self.disposed {
            tracing::warn!("{} requested after dispose", kind);
            return ProjectileHandle {
                kind,
                handle: PoolHandle::NULL,
            };
        }
        let now = self.clock;
        let renderer = &mut self.renderer;
        match kind {
            ProjectileKind::Beam => self.beam.acquire(renderer, now),
            ProjectileKind::Guided => self.guided.acquire(renderer, now),
            ProjectileKind::Area => self.area.acquire(renderer, now),
            ProjectileKind::Kinetic => self.kinetic.acquire(renderer, now),
        }
    }

    /// Hands out a projectile by weapon tag (unknown tags become kinetic).
    pub fn get_projectile_by_tag(&mut self, tag: &str) -> ProjectileHandle {
        self.get_projectile(ProjectileKind::from_tag(tag))
    }

    /// Fires a projectile: positions it, aims it, attaches a trail if the
    /// archetype has one and spawns a muzzle flash at `origin`.
    pub fn fire(&mut self, kind: ProjectileKind, origin: Vec3, direction: Vec3) -> ProjectileHandle {
        let handle = self.get_projectile(kind);
        let wants_trail = self.projectile(handle).is_some_and(|p| p.wants_trail);
        let trail = wants_trail.then(|| self.get_effect(EffectKind::Trail));

        if let Some(trail) = trail {
            if let Some(effect) = self.trail.get_mut(trail.handle) {
                effect.push_point(origin);
            }
        }
        if let Some(projectile) = self.projectile_mut(handle) {
            projectile.place(origin);
            projectile.aim(direction);
            projectile.trail = trail;
        }

        let rotation = Quaternion::from_rotation_arc(Vec3::Z, direction.normalize_or(Vec3::Z));
        let flash = self.spawn_effect(EffectKind::MuzzleFlash, origin, 1.0);
        if let Some(effect) = self.effect_mut(flash) {
            effect.transform.rotation = rotation;
        }
        handle
    }

    /// Sets the homing target of a projectile.
    pub fn set_target(&mut self, handle: ProjectileHandle, target: Option<Vec3>) -> bool {
        match self.projectile_mut(handle) {
            Some(projectile) => {
                projectile.target = target;
                true
            }
            None => false,
        }
    }

    /// Bounces a kinetic projectile. `false` means the projectile must be
    /// destroyed (cap reached, wrong archetype or stale handle).
    pub fn ricochet(&mut self, handle: ProjectileHandle, normal: Vec3) -> bool {
        self.projectile_mut(handle)
            .is_some_and(|projectile| projectiles::ricochet(projectile, normal))
    }

    /// Releases a projectile, its trail first.
    ///
    /// Stale handles are a silent no-op.
    pub fn release_projectile(&mut self, handle: ProjectileHandle) -> bool {
        let trail = match self.projectile(handle) {
            Some(projectile) => projectile.trail,
            None => return false,
        };
        if let Some(trail) = trail {
            self.release_effect(trail);
        }

        let renderer = &mut self.renderer;
        match handle.kind {
            ProjectileKind::Beam => self.beam.release(handle.handle, renderer),
            ProjectileKind::Guided => self.guided.release(handle.handle, renderer),
            ProjectileKind::Area => self.area.release(handle.handle, renderer),
            ProjectileKind::Kinetic => self.kinetic.release(handle.handle, renderer),
        }
    }

    /// Releases a projectile through the pool of `kind`.
    ///
    /// A handle from another archetype's pool is a silent no-op.
    pub fn release_projectile_as(&mut self, handle: ProjectileHandle, kind: ProjectileKind) -> bool {
        if handle.kind != kind {
            return false;
        }
        self.release_projectile(handle)
    }

    /// Gets an active projectile.
    #[must_use]
    pub fn projectile(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        match handle.kind {
            ProjectileKind::Beam => self.beam.get(handle.handle),
            ProjectileKind::Guided => self.guided.get(handle.handle),
            ProjectileKind::Area => self.area.get(handle.handle),
            ProjectileKind::Kinetic => self.kinetic.get(handle.handle),
        }
    }

    /// Gets an active projectile mutably.
    pub fn projectile_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        match handle.kind {
            ProjectileKind::Beam => self.beam.get_mut(handle.handle),
            ProjectileKind::Guided => self.guided.get_mut(handle.handle),
            ProjectileKind::Area => self.area.get_mut(handle.handle),
            ProjectileKind::Kinetic => self.kinetic.get_mut(handle.handle),
        }
    }

    /// Every active projectile across all pools, recomputed per call.
    #[must_use]
    pub fn active_projectiles(&self) -> Vec<ActiveProjectile<'_>> {
        fn wrap<'a>(
            kind: ProjectileKind,
        ) -> impl Fn((PoolHandle, &'a Projectile)) -> ActiveProjectile<'a> {
            move |(handle, projectile)| ActiveProjectile {
                handle: ProjectileHandle { kind, handle },
                projectile,
            }
        }

        let mut out = Vec::with_capacity(self.active_projectile_count());
        out.extend(self.beam.iter_active().map(wrap(ProjectileKind::Beam)));
        out.extend(self.guided.iter_active().map(wrap(ProjectileKind::Guided)));
        out.extend(self.area.iter_active().map(wrap(ProjectileKind::Area)));
        out.extend(self.kinetic.iter_active().map(wrap(ProjectileKind::Kinetic)));
        out
    }

    /// Number of active projectiles.
    #[must_use]
    pub const fn active_projectile_count(&self) -> usize {
        self.beam.active_count()
            + self.guided.active_count()
            + self.area.active_count()
            + self.kinetic.active_count()
    }

    /// Projectiles owned across all pools (active + available).
    #[must_use]
    pub fn total_projectiles(&self) -> usize {
        self.beam.total_count()
            + self.guided.total_count()
            + self.area.total_count()
            + self.kinetic.total_count()
    }

    /// Available projectiles in the pool of `kind`.
    #[must_use]
    pub fn available_projectiles(&self, kind: ProjectileKind) -> usize {
        match kind {
            ProjectileKind::Beam => self.beam.available_count(),
            ProjectileKind::Guided => self.guided.available_count(),
            ProjectileKind::Area => self.area.available_count(),
            ProjectileKind::Kinetic => self.kinetic.available_count(),
        }
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Hands out an effect of `kind`, attached to the scene.
    ///
    /// Inert after dispose, like [`CombatPoolManager::get_projectile`].
    pub fn get_effect(&mut self, kind: EffectKind) -> EffectHandle {
        if self.disposed {
            tracing::warn!("{:?} effect requested after dispose", kind);
            return EffectHandle {
                kind,
                handle: PoolHandle::NULL,
            };
        }
        let now = self.clock;
        let renderer = &mut self.renderer;
        match kind {
            EffectKind::MuzzleFlash => self.flash.acquire(renderer, now),
            EffectKind::Trail => self.trail.acquire(renderer, now),
            EffectKind::Impact => self.impact.acquire(renderer, now),
            EffectKind::Tracer => self.tracer.acquire(renderer, now),
        }
    }

    /// Spawns an effect at `position` with a scale multiplier.
    pub fn spawn_effect(&mut self, kind: EffectKind, position: Vec3, scale: f32) -> EffectHandle {
        let handle = self.get_effect(kind);
        if let Some(effect) = self.effect_mut(handle) {
            effect.transform.position = position;
            effect.base_scale *= scale;
            effect.transform.scale = effect.base_scale;
        }
        handle
    }

    /// Spawns an effect by tag (unknown tags become a generic impact).
    pub fn spawn_effect_by_tag(&mut self, tag: &str, position: Vec3, scale: f32) -> EffectHandle {
        self.spawn_effect(EffectKind::from_tag(tag), position, scale)
    }

    /// Spawns a fading tracer from `start` to `end`.
    pub fn spawn_tracer(&mut self, start: Vec3, end: Vec3) -> EffectHandle {
        let handle = self.get_effect(EffectKind::Tracer);
        if let Some(effect) = self.effect_mut(handle) {
            effect.start = start;
            effect.end = end;
            effect.transform.position = start.lerp(end, 0.5);
            effect.transform.scale = start.distance(end);
            effect.transform.rotation =
                Quaternion::from_rotation_arc(Vec3::Z, (end - start).normalize_or(Vec3::Z));
        }
        handle
    }

    /// Releases an effect. Stale handles are a silent no-op.
    pub fn release_effect(&mut self, handle: EffectHandle) -> bool {
        let renderer = &mut self.renderer;
        match handle.kind {
            EffectKind::MuzzleFlash => self.flash.release(handle.handle, renderer),
            EffectKind::Trail => self.trail.release(handle.handle, renderer),
            EffectKind::Impact => self.impact.release(handle.handle, renderer),
            EffectKind::Tracer => self.tracer.release(handle.handle, renderer),
        }
    }

    /// Gets an active effect.
    #[must_use]
    pub fn effect(&self, handle: EffectHandle) -> Option<&Effect> {
        match handle.kind {
            EffectKind::MuzzleFlash => self.flash.get(handle.handle),
            EffectKind::Trail => self.trail.get(handle.handle),
            EffectKind::Impact => self.impact.get(handle.handle),
            EffectKind::Tracer => self.tracer.get(handle.handle),
        }
    }

    /// Gets an active effect mutably.
    pub fn effect_mut(&mut self, handle: EffectHandle) -> Option<&mut Effect> {
        match handle.kind {
            EffectKind::MuzzleFlash => self.flash.get_mut(handle.handle),
            EffectKind::Trail => self.trail.get_mut(handle.handle),
            EffectKind::Impact => self.impact.get_mut(handle.handle),
            EffectKind::Tracer => self.tracer.get_mut(handle.handle),
        }
    }

    /// Number of active effects.
    #[must_use]
    pub const fn active_effect_count(&self) -> usize {
        self.flash.active_count()
            + self.trail.active_count()
            + self.impact.active_count()
            + self.tracer.active_count()
    }

    /// Effects owned across all pools (active + available).
    #[must_use]
    pub fn total_effects(&self) -> usize {
        self.flash.total_count()
            + self.trail.total_count()
            + self.impact.total_count()
            + self.tracer.total_count()
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Advances every pool by `dt` seconds in the fixed frame order.
    pub fn update(&mut self, dt: f32) {
        if self.disposed {
            return;
        }
        self.clock += f64::from(dt);
        let mut expired = std::mem::take(&mut self.scratch);

        // 1. Projectiles
        self.beam.advance(dt, &mut expired);
        self.release_expired(ProjectileKind::Beam, &mut expired);
        self.guided.advance(dt, &mut expired);
        self.release_expired(ProjectileKind::Guided, &mut expired);
        self.area.advance(dt, &mut expired);
        self.release_expired(ProjectileKind::Area, &mut expired);
        self.kinetic.advance(dt, &mut expired);
        self.release_expired(ProjectileKind::Kinetic, &mut expired);

        // 2. Trails follow their projectiles
        self.feed_trails();

        // 3. Effect aging
        self.flash.advance(dt, &mut expired);
        self.release_finished(EffectKind::MuzzleFlash, &mut expired);
        self.impact.advance(dt, &mut expired);
        self.release_finished(EffectKind::Impact, &mut expired);
        self.trail.advance(dt, &mut expired);
        self.release_finished(EffectKind::Trail, &mut expired);

        // 4. Tracers
        self.tracer.advance(dt, &mut expired);
        self.release_finished(EffectKind::Tracer, &mut expired);

        self.scratch = expired;
    }

    fn release_expired(&mut self, kind: ProjectileKind, expired: &mut Vec<PoolHandle>) {
        for handle in expired.drain(..) {
            self.release_projectile(ProjectileHandle { kind, handle });
        }
    }

    fn release_finished(&mut self, kind: EffectKind, finished: &mut Vec<PoolHandle>) {
        for handle in finished.drain(..) {
            self.release_effect(EffectHandle { kind, handle });
        }
    }

    fn feed_trails(&mut self) {
        let trails = &mut self.trail;
        let with_trails = self
            .guided
            .iter_active()
            .chain(self.kinetic.iter_active())
            .chain(self.beam.iter_active())
            .chain(self.area.iter_active());
        for (_, projectile) in with_trails {
            if let Some(trail) = projectile.trail {
                if let Some(effect) = trails.get_mut(trail.handle) {
                    effect.push_point(projectile.position());
                }
            }
        }
    }

    /// Simulated seconds since construction.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Appends one render record per active projectile and effect.
    pub fn instances(&self, out: &mut Vec<RenderInstance>) {
        out.reserve(self.active_projectile_count() + self.active_effect_count());
        out.extend(
            self.active_projectiles()
                .into_iter()
                .map(|active| RenderInstance::from_projectile(active.projectile)),
        );
        for effect in self
            .flash
            .iter_active()
            .chain(self.trail.iter_active())
            .chain(self.impact.iter_active())
            .chain(self.tracer.iter_active())
            .map(|(_, effect)| effect)
        {
            out.push(RenderInstance::from_effect(effect));
        }
    }

    /// Aggregate counters of all eight pools.
    #[must_use]
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }

    /// Scene facade.
    #[must_use]
    pub const fn renderer(&self) -> &GuardedRenderer {
        &self.renderer
    }

    /// Whether [`CombatPoolManager::dispose`] already ran.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Frees shared assets once, each cloned material once, and empties
    /// every pool. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let renderer = &mut self.renderer;
        self.assets.dispose(renderer);

        self.beam.dispose(renderer);
        self.guided.dispose(renderer);
        self.area.dispose(renderer);
        self.kinetic.dispose(renderer);

        self.flash.dispose(renderer);
        self.trail.dispose(renderer);
        self.impact.dispose(renderer);
        self.tracer.dispose(renderer);

        tracing::info!("combat pools disposed");
    }
}

impl Drop for CombatPoolManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for CombatPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatPoolManager")
            .field("active_projectiles", &self.active_projectile_count())
            .field("active_effects", &self.active_effect_count())
            .field("clock", &self.clock)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
