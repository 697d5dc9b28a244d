//! # STARFALL Frame Loop
//!
//! One [`CombatSimulation::tick`] per rendered frame:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. SPAWN POINTS                                                     │
//! │    └─ Publish player position, regenerate formation if moved        │
//! │                                                                     │
//! │ 2. DIFFICULTY                                                       │
//! │    ├─ Advance clock, threshold level / endless curve                │
//! │    ├─ Endless: rescale live enemies                                 │
//! │    └─ Timed spawn (capped at max enemies)                           │
//! │                                                                     │
//! │ 3. AI                                                               │
//! │    └─ Detection, kamikaze, separation, movement                     │
//! │                                                                     │
//! │ 4. WEAPONS + HITS                                                   │
//! │    ├─ Auto-fire at the nearest pursuer                              │
//! │    └─ Projectile/enemy overlap, damage, penetration, ricochet       │
//! │                                                                     │
//! │ 5. POOLS                                                            │
//! │    └─ Advance projectiles and effects, release expired              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tick never fails. Anything that goes wrong inside it is logged and
//! skipped.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use starfall_combat::{CombatPoolManager, EffectKind, GuardedRenderer, ProjectileHandle, ProjectileKind};
use starfall_core::{Clearable, PoolRegistry, Resettable};
use starfall_shared::{EnemyId, Vec3, MAX_TICK_DT};

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::events::{EventBus, EventReceiver};
use crate::gameplay::{
    AiState, ArchetypeFactory, DifficultyController, DifficultyMultipliers, EnemyAi,
    EnemyArchetype, EntityFactory, LastKnownPosition, PlayerState, PositionCell, Spawner,
    TrackedPosition,
};

/// Registry key of the per-tick hit list.
pub const HIT_BATCH_POOL: &str = "hit_batch";

/// Registry key of the auto-fire candidate list.
pub const TARGET_SCRATCH_POOL: &str = "target_scratch";

/// Impact scale for an ordinary hit.
const HIT_IMPACT_SCALE: f32 = 1.0;

/// Impact scale for a kill.
const KILL_IMPACT_SCALE: f32 = 2.0;

/// Impact scale for a kamikaze detonation.
const DETONATION_IMPACT_SCALE: f32 = 3.0;

// Random stream ids derived from the config seed.
const FACTORY_STREAM: u64 = 1;
const SPAWNER_STREAM: u64 = 2;
const SIMULATION_STREAM: u64 = 3;

fn stream(seed: u64, id: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(id);
    rng
}

// ============================================================================
// HIT RECORDS
// ============================================================================

/// One projectile overlapping one enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    /// The projectile.
    pub projectile: ProjectileHandle,
    /// Its archetype.
    pub kind: ProjectileKind,
    /// The enemy.
    pub enemy: EnemyId,
    /// Projectile position at contact.
    pub position: Vec3,
    /// Projectile position before its last move.
    pub entry: Vec3,
    /// Enemy position at contact.
    pub enemy_position: Vec3,
    /// Damage carried.
    pub damage: f32,
}

/// Pooled hit list, reused tick to tick through the registry.
#[derive(Debug, Default)]
pub struct HitBatch {
    /// Hits in detection order.
    pub hits: Vec<HitRecord>,
}

impl Resettable<usize> for HitBatch {
    fn reset(&mut self, expected: usize) {
        self.hits.clear();
        self.hits.reserve(expected);
    }
}

impl Clearable for HitBatch {
    fn clear(&mut self) {
        self.hits.clear();
    }
}

/// Squared distance from `point` to the segment `start..end`.
///
/// Projectiles are tested along the path of their last pool update so fast
/// rounds cannot skip over a target. A round fired this frame has not moved
/// yet and is tested at the muzzle only. Only targets ahead of `start`
/// count, so a round moving away from an enemy never hits it again.
fn swept_distance_squared(start: Vec3, end: Vec3, point: Vec3) -> f32 {
    let path = end - start;
    let len_sq = path.length_squared();
    if len_sq <= f32::EPSILON {
        return end.distance_squared(point);
    }
    let t = ((point - start).dot(path) / len_sq).clamp(0.0, 1.0);
    (start + path * t).distance_squared(point)
}

/// Auto-fire candidates: `(distance², id, position)`.
type TargetList = Vec<(f32, EnemyId, Vec3)>;

// ============================================================================
// STATISTICS
// ============================================================================

/// Running totals for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimStats {
    /// Ticks run.
    pub ticks: u64,
    /// Enemies spawned.
    pub spawned: u64,
    /// Enemies killed by projectiles.
    pub kills: u64,
    /// Kamikaze detonations.
    pub detonations: u64,
    /// Shots fired.
    pub shots_fired: u64,
    /// Projectile hits landed.
    pub hits: u64,
    /// Kinetic ricochets.
    pub ricochets: u64,
    /// Damage the player took.
    pub player_damage: f32,
    /// Most enemies alive at once.
    pub peak_enemies: usize,
}

impl SimStats {
    /// Fraction of shots that landed at least once.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        if self.shots_fired == 0 {
            return 0.0;
        }
        self.hits as f64 / self.shots_fired as f64
    }

    /// Prints a summary of the session.
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    COMBAT SIMULATION SUMMARY                     ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ ENEMIES ──────────────────────────────────────────────────────┐");
        println!("│ Ticks:              {}", self.ticks);
        println!("│ Spawned:            {}", self.spawned);
        println!("│ Peak Alive:         {}", self.peak_enemies);
        println!("│ Killed:             {}", self.kills);
        println!("│ Detonated:          {}", self.detonations);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ WEAPONS ──────────────────────────────────────────────────────┐");
        println!("│ Shots Fired:        {}", self.shots_fired);
        println!("│ Hits:               {} ({:.1}% per shot)", self.hits, self.accuracy() * 100.0);
        println!("│ Ricochets:          {}", self.ricochets);
        println!("│ Damage Taken:       {:.1}", self.player_damage);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

// ============================================================================
// SIMULATION
// ============================================================================

/// Owns every combat subsystem and runs them in frame order.
pub struct CombatSimulation {
    config: SimConfig,
    pools: CombatPoolManager,
    registry: PoolRegistry,
    ai: EnemyAi,
    spawner: Spawner,
    factory: ArchetypeFactory,
    difficulty: DifficultyController,
    player: PlayerState,
    player_cell: PositionCell,
    bus: EventBus,
    rng: ChaCha8Rng,
    spawn_timer: f32,
    fire_timer: f32,
    docked: bool,
    stats: SimStats,
}

impl CombatSimulation {
    /// Builds every subsystem from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: SimConfig, renderer: GuardedRenderer) -> SimResult<Self> {
        config.validate()?;

        let bus = EventBus::new(config.simulation.event_capacity);
        let difficulty = DifficultyController::new(config.difficulty.clone(), bus.sender())?;
        let pools = CombatPoolManager::new(&config.pools, renderer, config.seed);

        let mut registry = PoolRegistry::new();
        registry.register(HIT_BATCH_POOL, HitBatch::default, None, 2, 4);
        registry.register::<TargetList, _>(
            TARGET_SCRATCH_POOL,
            Vec::new,
            Some(Box::new(|list: &mut TargetList| list.clear())),
            1,
            2,
        );

        let player = PlayerState::new(&config.player);
        let player_cell = PositionCell::new(Some(player.position));
        let locator = LastKnownPosition::new(TrackedPosition::new(player_cell.clone()));
        let spawner = Spawner::new(
            Box::new(locator),
            config.spawner,
            stream(config.seed, SPAWNER_STREAM),
        );
        let factory = ArchetypeFactory::new(config.archetypes, stream(config.seed, FACTORY_STREAM));
        let ai = EnemyAi::new(config.ai, bus.sender());

        tracing::info!(
            "combat simulation ready (seed {}, {:?} formation, {} difficulty levels)",
            config.seed,
            config.spawner.pattern,
            config.difficulty.thresholds.len()
        );

        Ok(Self {
            rng: stream(config.seed, SIMULATION_STREAM),
            fire_timer: config.simulation.fire_interval,
            config,
            pools,
            registry,
            ai,
            spawner,
            factory,
            difficulty,
            player,
            player_cell,
            bus,
            spawn_timer: 0.0,
            docked: false,
            stats: SimStats::default(),
        })
    }

    /// Runs one frame. `dt` is clamped to [`MAX_TICK_DT`]. A no-op after
    /// [`CombatSimulation::shutdown`].
    pub fn tick(&mut self, dt: f32) {
        if self.pools.is_disposed() {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_TICK_DT)
        } else {
            0.0
        };
        self.stats.ticks += 1;

        // 1. Spawn points
        self.player_cell.set(if self.player.is_destroyed() {
            None
        } else {
            Some(self.player.position)
        });
        self.spawner.generate_spawn_points(false);

        // 2. Difficulty
        let snapshot = self.difficulty.update(dt);
        if self.difficulty.is_endless() {
            self.ai.apply_endless_scaling(&snapshot.multipliers);
        }
        if self.config.simulation.auto_spawn && !self.docked {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 {
                if self.ai.live_count() < snapshot.max_enemies {
                    self.spawn_random(&snapshot.multipliers);
                }
                self.spawn_timer = snapshot.spawn_interval;
            }
        }

        // 3. AI
        let report = self.ai.update(dt, &mut self.player);
        self.stats.detonations += report.detonations as u64;
        self.stats.player_damage += report.player_damage;
        for &position in self.ai.detonations() {
            self.pools
                .spawn_effect(EffectKind::Impact, position, DETONATION_IMPACT_SCALE);
        }

        // 4. Weapons + hits
        if self.config.simulation.auto_fire && !self.docked {
            self.fire_timer -= dt;
            if self.fire_timer <= 0.0 {
                self.auto_fire();
                self.fire_timer = self.config.simulation.fire_interval;
            }
        }
        self.resolve_hits();

        // 5. Pools
        self.pools.update(dt);

        self.stats.peak_enemies = self.stats.peak_enemies.max(self.ai.live_count());
    }

    fn spawn_random(&mut self, multipliers: &DifficultyMultipliers) -> EnemyId {
        let weights = self.config.simulation.archetype_weights;
        let roll = self.rng.gen_range(0..weights.total());
        let enemy = self
            .spawner
            .spawn(&mut self.factory, weights.pick(roll), multipliers);
        self.stats.spawned += 1;
        self.ai.spawn(enemy)
    }

    /// Spawns an enemy at a spawn point with the current difficulty.
    pub fn spawn_enemy(&mut self, archetype: EnemyArchetype) -> EnemyId {
        let multipliers = *self.difficulty.multipliers();
        let enemy = self.spawner.spawn(&mut self.factory, archetype, &multipliers);
        self.stats.spawned += 1;
        self.ai.spawn(enemy)
    }

    /// Spawns an enemy at an explicit position with the current difficulty.
    pub fn spawn_enemy_at(&mut self, archetype: EnemyArchetype, position: Vec3) -> EnemyId {
        let multipliers = *self.difficulty.multipliers();
        let enemy = self.factory.create(archetype, position, &multipliers);
        self.stats.spawned += 1;
        self.ai.spawn(enemy)
    }

    /// Fires from the player's position.
    pub fn fire(&mut self, kind: ProjectileKind, direction: Vec3) -> ProjectileHandle {
        self.stats.shots_fired += 1;
        self.pools.fire(kind, self.player.position, direction)
    }

    fn auto_fire(&mut self) {
        let mut targets = match self.registry.get::<TargetList>(TARGET_SCRATCH_POOL) {
            Ok(list) => list,
            Err(err) => {
                tracing::error!("auto-fire skipped: {}", err);
                return;
            }
        };

        let origin = self.player.position;
        targets.extend(
            self.ai
                .enemies()
                .iter()
                .filter(|e| e.state == AiState::Pursuing)
                .map(|e| (origin.distance_squared(e.position), e.id, e.position)),
        );
        targets.sort_by(|a, b| a.0.total_cmp(&b.0));

        if let Some(&(_, _, position)) = targets.first() {
            let kind = self.config.simulation.weapon;
            let handle = self.fire(kind, position - origin);
            if kind == ProjectileKind::Guided {
                self.pools.set_target(handle, Some(position));
            }
        }

        if let Err(err) = self.registry.release(TARGET_SCRATCH_POOL, targets) {
            tracing::error!("target list not returned: {}", err);
        }
    }

    fn resolve_hits(&mut self) {
        let expected = self.pools.active_projectile_count();
        let mut batch = match self.registry.get_with::<HitBatch, _>(HIT_BATCH_POOL, expected) {
            Ok(batch) => batch,
            Err(err) => {
                tracing::error!("hit resolution skipped: {}", err);
                return;
            }
        };

        for active in self.pools.active_projectiles() {
            let projectile = active.projectile;
            let budget = projectile.penetration as usize + 1;
            let start = projectile.previous_position;
            let end = projectile.position();
            let hits = self
                .ai
                .enemies()
                .iter()
                .filter(|e| e.is_live() && (e.position - start).dot(end - start) >= 0.0)
                .filter(|e| {
                    let reach = projectile.radius + e.collision_radius;
                    swept_distance_squared(start, end, e.position) <= reach * reach
                })
                .take(budget)
                .map(|e| HitRecord {
                    projectile: active.handle,
                    kind: projectile.kind,
                    enemy: e.id,
                    position: end,
                    entry: start,
                    enemy_position: e.position,
                    damage: projectile.damage,
                });
            batch.hits.extend(hits);
        }

        for hit in &batch.hits {
            if self.pools.projectile(hit.projectile).is_none() {
                continue;
            }
            let Some(result) = self.ai.apply_damage(hit.enemy, hit.damage) else {
                continue;
            };
            self.stats.hits += 1;

            if result.killed {
                self.stats.kills += 1;
                self.pools
                    .spawn_effect(EffectKind::Impact, hit.enemy_position, KILL_IMPACT_SCALE);
            } else {
                self.pools
                    .spawn_effect(EffectKind::Impact, hit.position, HIT_IMPACT_SCALE);
            }

            // Kinetic rounds glance off shields instead of spending penetration.
            // The bounce starts from where the round was before its last move.
            if hit.kind == ProjectileKind::Kinetic && result.shield_absorbed > 0.0 && !result.killed {
                let normal = hit.entry - hit.enemy_position;
                if self.pools.ricochet(hit.projectile, normal) {
                    if let Some(p) = self.pools.projectile_mut(hit.projectile) {
                        p.place(hit.entry);
                    }
                    self.stats.ricochets += 1;
                    continue;
                }
            }

            let spent = match self.pools.projectile_mut(hit.projectile) {
                Some(p) if p.penetration > 0 => {
                    p.penetration -= 1;
                    false
                }
                Some(_) => true,
                None => false,
            };
            if spent {
                self.pools.release_projectile(hit.projectile);
            }
        }

        if let Err(err) = self.registry.release_clearable(HIT_BATCH_POOL, batch) {
            tracing::error!("hit batch not returned: {}", err);
        }
    }

    // ========================================================================
    // Session control
    // ========================================================================

    /// Docks or undocks. Docking freezes AI, spawning and auto-fire; enemies
    /// stay where they are.
    pub fn set_docked(&mut self, docked: bool) {
        self.docked = docked;
        self.ai.set_frozen(docked);
    }

    /// Whether the player is docked.
    #[must_use]
    pub const fn is_docked(&self) -> bool {
        self.docked
    }

    /// Switches difficulty to endless mode (one way).
    pub fn enter_endless(&mut self) -> bool {
        self.difficulty.enter_endless()
    }

    /// Moves the player.
    pub fn set_player_position(&mut self, position: Vec3) {
        self.player.position = position;
    }

    /// Removes every enemy and projectile (trails go with them) and empties
    /// the scratch pools. Remaining effects fade out on their own. The
    /// simulation can keep ticking afterwards.
    pub fn reset_scene(&mut self) {
        self.ai.despawn_all();
        let handles: Vec<ProjectileHandle> = self
            .pools
            .active_projectiles()
            .into_iter()
            .map(|a| a.handle)
            .collect();
        for handle in handles {
            self.pools.release_projectile(handle);
        }
        self.registry.clear_all();
        self.spawner.generate_spawn_points(true);
        tracing::info!("combat scene reset");
    }

    /// Frees every pooled resource. Idempotent.
    pub fn shutdown(&mut self) {
        if self.pools.is_disposed() {
            return;
        }
        self.ai.despawn_all();
        self.registry.clear_all();
        self.pools.dispose();
        tracing::info!(
            "combat simulation shut down after {} ticks",
            self.stats.ticks
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// A new receiver on the event bus.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.bus.receiver()
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &PlayerState {
        &self.player
    }

    /// The AI engine.
    #[must_use]
    pub const fn ai(&self) -> &EnemyAi {
        &self.ai
    }

    /// The pool manager.
    #[must_use]
    pub const fn pools(&self) -> &CombatPoolManager {
        &self.pools
    }

    /// The pool manager, mutably.
    pub fn pools_mut(&mut self) -> &mut CombatPoolManager {
        &mut self.pools
    }

    /// The scratch registry.
    #[must_use]
    pub const fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// The spawner.
    #[must_use]
    pub const fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// The difficulty controller.
    #[must_use]
    pub const fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    /// Session totals.
    #[must_use]
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }
}

impl Drop for CombatSimulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for CombatSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatSimulation")
            .field("ai", &self.ai)
            .field("difficulty", &self.difficulty)
            .field("docked", &self.docked)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationSettings;
    use crate::events::CombatEvent;

    fn quiet_config() -> SimConfig {
        SimConfig {
            simulation: SimulationSettings {
                auto_fire: false,
                auto_spawn: false,
                ..SimulationSettings::default()
            },
            ..SimConfig::default()
        }
    }

    fn sim(config: SimConfig) -> CombatSimulation {
        CombatSimulation::new(config, GuardedRenderer::headless()).expect("valid config")
    }

    #[test]
    fn test_beam_kills_swift() {
        let mut sim = sim(quiet_config());
        let id = sim.spawn_enemy_at(EnemyArchetype::Swift, Vec3::new(0.0, 0.0, 60.0));
        sim.fire(ProjectileKind::Beam, Vec3::Z);

        for _ in 0..30 {
            sim.tick(1.0 / 60.0);
        }
        assert!(sim.ai().get(id).is_none());
        assert_eq!(sim.stats().kills, 1);
        assert_eq!(sim.stats().detonations, 0);
    }

    #[test]
    fn test_docking_freezes_everything() {
        let mut config = quiet_config();
        config.simulation.auto_spawn = true;
        let mut sim = sim(config);
        sim.tick(1.0 / 60.0);
        let spawned = sim.stats().spawned;
        assert_eq!(spawned, 1);

        sim.set_docked(true);
        let before: Vec<_> = sim.ai().enemies().iter().map(|e| e.position).collect();
        for _ in 0..600 {
            sim.tick(1.0 / 60.0);
        }
        let after: Vec<_> = sim.ai().enemies().iter().map(|e| e.position).collect();
        assert_eq!(before, after);
        assert_eq!(sim.stats().spawned, spawned);

        sim.set_docked(false);
        sim.tick(1.0 / 60.0);
        assert!(sim.ai().enemies().iter().all(|e| e.state == AiState::Pursuing));
    }

    #[test]
    fn test_same_seed_same_session() {
        let run = || {
            let mut sim = sim(SimConfig {
                seed: 11,
                ..SimConfig::default()
            });
            for _ in 0..900 {
                sim.tick(1.0 / 60.0);
            }
            (
                *sim.stats(),
                sim.ai().enemies().iter().map(|e| e.position).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_scratch_pools_are_recycled() {
        let mut sim = sim(SimConfig::default());
        for _ in 0..120 {
            sim.tick(1.0 / 60.0);
        }
        assert_eq!(sim.registry().available(HIT_BATCH_POOL).ok(), Some(2));
        assert_eq!(sim.registry().available(TARGET_SCRATCH_POOL).ok(), Some(1));
        let stats = sim.registry().stats(HIT_BATCH_POOL).expect("registered");
        assert!(stats.hits >= 119);
    }

    #[test]
    fn test_swept_distance() {
        let start = Vec3::ZERO;
        let end = Vec3::new(0.0, 0.0, 10.0);
        assert!((swept_distance_squared(start, end, Vec3::new(1.0, 0.0, 5.0)) - 1.0).abs() < 1e-6);
        assert!((swept_distance_squared(start, end, Vec3::new(0.0, 0.0, 12.0)) - 4.0).abs() < 1e-5);
        assert!((swept_distance_squared(end, end, Vec3::ZERO) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_oversized_dt_is_clamped() {
        let mut sim = sim(quiet_config());
        let id = sim.spawn_enemy_at(EnemyArchetype::Heavy, Vec3::new(0.0, 0.0, 500.0));
        sim.tick(10.0);
        let z = sim.ai().get(id).map(|e| e.position.z).unwrap_or_default();
        // One clamped step at 48 u/s.
        assert!((z - (500.0 - 48.0 * MAX_TICK_DT)).abs() < 1e-3);
        assert!((sim.difficulty().elapsed() - MAX_TICK_DT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut sim = sim(SimConfig::default());
        sim.tick(1.0 / 60.0);
        sim.shutdown();
        sim.shutdown();
        assert!(sim.pools().is_disposed());
        assert_eq!(sim.ai().live_count(), 0);
    }

    #[test]
    fn test_tick_after_shutdown_does_nothing() {
        let mut sim = sim(SimConfig::default());
        for _ in 0..60 {
            sim.tick(1.0 / 60.0);
        }
        sim.shutdown();
        let stats = *sim.stats();
        let elapsed = sim.difficulty().elapsed();

        for _ in 0..600 {
            sim.tick(1.0 / 60.0);
        }
        assert_eq!(*sim.stats(), stats);
        assert!((sim.difficulty().elapsed() - elapsed).abs() < f32::EPSILON);
        assert_eq!(sim.ai().live_count(), 0);
        assert_eq!(sim.pools().total_projectiles(), 0);
        assert_eq!(sim.pools().total_effects(), 0);
    }

    #[test]
    fn test_no_hit_behind_the_muzzle() {
        let mut sim = sim(quiet_config());
        let events = sim.events();
        // Docked: the enemy stays put and cannot detonate.
        sim.set_docked(true);
        let behind = sim.spawn_enemy_at(EnemyArchetype::Swift, Vec3::new(0.0, 0.0, -10.0));
        events.drain();

        sim.fire(ProjectileKind::Beam, Vec3::Z);
        for _ in 0..30 {
            sim.tick(1.0 / 60.0);
        }

        assert_eq!(sim.stats().hits, 0);
        assert!(sim.ai().get(behind).is_some());
        assert!(!events
            .drain()
            .iter()
            .any(|e| matches!(e, CombatEvent::EntityDamaged { .. })));
    }

    #[test]
    fn test_first_move_is_swept() {
        let mut sim = sim(quiet_config());
        sim.set_docked(true);
        sim.spawn_enemy_at(EnemyArchetype::Swift, Vec3::new(0.0, 0.0, 10.0));
        sim.fire(ProjectileKind::Beam, Vec3::Z);

        // Still at the muzzle, out of reach.
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.stats().hits, 0);

        // The 0 -> 13.3 move passes through the enemy, the next one is past it.
        sim.tick(1.0 / 60.0);
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.stats().hits, 1);
    }
}
