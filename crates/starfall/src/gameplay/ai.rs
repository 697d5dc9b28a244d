//! # Enemy AI Engine
//!
//! Drives every live enemy once per tick:
//!
//! 1. Detection - `Dormant -> Pursuing` once the player is inside range
//! 2. Kamikaze - `Pursuing -> KamikazeTriggered -> Removed` inside melee range
//! 3. Separation - pairwise repulsion between live enemies
//! 4. Movement - archetype profile blended with separation
//!
//! ## Movement profiles
//!
//! ```text
//! Standard   dir * speed + right * sin(t*f + p) * A'     A' = A * min(1, d / near)
//! Heavy      dir * speed * 0.6
//! Swift      dir * speed * 1.5 + right * sin(t*f*3 + p) * A
//! ```
//!
//! `right = normalize(dir × up)`, falling back to +X when `dir ∥ up`.
//!
//! Once detected an enemy never loses the player. Docking freezes the
//! engine without touching any enemy.

use serde::{Deserialize, Serialize};
use starfall_shared::{EnemyId, EntityRef, Vec3, FALLBACK_RIGHT, WORLD_UP};

use super::difficulty::DifficultyMultipliers;
use super::enemy::{AiState, Enemy, EnemyArchetype, EnemyDamage};
use super::player::PlayerState;
use super::separation::{accumulate_brute_force, SeparationBody, SpatialGrid};
use crate::events::{CombatEvent, DestroyCause, EventSender};

// ============================================================================
// MOVEMENT CONSTANTS
// ============================================================================

/// Heavy pursuit speed as a fraction of base speed.
pub const HEAVY_SPEED_FACTOR: f32 = 0.6;

/// Swift pursuit speed as a multiple of base speed.
pub const SWIFT_SPEED_FACTOR: f32 = 1.5;

/// Swift zigzag frequency as a multiple of the archetype frequency.
pub const SWIFT_ZIGZAG_FREQUENCY: f32 = 3.0;

/// Upper bound on how much separation may steer an enemy. Must stay below
/// 0.5 so pursuit always dominates.
pub const MAX_SEPARATION_INFLUENCE: f32 = 0.4;

/// Tunables shared by every enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Distance at which a pursuing enemy detonates.
    pub melee_distance: f32,
    /// Below this distance the spiral amplitude shrinks linearly to zero.
    pub near_threshold: f32,
    /// Pair threshold multiplier on summed collision radii.
    pub separation_factor: f32,
    /// Separation force to steering influence.
    pub separation_gain: f32,
    /// Use the spatial grid instead of the all-pairs loop.
    pub use_spatial_grid: bool,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            melee_distance: 30.0,
            near_threshold: 200.0,
            separation_factor: 1.5,
            separation_gain: 0.5,
            use_spatial_grid: true,
        }
    }
}

// ============================================================================
// MOVEMENT MATH
// ============================================================================

/// Lateral axis for spiral and zigzag offsets.
#[inline]
#[must_use]
pub fn lateral_right(direction: Vec3) -> Vec3 {
    direction.cross(WORLD_UP).normalize_or(FALLBACK_RIGHT)
}

/// Signed spiral offset of a standard enemy.
///
/// # Arguments
///
/// * `time_alive` - Seconds since spawn
/// * `frequency` - Radians per second
/// * `phase` - Per-enemy phase
/// * `amplitude` - Undamped offset
/// * `distance` - Current distance to the player
/// * `near_threshold` - Damping starts below this distance
#[inline]
#[must_use]
pub fn spiral_offset(
    time_alive: f32,
    frequency: f32,
    phase: f32,
    amplitude: f32,
    distance: f32,
    near_threshold: f32,
) -> f32 {
    let damping = if near_threshold > 0.0 && distance < near_threshold {
        (distance / near_threshold).max(0.0)
    } else {
        1.0
    };
    (time_alive * frequency + phase).sin() * amplitude * damping
}

/// Pursuit velocity and forward speed for an enemy's archetype.
fn profile_velocity(enemy: &Enemy, direction: Vec3, distance: f32, near: f32) -> (Vec3, f32) {
    match enemy.archetype {
        EnemyArchetype::Standard => {
            let offset = spiral_offset(
                enemy.time_alive,
                enemy.frequency,
                enemy.phase,
                enemy.amplitude,
                distance,
                near,
            );
            (
                direction * enemy.speed + lateral_right(direction) * offset,
                enemy.speed,
            )
        }
        EnemyArchetype::Heavy => {
            let speed = enemy.speed * HEAVY_SPEED_FACTOR;
            (direction * speed, speed)
        }
        EnemyArchetype::Swift => {
            let speed = enemy.speed * SWIFT_SPEED_FACTOR;
            let zigzag = (enemy.time_alive * enemy.frequency * SWIFT_ZIGZAG_FREQUENCY + enemy.phase)
                .sin()
                * enemy.amplitude;
            (
                direction * speed + lateral_right(direction) * zigzag,
                speed,
            )
        }
    }
}

/// Blends separation into a pursuit velocity.
///
/// Influence grows with the force magnitude and is capped at
/// [`MAX_SEPARATION_INFLUENCE`].
#[inline]
#[must_use]
pub fn blend_separation(pursuit: Vec3, forward_speed: f32, force: Vec3, gain: f32) -> Vec3 {
    let Some(push) = force.try_normalize() else {
        return pursuit;
    };
    let influence = (force.length() * gain).min(MAX_SEPARATION_INFLUENCE);
    pursuit * (1.0 - influence) + push * (forward_speed * influence)
}

// ============================================================================
// ENGINE
// ============================================================================

/// Summary of one [`EnemyAi::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AiFrameReport {
    /// Enemies that noticed the player this frame.
    pub detections: usize,
    /// Kamikaze detonations this frame.
    pub detonations: usize,
    /// Damage dealt to the player this frame.
    pub player_damage: f32,
}

/// Owns and drives all enemies.
pub struct EnemyAi {
    enemies: Vec<Enemy>,
    next_id: u32,
    tuning: AiTuning,
    frozen: bool,
    grid: SpatialGrid,
    bodies: Vec<SeparationBody>,
    owners: Vec<usize>,
    forces: Vec<Vec3>,
    detonations: Vec<Vec3>,
    events: EventSender,
}

impl EnemyAi {
    /// Creates an empty engine.
    #[must_use]
    pub fn new(tuning: AiTuning, events: EventSender) -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
            tuning,
            frozen: false,
            grid: SpatialGrid::new(),
            bodies: Vec::new(),
            owners: Vec::new(),
            forces: Vec::new(),
            detonations: Vec::new(),
            events,
        }
    }

    /// Takes ownership of `enemy` and assigns its id.
    pub fn spawn(&mut self, mut enemy: Enemy) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        enemy.id = id;
        enemy.state = AiState::Dormant;
        self.events.send(CombatEvent::EntitySpawned {
            entity: EntityRef::Enemy(id),
            archetype: enemy.archetype,
            position: enemy.position,
        });
        self.enemies.push(enemy);
        id
    }

    /// Advances every enemy by `dt`.
    ///
    /// Does nothing while frozen.
    pub fn update(&mut self, dt: f32, player: &mut PlayerState) -> AiFrameReport {
        let mut report = AiFrameReport::default();
        self.detonations.clear();
        if self.frozen {
            return report;
        }

        let melee_sq = self.tuning.melee_distance * self.tuning.melee_distance;

        // Detection + kamikaze
        for enemy in &mut self.enemies {
            if !enemy.is_live() {
                continue;
            }
            enemy.time_alive += dt;
            let d2 = player.position.distance_squared(enemy.position);

            if enemy.state == AiState::Dormant
                && d2 < enemy.detection_range * enemy.detection_range
            {
                enemy.state = AiState::Pursuing;
                report.detections += 1;
            }

            if enemy.state == AiState::Pursuing && d2 < melee_sq {
                enemy.state = AiState::KamikazeTriggered;
                let hit = player.apply_damage(enemy.kamikaze_damage);
                report.detonations += 1;
                report.player_damage += hit.shield_absorbed + hit.hull_damage;
                self.detonations.push(enemy.position);

                tracing::debug!("{} detonated on player", enemy.id);
                self.events.send(CombatEvent::EntityDamaged {
                    entity: EntityRef::Player,
                    amount: enemy.kamikaze_damage,
                    shield_absorbed: hit.shield_absorbed,
                    remaining: player.hull,
                });
                self.events.send(CombatEvent::EntityDestroyed {
                    entity: EntityRef::Enemy(enemy.id),
                    position: enemy.position,
                    cause: DestroyCause::Kamikaze,
                });
                enemy.state = AiState::Removed;
            }
        }

        self.accumulate_separation();

        // Movement
        let near = self.tuning.near_threshold;
        let gain = self.tuning.separation_gain;
        for enemy in &mut self.enemies {
            if enemy.state != AiState::Pursuing {
                continue;
            }
            let to_player = player.position - enemy.position;
            let Some(direction) = to_player.try_normalize() else {
                continue;
            };
            let distance = to_player.length();
            let (pursuit, forward_speed) = profile_velocity(enemy, direction, distance, near);
            enemy.velocity = blend_separation(pursuit, forward_speed, enemy.separation, gain);
            enemy.position += enemy.velocity * dt;
            enemy.face_velocity();
        }

        self.enemies.retain(|e| e.state != AiState::Removed);
        report
    }

    fn accumulate_separation(&mut self) {
        self.bodies.clear();
        self.owners.clear();
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.separation = Vec3::ZERO;
            if enemy.is_live() {
                self.bodies.push(SeparationBody {
                    position: enemy.position,
                    radius: enemy.collision_radius,
                });
                self.owners.push(index);
            }
        }

        let factor = self.tuning.separation_factor;
        if self.tuning.use_spatial_grid {
            self.grid.accumulate(&self.bodies, factor, &mut self.forces);
        } else {
            accumulate_brute_force(&self.bodies, factor, &mut self.forces);
        }

        for (&owner, &force) in self.owners.iter().zip(&self.forces) {
            self.enemies[owner].separation = force;
        }
    }

    /// Applies projectile damage to a live enemy.
    ///
    /// A kill removes the enemy immediately. Returns `None` for unknown or
    /// already-removed ids.
    pub fn apply_damage(&mut self, id: EnemyId, amount: f32) -> Option<EnemyDamage> {
        let index = self
            .enemies
            .iter()
            .position(|e| e.id == id && e.is_live())?;
        let enemy = &mut self.enemies[index];
        let hit = enemy.take_damage(amount);

        self.events.send(CombatEvent::EntityDamaged {
            entity: EntityRef::Enemy(id),
            amount,
            shield_absorbed: hit.shield_absorbed,
            remaining: hit.remaining,
        });

        if hit.killed {
            let position = enemy.position;
            self.enemies.remove(index);
            self.events.send(CombatEvent::EntityDestroyed {
                entity: EntityRef::Enemy(id),
                position,
                cause: DestroyCause::Projectile,
            });
        }
        Some(hit)
    }

    /// Reapplies endless-mode multipliers to every live enemy.
    pub fn apply_endless_scaling(&mut self, multipliers: &DifficultyMultipliers) {
        for enemy in self.enemies.iter_mut().filter(|e| e.is_live()) {
            enemy.rescale(multipliers);
        }
    }

    /// Freezes or resumes processing (docking).
    pub fn set_frozen(&mut self, frozen: bool) {
        if self.frozen != frozen {
            tracing::debug!("enemy AI {}", if frozen { "frozen" } else { "resumed" });
        }
        self.frozen = frozen;
    }

    /// Whether processing is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Removes every enemy without damage.
    pub fn despawn_all(&mut self) {
        for enemy in self.enemies.drain(..) {
            self.events.send(CombatEvent::EntityDestroyed {
                entity: EntityRef::Enemy(enemy.id),
                position: enemy.position,
                cause: DestroyCause::Despawned,
            });
        }
    }

    /// All enemies.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Looks up an enemy by id.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Enemies still in play.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_live()).count()
    }

    /// Positions of last frame's detonations.
    #[must_use]
    pub fn detonations(&self) -> &[Vec3] {
        &self.detonations
    }

    /// Current tuning.
    #[must_use]
    pub const fn tuning(&self) -> &AiTuning {
        &self.tuning
    }
}

impl std::fmt::Debug for EnemyAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyAi")
            .field("enemies", &self.enemies.len())
            .field("next_id", &self.next_id)
            .field("frozen", &self.frozen)
            .field("tuning", &self.tuning)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, EventReceiver};
    use crate::gameplay::enemy::ArchetypeTable;

    fn engine() -> (EnemyAi, EventReceiver) {
        let bus = EventBus::new(256);
        (EnemyAi::new(AiTuning::default(), bus.sender()), bus.receiver())
    }

    fn enemy(archetype: EnemyArchetype, position: Vec3) -> Enemy {
        Enemy::new(
            archetype,
            position,
            *ArchetypeTable::default().get(archetype),
            &DifficultyMultipliers::default(),
            0.3,
        )
    }

    #[test]
    fn test_spiral_offset_formula() {
        for &(t, f, p, a) in &[(0.0, 2.0, 0.3, 40.0), (1.7, 2.5, 1.1, 12.0), (9.0, 0.5, 4.0, 3.0)] {
            let offset = spiral_offset(t, f, p, a, 500.0, 200.0);
            let expected = (t * f + p).sin().abs() * a;
            assert!((offset.abs() - expected).abs() < 1e-5);
        }
        // Damped to half at half the near threshold, zero on top of the player.
        let full = spiral_offset(1.0, 2.0, 0.0, 40.0, 500.0, 200.0);
        let half = spiral_offset(1.0, 2.0, 0.0, 40.0, 100.0, 200.0);
        assert!((half - full * 0.5).abs() < 1e-5);
        assert!(spiral_offset(1.0, 2.0, 0.0, 40.0, 0.0, 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_lateral_right_fallback() {
        assert_eq!(lateral_right(WORLD_UP), FALLBACK_RIGHT);
        assert_eq!(lateral_right(-WORLD_UP), FALLBACK_RIGHT);
        let right = lateral_right(Vec3::Z);
        assert!((right.length() - 1.0).abs() < 1e-6);
        assert!(right.dot(Vec3::Z).abs() < 1e-6);
    }

    #[test]
    fn test_separation_influence_capped() {
        let pursuit = Vec3::Z * 10.0;
        let blended = blend_separation(pursuit, 10.0, -Vec3::Z * 1000.0, 0.5);
        // 0.6 * 10 forward, 0.4 * 10 backward.
        assert!((blended.z - 2.0).abs() < 1e-5);
        assert_eq!(blend_separation(pursuit, 10.0, Vec3::ZERO, 0.5), pursuit);
    }

    #[test]
    fn test_detection_and_pursuit() {
        let (mut ai, rx) = engine();
        let near = ai.spawn(enemy(EnemyArchetype::Standard, Vec3::new(0.0, 0.0, 500.0)));
        let far = ai.spawn(enemy(EnemyArchetype::Standard, Vec3::new(0.0, 0.0, 5000.0)));
        let mut player = PlayerState::default();

        let report = ai.update(1.0 / 60.0, &mut player);
        assert_eq!(report.detections, 1);
        assert_eq!(ai.get(near).map(|e| e.state), Some(AiState::Pursuing));
        assert_eq!(ai.get(far).map(|e| e.state), Some(AiState::Dormant));
        assert_eq!(ai.get(far).map(|e| e.position), Some(Vec3::new(0.0, 0.0, 5000.0)));

        let chaser = ai.get(near).map(|e| e.velocity).unwrap_or_default();
        assert!(chaser.dot(-Vec3::Z) > 0.0);
        assert_eq!(rx.drain().len(), 2);
    }

    #[test]
    fn test_archetype_speeds() {
        let (mut ai, _rx) = engine();
        let heavy = ai.spawn(enemy(EnemyArchetype::Heavy, Vec3::new(600.0, 0.0, 0.0)));
        let swift = ai.spawn(enemy(EnemyArchetype::Swift, Vec3::new(-600.0, 0.0, 0.0)));
        let mut player = PlayerState::default();
        ai.update(0.01, &mut player);

        let heavy = ai.get(heavy).map(|e| e.velocity).unwrap_or_default();
        assert!((heavy.length() - 80.0 * HEAVY_SPEED_FACTOR).abs() < 1e-3);
        assert!(heavy.x < 0.0);

        let swift = ai.get(swift).map(|e| e.velocity).unwrap_or_default();
        assert!((swift.x - 80.0 * SWIFT_SPEED_FACTOR).abs() < 1e-3);
    }

    #[test]
    fn test_kamikaze_applies_damage_once() {
        let (mut ai, rx) = engine();
        ai.spawn(enemy(EnemyArchetype::Heavy, Vec3::new(10.0, 0.0, 0.0)));
        let mut player = PlayerState::default();

        let report = ai.update(1.0 / 60.0, &mut player);
        assert_eq!(report.detonations, 1);
        assert_eq!(ai.live_count(), 0);
        assert!(ai.enemies().is_empty());
        assert_eq!(ai.detonations().len(), 1);

        // 45 damage: all into the 100 shield.
        assert!((player.shield - 55.0).abs() < 1e-4);
        assert!((player.hull - 100.0).abs() < f32::EPSILON);

        let again = ai.update(1.0 / 60.0, &mut player);
        assert_eq!(again.detonations, 0);
        assert!((player.shield - 55.0).abs() < 1e-4);

        let events = rx.drain();
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::EntityDamaged {
                entity: EntityRef::Player,
                ..
            }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::EntityDestroyed {
                cause: DestroyCause::Kamikaze,
                ..
            }
        )));
    }

    #[test]
    fn test_frozen_engine_is_inert() {
        let (mut ai, _rx) = engine();
        let id = ai.spawn(enemy(EnemyArchetype::Standard, Vec3::new(0.0, 0.0, 100.0)));
        let mut player = PlayerState::default();

        ai.set_frozen(true);
        ai.update(1.0, &mut player);
        let e = ai.get(id).cloned().expect("spawned enemy");
        assert_eq!(e.state, AiState::Dormant);
        assert!(e.time_alive.abs() < f32::EPSILON);

        ai.set_frozen(false);
        ai.update(0.1, &mut player);
        assert_eq!(ai.get(id).map(|e| e.state), Some(AiState::Pursuing));
    }

    #[test]
    fn test_projectile_kill_and_despawn() {
        let (mut ai, rx) = engine();
        let a = ai.spawn(enemy(EnemyArchetype::Swift, Vec3::new(0.0, 0.0, 800.0)));
        ai.spawn(enemy(EnemyArchetype::Swift, Vec3::new(0.0, 0.0, -800.0)));

        let hit = ai.apply_damage(a, 5.0).unwrap_or_default();
        assert!(!hit.killed);
        let hit = ai.apply_damage(a, 50.0).unwrap_or_default();
        assert!(hit.killed);
        assert!(ai.get(a).is_none());
        assert!(ai.apply_damage(a, 1.0).is_none());

        ai.despawn_all();
        assert_eq!(ai.live_count(), 0);
        let destroyed = rx
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::EntityDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn test_separation_pushes_neighbours_apart() {
        let (mut ai, _rx) = engine();
        let a = ai.spawn(enemy(EnemyArchetype::Heavy, Vec3::new(-2.0, 0.0, 600.0)));
        let b = ai.spawn(enemy(EnemyArchetype::Heavy, Vec3::new(2.0, 0.0, 600.0)));
        let mut player = PlayerState::default();
        ai.update(0.01, &mut player);

        let fa = ai.get(a).map(|e| e.separation).unwrap_or_default();
        let fb = ai.get(b).map(|e| e.separation).unwrap_or_default();
        assert_eq!(fa, -fb);
        assert!(fa.x < 0.0);
        let va = ai.get(a).map(|e| e.velocity).unwrap_or_default();
        assert!(va.x < 0.0);
        assert!(va.z < 0.0);
    }
}
