//! # Enemy Entities
//!
//! Plain data driven by [`super::ai::EnemyAi`]. Base stats are kept next to
//! the scaled ones so difficulty can be re-derived at any time.

use serde::{Deserialize, Serialize};
use starfall_shared::{EnemyId, Vec3};

use super::difficulty::DifficultyMultipliers;

// ============================================================================
// ARCHETYPES
// ============================================================================

/// Movement-profile class of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyArchetype {
    /// Spiral approach.
    Standard,
    /// Slow, straight, tough.
    Heavy,
    /// Fast zigzag.
    Swift,
}

impl EnemyArchetype {
    /// Every archetype.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Heavy, Self::Swift];

    /// Resolves a tag. Enemy archetypes have no fallback: an unknown tag is
    /// a wiring error for the caller to report.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "standard" => Some(Self::Standard),
            "heavy" => Some(Self::Heavy),
            "swift" => Some(Self::Swift),
            _ => None,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Heavy => "heavy",
            Self::Swift => "swift",
        }
    }
}

/// Base stats of an archetype before difficulty scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    /// Hull points.
    pub health: f32,
    /// Shield points.
    pub shield: f32,
    /// Units per second before the profile's speed factor.
    pub speed: f32,
    /// Damage dealt to the player on detonation.
    pub kamikaze_damage: f32,
    /// Collision and separation radius.
    pub collision_radius: f32,
    /// Distance at which the player is noticed.
    pub detection_range: f32,
    /// Spiral/zigzag frequency in radians per second.
    pub frequency: f32,
    /// Spiral/zigzag lateral speed.
    pub amplitude: f32,
}

/// Base stats of every archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTable {
    /// Standard stats.
    pub standard: ArchetypeStats,
    /// Heavy stats.
    pub heavy: ArchetypeStats,
    /// Swift stats.
    pub swift: ArchetypeStats,
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self {
            standard: ArchetypeStats {
                health: 30.0,
                shield: 10.0,
                speed: 80.0,
                kamikaze_damage: 20.0,
                collision_radius: 6.0,
                detection_range: 1000.0,
                frequency: 2.0,
                amplitude: 40.0,
            },
            heavy: ArchetypeStats {
                health: 120.0,
                shield: 60.0,
                speed: 80.0,
                kamikaze_damage: 45.0,
                collision_radius: 12.0,
                detection_range: 1200.0,
                frequency: 0.0,
                amplitude: 0.0,
            },
            swift: ArchetypeStats {
                health: 15.0,
                shield: 0.0,
                speed: 80.0,
                kamikaze_damage: 12.0,
                collision_radius: 4.0,
                detection_range: 900.0,
                frequency: 2.5,
                amplitude: 30.0,
            },
        }
    }
}

impl ArchetypeTable {
    /// Stats of one archetype.
    #[must_use]
    pub const fn get(&self, archetype: EnemyArchetype) -> &ArchetypeStats {
        match archetype {
            EnemyArchetype::Standard => &self.standard,
            EnemyArchetype::Heavy => &self.heavy,
            EnemyArchetype::Swift => &self.swift,
        }
    }
}

// ============================================================================
// AI STATE MACHINE
// ============================================================================

/// AI lifecycle. States are only ever entered in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AiState {
    /// Spawned, player not yet detected.
    Dormant,
    /// Player detected, moving per movement profile.
    Pursuing,
    /// Within melee distance, damage applied.
    KamikazeTriggered,
    /// Terminal.
    Removed,
}

// ============================================================================
// ENEMY
// ============================================================================

/// Outcome of damage applied to an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyDamage {
    /// Absorbed by shields.
    pub shield_absorbed: f32,
    /// Taken by the hull.
    pub health_lost: f32,
    /// Health left.
    pub remaining: f32,
    /// Health reached zero.
    pub killed: bool,
}

/// An enemy ship.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Assigned when the AI engine takes ownership.
    pub id: EnemyId,
    /// Movement profile.
    pub archetype: EnemyArchetype,
    /// AI state.
    pub state: AiState,
    /// World position.
    pub position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// Heading around world up, radians (0 = +Z).
    pub yaw: f32,
    /// Heading above the horizon, radians.
    pub pitch: f32,
    /// Current hull.
    pub health: f32,
    /// Hull cap.
    pub max_health: f32,
    /// Current shield.
    pub shield: f32,
    /// Shield cap.
    pub max_shield: f32,
    /// Unscaled stats (endless mode re-derives from these).
    pub base: ArchetypeStats,
    /// Scaled speed.
    pub speed: f32,
    /// Scaled detonation damage.
    pub kamikaze_damage: f32,
    /// Seconds since spawn.
    pub time_alive: f32,
    /// Player detection distance.
    pub detection_range: f32,
    /// Spiral/zigzag phase.
    pub phase: f32,
    /// Spiral/zigzag frequency.
    pub frequency: f32,
    /// Spiral/zigzag amplitude.
    pub amplitude: f32,
    /// Separation force accumulated this frame.
    pub separation: Vec3,
    /// Collision radius.
    pub collision_radius: f32,
}

impl Enemy {
    /// Builds an enemy with difficulty-scaled stats.
    ///
    /// The id is a placeholder until [`super::ai::EnemyAi::spawn`] assigns one.
    #[must_use]
    pub fn new(
        archetype: EnemyArchetype,
        position: Vec3,
        base: ArchetypeStats,
        multipliers: &DifficultyMultipliers,
        phase: f32,
    ) -> Self {
        let max_health = base.health * multipliers.health;
        Self {
            id: EnemyId(0),
            archetype,
            state: AiState::Dormant,
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            health: max_health,
            max_health,
            shield: base.shield,
            max_shield: base.shield,
            base,
            speed: base.speed * multipliers.speed,
            kamikaze_damage: base.kamikaze_damage * multipliers.damage,
            time_alive: 0.0,
            detection_range: base.detection_range,
            phase,
            frequency: base.frequency,
            amplitude: base.amplitude,
            separation: Vec3::ZERO,
            collision_radius: base.collision_radius,
        }
    }

    /// Still simulated (not removed, not detonated).
    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self.state, AiState::Dormant | AiState::Pursuing)
    }

    /// Shields first, then hull.
    pub fn take_damage(&mut self, amount: f32) -> EnemyDamage {
        let amount = amount.max(0.0);
        let shield_absorbed = amount.min(self.shield);
        self.shield -= shield_absorbed;
        let health_lost = (amount - shield_absorbed).min(self.health);
        self.health -= health_lost;
        EnemyDamage {
            shield_absorbed,
            health_lost,
            remaining: self.health,
            killed: self.health <= 0.0,
        }
    }

    /// Re-derives damage and speed from base stats and raises the hull cap.
    ///
    /// Current health is left alone: endless scaling makes enemies tougher
    /// to finish, it does not heal them.
    pub fn rescale(&mut self, multipliers: &DifficultyMultipliers) {
        self.max_health = self.max_health.max(self.base.health * multipliers.health);
        self.kamikaze_damage = self.base.kamikaze_damage * multipliers.damage;
        self.speed = self.base.speed * multipliers.speed;
    }

    /// Points yaw/pitch along the current velocity.
    pub fn face_velocity(&mut self) {
        if let Some(dir) = self.velocity.try_normalize() {
            self.yaw = dir.x.atan2(dir.z);
            self.pitch = dir.y.clamp(-1.0, 1.0).asin();
        }
    }
}
