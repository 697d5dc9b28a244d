//! # Projectiles
//!
//! Four archetypes, each with its own pool:
//!
//! | Kind      | Motion                         | Extras                   |
//! |-----------|--------------------------------|--------------------------|
//! | `Beam`    | straight, very fast            | glow shell, penetration  |
//! | `Guided`  | steers toward a target point   | trail effect             |
//! | `Area`    | straight, slow                 | pulsing blast radius     |
//! | `Kinetic` | straight, spinning             | ricochet (capped)        |

mod area;
mod beam;
mod guided;
mod kinetic;
mod pool;

pub use area::AreaBehavior;
pub use beam::BeamBehavior;
pub use guided::GuidedBehavior;
pub use kinetic::{
    ricochet, KineticBehavior, MAX_RICOCHETS, RICOCHET_DAMAGE_DECAY, RICOCHET_SPEED_DECAY,
};
pub use pool::ProjectilePool;

use serde::{Deserialize, Serialize};
use starfall_core::PoolHandle;
use starfall_shared::{Quaternion, Transform, Vec3};

use crate::effects::EffectHandle;
use crate::scene::{GeometryHandle, MaterialHandle};

// =============================================================================
// KINDS
// =============================================================================

/// Projectile archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Energy beam.
    Beam,
    /// Homing missile.
    Guided,
    /// Slow area-of-effect orb.
    Area,
    /// Solid slug. The fallback for unknown tags.
    Kinetic,
}

impl ProjectileKind {
    /// Every archetype, in pool order.
    pub const ALL: [Self; 4] = [Self::Beam, Self::Guided, Self::Area, Self::Kinetic];

    /// Dense index for per-archetype arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Beam => 0,
            Self::Guided => 1,
            Self::Area => 2,
            Self::Kinetic => 3,
        }
    }

    /// Canonical tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Beam => "laser",
            Self::Guided => "missile",
            Self::Area => "plasma",
            Self::Kinetic => "bullet",
        }
    }

    /// Resolves a weapon tag. Unknown tags fall back to kinetic.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "laser" | "beam" => Self::Beam,
            "missile" | "rocket" | "guided" => Self::Guided,
            "plasma" | "area" => Self::Area,
            "bullet" | "kinetic" => Self::Kinetic,
            other => {
                tracing::warn!("unknown projectile tag {:?}, using {}", other, Self::Kinetic.tag());
                Self::Kinetic
            }
        }
    }
}

impl std::fmt::Display for ProjectileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Handle to a live projectile, tagged with the pool that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileHandle {
    /// Owning archetype pool.
    pub kind: ProjectileKind,
    /// Handle inside that pool.
    pub handle: PoolHandle,
}

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default gameplay and visual parameters of an archetype.
///
/// A released projectile is restored to exactly these values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileDefaults {
    /// Units per second.
    pub speed: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Extra targets a hit may pass through.
    pub penetration: u32,
    /// Energy drawn from the shooter per shot.
    pub energy_cost: f32,
    /// Seconds before the projectile expires.
    pub lifetime: f32,
    /// Collision radius.
    pub radius: f32,
    /// Visual scale.
    pub scale: f32,
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// Draws an additive glow shell.
    pub glow: bool,
    /// Drags a trail effect behind it.
    pub trail: bool,
    /// Steering rate in radians per second (guided only).
    pub turn_rate: f32,
    /// Pulses per second (area only).
    pub pulse_frequency: f32,
    /// Relative scale swing of a pulse (area only).
    pub pulse_amplitude: f32,
    /// Upper bound of the random spin in radians per second (kinetic only).
    pub max_spin: f32,
}

impl ProjectileDefaults {
    /// Built-in tuning of `kind`.
    #[must_use]
    pub const fn for_kind(kind: ProjectileKind) -> Self {
        let base = Self {
            speed: 0.0,
            damage: 0.0,
            penetration: 0,
            energy_cost: 0.0,
            lifetime: 0.0,
            radius: 0.0,
            scale: 1.0,
            color: [1.0, 1.0, 1.0, 1.0],
            glow: false,
            trail: false,
            turn_rate: 0.0,
            pulse_frequency: 0.0,
            pulse_amplitude: 0.0,
            max_spin: 0.0,
        };
        match kind {
            ProjectileKind::Beam => Self {
                speed: 800.0,
                damage: 25.0,
                penetration: 2,
                energy_cost: 8.0,
                lifetime: 1.5,
                radius: 0.5,
                color: [0.3, 0.8, 1.0, 1.0],
                glow: true,
                ..base
            },
            ProjectileKind::Guided => Self {
                speed: 220.0,
                damage: 40.0,
                energy_cost: 15.0,
                lifetime: 6.0,
                radius: 1.0,
                scale: 1.5,
                color: [1.0, 0.55, 0.1, 1.0],
                trail: true,
                turn_rate: 2.5,
                ..base
            },
            ProjectileKind::Area => Self {
                speed: 120.0,
                damage: 60.0,
                energy_cost: 25.0,
                lifetime: 4.0,
                radius: 12.0,
                scale: 3.0,
                color: [0.7, 0.2, 1.0, 0.9],
                glow: true,
                pulse_frequency: 4.0,
                pulse_amplitude: 0.25,
                ..base
            },
            ProjectileKind::Kinetic => Self {
                speed: 600.0,
                damage: 10.0,
                energy_cost: 1.0,
                lifetime: 2.0,
                radius: 0.3,
                scale: 0.5,
                color: [1.0, 0.9, 0.6, 1.0],
                max_spin: 20.0,
                ..base
            },
        }
    }
}

// =============================================================================
// PROJECTILE
// =============================================================================

/// A pooled projectile.
///
/// Plain data: a released projectile is overwritten with its pool's
/// template, so no field can survive from one use to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    /// Archetype.
    pub kind: ProjectileKind,
    /// Handed out and in flight.
    pub active: bool,
    /// Manager clock at acquisition.
    pub created_at: f64,
    /// Seconds since acquisition.
    pub age: f32,
    /// World transform.
    pub transform: Transform,
    /// Position before the last move. Equals the position until the first
    /// pool update.
    pub previous_position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// Current speed.
    pub speed: f32,
    /// Current damage per hit.
    pub damage: f32,
    /// Damage at acquisition.
    pub base_damage: f32,
    /// Remaining pass-through hits.
    pub penetration: u32,
    /// Energy cost of the shot.
    pub energy_cost: f32,
    /// Seconds before expiry.
    pub lifetime: f32,
    /// Collision radius.
    pub radius: f32,
    /// Scale before pulsing.
    pub base_scale: f32,
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// Ricochets so far.
    pub ricochet_count: u32,
    /// Spin axis (kinetic).
    pub spin_axis: Vec3,
    /// Spin rate in radians per second (kinetic).
    pub spin_rate: f32,
    /// Homing target (guided).
    pub target: Option<Vec3>,
    /// Steering rate in radians per second (guided).
    pub turn_rate: f32,
    /// Pulse phase in radians (area).
    pub pulse_phase: f32,
    /// Pulses per second (area).
    pub pulse_frequency: f32,
    /// Relative pulse swing (area).
    pub pulse_amplitude: f32,
    /// Upper bound for a random spin rate (kinetic).
    pub max_spin: f32,
    /// Attached trail effect.
    pub trail: Option<EffectHandle>,
    /// Archetype wants a trail on fire.
    pub wants_trail: bool,
    /// Shared body mesh.
    pub geometry: GeometryHandle,
    /// Shared body material.
    pub material: MaterialHandle,
    /// Shared glow mesh and material, if this archetype glows.
    pub glow: Option<(GeometryHandle, MaterialHandle)>,
}

impl Projectile {
    /// Builds the inactive template of an archetype.
    #[must_use]
    pub fn template(
        kind: ProjectileKind,
        defaults: &ProjectileDefaults,
        body: (GeometryHandle, MaterialHandle),
        glow: Option<(GeometryHandle, MaterialHandle)>,
    ) -> Self {
        Self {
            kind,
            active: false,
            created_at: 0.0,
            age: 0.0,
            transform: Transform::new(Vec3::ZERO, Quaternion::IDENTITY, defaults.scale),
            previous_position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            speed: defaults.speed,
            damage: defaults.damage,
            base_damage: defaults.damage,
            penetration: defaults.penetration,
            energy_cost: defaults.energy_cost,
            lifetime: defaults.lifetime,
            radius: defaults.radius,
            base_scale: defaults.scale,
            color: defaults.color,
            ricochet_count: 0,
            spin_axis: Vec3::Z,
            spin_rate: 0.0,
            target: None,
            turn_rate: defaults.turn_rate,
            pulse_phase: 0.0,
            pulse_frequency: defaults.pulse_frequency,
            pulse_amplitude: defaults.pulse_amplitude,
            max_spin: defaults.max_spin,
            trail: None,
            wants_trail: defaults.trail,
            geometry: body.0,
            material: body.1,
            glow: if defaults.glow { glow } else { None },
        }
    }

    /// Position shortcut.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Moves the projectile without sweeping the gap.
    pub fn place(&mut self, position: Vec3) {
        self.transform.position = position;
        self.previous_position = position;
    }

    /// Unit travel direction (+Z when at rest).
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.velocity.normalize_or(Vec3::Z)
    }

    /// Points the projectile along `direction` at its current speed.
    pub fn aim(&mut self, direction: Vec3) {
        let dir = direction.normalize_or(Vec3::Z);
        self.velocity = dir * self.speed;
        self.transform.rotation = Quaternion::from_rotation_arc(Vec3::Z, dir);
    }

    /// Lifetime used up.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Per-archetype motion.
///
/// The pool ages projectiles and handles expiry; a behaviour only moves
/// and animates them.
pub trait ProjectileBehavior {
    /// Archetype this behaviour drives.
    const KIND: ProjectileKind;

    /// Called right after a projectile is handed out.
    fn on_acquire(&mut self, _projectile: &mut Projectile) {}

    /// Advances one active projectile by `dt` seconds.
    fn advance(&mut self, projectile: &mut Projectile, dt: f32) {
        projectile.transform.position += projectile.velocity * dt;
    }
}
