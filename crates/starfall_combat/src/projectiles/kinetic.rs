//! Kinetic projectiles: spinning slugs that can ricochet a few times.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use starfall_shared::{Quaternion, Vec3};

use super::{Projectile, ProjectileBehavior, ProjectileKind};

/// Ricochets allowed before the projectile must be destroyed.
pub const MAX_RICOCHETS: u32 = 3;

/// Damage multiplier applied per ricochet.
pub const RICOCHET_DAMAGE_DECAY: f32 = 0.7;

/// Speed multiplier applied per ricochet.
pub const RICOCHET_SPEED_DECAY: f32 = 0.8;

/// Kinetic motion. Owns the random source for spin.
#[derive(Debug)]
pub struct KineticBehavior {
    rng: ChaCha8Rng,
}

impl KineticBehavior {
    /// Creates the behaviour with an injected random source.
    #[must_use]
    pub const fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl ProjectileBehavior for KineticBehavior {
    const KIND: ProjectileKind = ProjectileKind::Kinetic;

    fn on_acquire(&mut self, projectile: &mut Projectile) {
        let axis = Vec3::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        );
        projectile.spin_axis = axis.normalize_or(Vec3::Z);
        projectile.spin_rate = if projectile.max_spin > 0.0 {
            self.rng.gen_range(0.0..projectile.max_spin)
        } else {
            0.0
        };
    }

    fn advance(&mut self, projectile: &mut Projectile, dt: f32) {
        projectile.transform.position += projectile.velocity * dt;
        if projectile.spin_rate > 0.0 {
            let step = Quaternion::from_axis_angle(projectile.spin_axis, projectile.spin_rate * dt);
            projectile.transform.rotation = (step * projectile.transform.rotation).normalized();
        }
    }
}

/// Bounces a kinetic projectile off a surface with unit `normal`.
///
/// Each ricochet reflects the velocity and decays damage and speed. Returns
/// `false` once the cap is reached (or for non-kinetic projectiles), in
/// which case the caller destroys the projectile.
pub fn ricochet(projectile: &mut Projectile, normal: Vec3) -> bool {
    if projectile.kind != ProjectileKind::Kinetic || projectile.ricochet_count >= MAX_RICOCHETS {
        return false;
    }
    let Some(normal) = normal.try_normalize() else {
        return false;
    };
    projectile.ricochet_count += 1;
    projectile.damage *= RICOCHET_DAMAGE_DECAY;
    projectile.speed *= RICOCHET_SPEED_DECAY;
    let dir = projectile.direction().reflect(normal).normalize_or(normal);
    projectile.aim(dir);
    true
}
