//! Guided projectiles: turn toward a target point at a bounded rate.

use starfall_shared::{Quaternion, Vec3};

use super::{Projectile, ProjectileBehavior, ProjectileKind};

/// Homing motion.
#[derive(Debug, Default)]
pub struct GuidedBehavior;

impl ProjectileBehavior for GuidedBehavior {
    const KIND: ProjectileKind = ProjectileKind::Guided;

    fn advance(&mut self, projectile: &mut Projectile, dt: f32) {
        if let Some(target) = projectile.target {
            let current = projectile.direction();
            if let Some(desired) = (target - projectile.position()).try_normalize() {
                let angle = current.dot(desired).clamp(-1.0, 1.0).acos();
                let max_turn = projectile.turn_rate * dt;
                let dir = if angle <= max_turn || angle <= f32::EPSILON {
                    desired
                } else {
                    current.lerp(desired, max_turn / angle).normalize_or(desired)
                };
                projectile.velocity = dir * projectile.speed;
                projectile.transform.rotation = Quaternion::from_rotation_arc(Vec3::Z, dir);
            }
        }
        projectile.transform.position += projectile.velocity * dt;
    }
}
