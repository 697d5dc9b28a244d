//! Area projectiles: slow orbs whose visual radius pulses in flight.

use std::f32::consts::TAU;

use super::{Projectile, ProjectileBehavior, ProjectileKind};

/// Area motion and pulse animation.
#[derive(Debug, Default)]
pub struct AreaBehavior;

impl ProjectileBehavior for AreaBehavior {
    const KIND: ProjectileKind = ProjectileKind::Area;

    fn advance(&mut self, projectile: &mut Projectile, dt: f32) {
        projectile.transform.position += projectile.velocity * dt;
        projectile.pulse_phase = (projectile.pulse_phase + TAU * projectile.pulse_frequency * dt) % TAU;
        projectile.transform.scale =
            projectile.base_scale * (1.0 + projectile.pulse_amplitude * projectile.pulse_phase.sin());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectiles::ProjectileDefaults;
    use crate::scene::{GeometryHandle, MaterialHandle};

    #[test]
    fn test_pulse_stays_within_amplitude() {
        let defaults = ProjectileDefaults::for_kind(ProjectileKind::Area);
        let mut p = Projectile::template(
            ProjectileKind::Area,
            &defaults,
            (GeometryHandle(0), MaterialHandle(0)),
            None,
        );
        let mut behavior = AreaBehavior;
        let lo = defaults.scale * (1.0 - defaults.pulse_amplitude) - 1e-4;
        let hi = defaults.scale * (1.0 + defaults.pulse_amplitude) + 1e-4;

        let mut saw_change = false;
        for _ in 0..120 {
            behavior.advance(&mut p, 1.0 / 60.0);
            assert!(p.transform.scale >= lo && p.transform.scale <= hi);
            saw_change |= (p.transform.scale - defaults.scale).abs() > 1e-3;
        }
        assert!(saw_change);
    }
}
