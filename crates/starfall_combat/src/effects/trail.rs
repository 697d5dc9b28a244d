//! Trails: ribbons fed by the manager with their projectile's position.

use super::{Effect, EffectBehavior, EffectKind};

/// Trail animation. The ribbon tail fades as the trail ages.
#[derive(Debug, Default)]
pub struct TrailBehavior;

impl EffectBehavior for TrailBehavior {
    const KIND: EffectKind = EffectKind::Trail;

    fn advance(&mut self, effect: &mut Effect, dt: f32) -> bool {
        effect.age += dt;
        effect.opacity = 1.0 - effect.progress();
        effect.age < effect.lifetime
    }
}
