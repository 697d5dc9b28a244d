//! Muzzle flashes: a brief bright burst that shrinks as it fades.

use super::{Effect, EffectBehavior, EffectKind};

/// Muzzle flash animation.
#[derive(Debug, Default)]
pub struct FlashBehavior;

impl EffectBehavior for FlashBehavior {
    const KIND: EffectKind = EffectKind::MuzzleFlash;

    fn advance(&mut self, effect: &mut Effect, dt: f32) -> bool {
        effect.age += dt;
        let t = effect.progress();
        effect.opacity = 1.0 - t;
        effect.transform.scale = effect.base_scale * (1.0 - 0.5 * t);
        effect.age < effect.lifetime
    }
}
