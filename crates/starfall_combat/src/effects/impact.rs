//! Impacts: an expanding burst with a quadratic fade.

use super::{Effect, EffectBehavior, EffectKind};

/// Impact animation.
#[derive(Debug, Default)]
pub struct ImpactBehavior;

impl EffectBehavior for ImpactBehavior {
    const KIND: EffectKind = EffectKind::Impact;

    fn advance(&mut self, effect: &mut Effect, dt: f32) -> bool {
        effect.age += dt;
        let t = effect.progress();
        let remaining = 1.0 - t;
        effect.opacity = remaining * remaining;
        effect.transform.scale = effect.base_scale * (1.0 + effect.expansion * t);
        effect.age < effect.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectDefaults;
    use crate::scene::{GeometryHandle, MaterialHandle};

    #[test]
    fn test_impact_grows_and_finishes() {
        let defaults = EffectDefaults::for_kind(EffectKind::Impact);
        let mut e = Effect::template(EffectKind::Impact, &defaults, GeometryHandle(0), MaterialHandle(0));
        let mut behavior = ImpactBehavior;

        assert!(behavior.advance(&mut e, defaults.lifetime * 0.5));
        assert!(e.transform.scale > defaults.scale);
        assert!(e.opacity < 1.0 && e.opacity > 0.0);

        assert!(!behavior.advance(&mut e, defaults.lifetime));
        assert!(e.opacity.abs() < 1e-6);
    }
}
