//! Tracers: a line segment whose opacity decays at a fixed rate.

use super::{Effect, EffectBehavior, EffectKind};

/// Tracer fade.
#[derive(Debug, Default)]
pub struct TracerBehavior;

impl EffectBehavior for TracerBehavior {
    const KIND: EffectKind = EffectKind::Tracer;

    fn advance(&mut self, effect: &mut Effect, dt: f32) -> bool {
        effect.age += dt;
        effect.opacity = (effect.opacity - effect.fade_rate * dt).max(0.0);
        effect.opacity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectDefaults;
    use crate::scene::{GeometryHandle, MaterialHandle};

    #[test]
    fn test_tracer_fades_to_zero() {
        let defaults = EffectDefaults::for_kind(EffectKind::Tracer);
        let mut e = Effect::template(EffectKind::Tracer, &defaults, GeometryHandle(0), MaterialHandle(0));
        let mut behavior = TracerBehavior;

        let mut frames = 0;
        while behavior.advance(&mut e, 1.0 / 60.0) {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(e.opacity.abs() < f32::EPSILON);
        // 1.0 opacity at 4.0/s is gone in roughly a quarter second.
        assert!((14..=16).contains(&frames));
    }
}
