//! # Effects
//!
//! Short-lived visuals, one pool per archetype. Every effect owns a cloned
//! material so fading one never touches another.

mod flash;
mod impact;
mod pool;
mod tracer;
mod trail;

pub use flash::FlashBehavior;
pub use impact::ImpactBehavior;
pub use pool::EffectPool;
pub use tracer::TracerBehavior;
pub use trail::TrailBehavior;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use starfall_core::PoolHandle;
use starfall_shared::{Quaternion, Transform, Vec3};

use crate::scene::{GeometryHandle, MaterialHandle};

/// Effect archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Brief flash at a weapon muzzle.
    MuzzleFlash,
    /// Ribbon following a projectile.
    Trail,
    /// Expanding burst. The fallback for unknown tags.
    Impact,
    /// Fading line segment.
    Tracer,
}

impl EffectKind {
    /// Every archetype, in pool order.
    pub const ALL: [Self; 4] = [Self::MuzzleFlash, Self::Trail, Self::Impact, Self::Tracer];

    /// Dense index for per-archetype arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::MuzzleFlash => 0,
            Self::Trail => 1,
            Self::Impact => 2,
            Self::Tracer => 3,
        }
    }

    /// Canonical tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::MuzzleFlash => "muzzle_flash",
            Self::Trail => "trail",
            Self::Impact => "generic",
            Self::Tracer => "tracer",
        }
    }

    /// Resolves an effect tag. Unknown tags fall back to a generic impact.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "muzzle_flash" | "flash" => Self::MuzzleFlash,
            "trail" => Self::Trail,
            "impact" | "explosion" | "generic" => Self::Impact,
            "tracer" => Self::Tracer,
            other => {
                tracing::warn!("unknown effect tag {:?}, using {}", other, Self::Impact.tag());
                Self::Impact
            }
        }
    }
}

/// Handle to a live effect, tagged with the pool that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    /// Owning archetype pool.
    pub kind: EffectKind,
    /// Handle inside that pool.
    pub handle: PoolHandle,
}

/// Default parameters of an effect archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDefaults {
    /// Seconds before the effect ends (flash, impact, trail).
    pub lifetime: f32,
    /// Visual scale.
    pub scale: f32,
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// Opacity lost per second (tracer).
    pub fade_rate: f32,
    /// Scale growth over the lifetime (impact).
    pub expansion: f32,
    /// Ribbon vertex capacity (trail).
    pub max_points: usize,
}

impl EffectDefaults {
    /// Built-in tuning of `kind`.
    #[must_use]
    pub const fn for_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::MuzzleFlash => Self {
                lifetime: 0.08,
                scale: 1.5,
                color: [1.0, 0.85, 0.4, 1.0],
                fade_rate: 0.0,
                expansion: 0.0,
                max_points: 0,
            },
            EffectKind::Trail => Self {
                lifetime: 8.0,
                scale: 1.0,
                color: [1.0, 0.6, 0.2, 0.8],
                fade_rate: 0.0,
                expansion: 0.0,
                max_points: 32,
            },
            EffectKind::Impact => Self {
                lifetime: 0.5,
                scale: 2.0,
                color: [1.0, 0.5, 0.1, 1.0],
                fade_rate: 0.0,
                expansion: 3.0,
                max_points: 0,
            },
            EffectKind::Tracer => Self {
                lifetime: 0.0,
                scale: 1.0,
                color: [1.0, 1.0, 0.7, 1.0],
                fade_rate: 4.0,
                expansion: 0.0,
                max_points: 0,
            },
        }
    }
}

/// A pooled effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    /// Archetype.
    pub kind: EffectKind,
    /// Handed out and visible.
    pub active: bool,
    /// Manager clock at acquisition.
    pub created_at: f64,
    /// Seconds since acquisition.
    pub age: f32,
    /// Seconds before the effect ends.
    pub lifetime: f32,
    /// World transform.
    pub transform: Transform,
    /// Scale at acquisition.
    pub base_scale: f32,
    /// Linear RGBA colour.
    pub color: [f32; 4],
    /// Current opacity.
    pub opacity: f32,
    /// Opacity lost per second.
    pub fade_rate: f32,
    /// Scale growth over the lifetime.
    pub expansion: f32,
    /// Segment start (tracer).
    pub start: Vec3,
    /// Segment end (tracer).
    pub end: Vec3,
    /// Ribbon points, oldest first (trail).
    pub points: VecDeque<Vec3>,
    /// Ribbon capacity.
    pub max_points: usize,
    /// Shared mesh.
    pub geometry: GeometryHandle,
    /// Shared material this effect's material was cloned from.
    pub material: MaterialHandle,
    /// Per-object material clone, created on first use and kept across
    /// reuses until the pool is disposed.
    pub material_instance: Option<MaterialHandle>,
}

impl Effect {
    /// Builds the inactive template of an archetype.
    #[must_use]
    pub fn template(
        kind: EffectKind,
        defaults: &EffectDefaults,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) -> Self {
        Self {
            kind,
            active: false,
            created_at: 0.0,
            age: 0.0,
            lifetime: defaults.lifetime,
            transform: Transform::new(Vec3::ZERO, Quaternion::IDENTITY, defaults.scale),
            base_scale: defaults.scale,
            color: defaults.color,
            opacity: 1.0,
            fade_rate: defaults.fade_rate,
            expansion: defaults.expansion,
            start: Vec3::ZERO,
            end: Vec3::ZERO,
            points: VecDeque::with_capacity(defaults.max_points),
            max_points: defaults.max_points,
            geometry,
            material,
            material_instance: None,
        }
    }

    /// Restores every field from `template`, keeping this object's
    /// material clone and ribbon allocation.
    pub fn reset_from(&mut self, template: &Self) {
        // Exhaustive on purpose: a new field fails to compile until handled.
        let Self {
            kind,
            active,
            created_at,
            age,
            lifetime,
            transform,
            base_scale,
            color,
            opacity,
            fade_rate,
            expansion,
            start,
            end,
            points: _,
            max_points,
            geometry,
            material,
            material_instance: _,
        } = template;
        self.kind = *kind;
        self.active = *active;
        self.created_at = *created_at;
        self.age = *age;
        self.lifetime = *lifetime;
        self.transform = *transform;
        self.base_scale = *base_scale;
        self.color = *color;
        self.opacity = *opacity;
        self.fade_rate = *fade_rate;
        self.expansion = *expansion;
        self.start = *start;
        self.end = *end;
        self.points.clear();
        self.max_points = *max_points;
        self.geometry = *geometry;
        self.material = *material;
    }

    /// Material the scene node draws with.
    #[must_use]
    pub fn draw_material(&self) -> MaterialHandle {
        self.material_instance.unwrap_or(self.material)
    }

    /// Appends a ribbon point, dropping the oldest at capacity.
    pub fn push_point(&mut self, point: Vec3) {
        if self.max_points == 0 {
            return;
        }
        if self.points.len() == self.max_points {
            self.points.pop_front();
        }
        self.points.push_back(point);
        self.transform.position = point;
    }

    /// Normalized age in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.lifetime > 0.0 {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Per-archetype animation.
pub trait EffectBehavior {
    /// Archetype this behaviour drives.
    const KIND: EffectKind;

    /// Advances one active effect by `dt` seconds. Returns `false` once the
    /// effect has finished and should be released.
    fn advance(&mut self, effect: &mut Effect, dt: f32) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> Effect {
        Effect::template(
            EffectKind::Trail,
            &EffectDefaults::for_kind(EffectKind::Trail),
            GeometryHandle(0),
            MaterialHandle(0),
        )
    }

    #[test]
    fn test_from_tag_fallback() {
        assert_eq!(EffectKind::from_tag("flash"), EffectKind::MuzzleFlash);
        assert_eq!(EffectKind::from_tag("tracer"), EffectKind::Tracer);
        assert_eq!(EffectKind::from_tag("sparkles"), EffectKind::Impact);
    }

    #[test]
    fn test_ribbon_capacity() {
        let mut e = trail();
        for i in 0..40u8 {
            e.push_point(Vec3::splat(f32::from(i)));
        }
        assert_eq!(e.points.len(), e.max_points);
        assert_eq!(e.points.front().copied(), Some(Vec3::splat(8.0)));
        assert_eq!(e.transform.position, Vec3::splat(39.0));
    }

    #[test]
    fn test_reset_keeps_clone_and_clears_state() {
        let template = trail();
        let mut e = template.clone();
        e.active = true;
        e.opacity = 0.2;
        e.age = 3.0;
        e.push_point(Vec3::X);
        e.material_instance = Some(MaterialHandle(9));

        e.reset_from(&template);
        assert!(!e.active);
        assert!(e.points.is_empty());
        assert!((e.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(e.material_instance, Some(MaterialHandle(9)));
        assert_eq!(e.draw_material(), MaterialHandle(9));
    }
}
