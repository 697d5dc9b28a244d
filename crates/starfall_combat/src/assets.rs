//! Shared geometry and materials.
//!
//! Built once when the manager starts and handed to every pool by value
//! (handles are `Copy`). Only [`SharedAssets::dispose`] frees them, and it
//! frees each handle exactly once no matter how often it is called.

use crate::config::CombatPoolConfig;
use crate::effects::EffectKind;
use crate::projectiles::ProjectileKind;
use crate::scene::{GeometryDesc, GeometryHandle, GuardedRenderer, MaterialDesc, MaterialHandle};

/// Resources shared across all pooled objects of an archetype.
#[derive(Debug)]
pub struct SharedAssets {
    projectile_geometry: [GeometryHandle; 4],
    projectile_material: [MaterialHandle; 4],
    glow_geometry: GeometryHandle,
    glow_material: MaterialHandle,
    effect_geometry: [GeometryHandle; 4],
    effect_material: [MaterialHandle; 4],
    disposed: bool,
}

impl SharedAssets {
    /// Creates every shared resource through `renderer`.
    pub fn new(renderer: &mut GuardedRenderer, config: &CombatPoolConfig) -> Self {
        let projectile_geometry = ProjectileKind::ALL.map(|kind| {
            let defaults = config.projectiles.get(kind);
            let desc = match kind {
                ProjectileKind::Beam => GeometryDesc::Capsule {
                    radius: defaults.radius,
                    length: 4.0,
                },
                ProjectileKind::Guided => GeometryDesc::Capsule {
                    radius: defaults.radius,
                    length: 2.0,
                },
                ProjectileKind::Area | ProjectileKind::Kinetic => GeometryDesc::Sphere {
                    radius: defaults.radius,
                },
            };
            renderer.create_geometry(&desc)
        });
        let projectile_material = ProjectileKind::ALL.map(|kind| {
            renderer.create_material(&MaterialDesc {
                color: config.projectiles.get(kind).color,
                additive: matches!(kind, ProjectileKind::Beam | ProjectileKind::Area),
            })
        });

        let glow_geometry = renderer.create_geometry(&GeometryDesc::Sphere { radius: 1.0 });
        let glow_material = renderer.create_material(&MaterialDesc {
            color: [1.0, 1.0, 1.0, 0.35],
            additive: true,
        });

        let effect_geometry = EffectKind::ALL.map(|kind| {
            let desc = match kind {
                EffectKind::MuzzleFlash | EffectKind::Impact => GeometryDesc::Billboard {
                    size: config.effects.get(kind).scale,
                },
                EffectKind::Trail => GeometryDesc::Ribbon {
                    max_points: u32::try_from(config.effects.trail.max_points).unwrap_or(u32::MAX),
                },
                EffectKind::Tracer => GeometryDesc::Line,
            };
            renderer.create_geometry(&desc)
        });
        let effect_material = EffectKind::ALL.map(|kind| {
            renderer.create_material(&MaterialDesc {
                color: config.effects.get(kind).color,
                additive: true,
            })
        });

        tracing::debug!(
            "shared combat assets created ({} geometries, {} materials)",
            Self::GEOMETRY_COUNT,
            Self::MATERIAL_COUNT
        );

        Self {
            projectile_geometry,
            projectile_material,
            glow_geometry,
            glow_material,
            effect_geometry,
            effect_material,
            disposed: false,
        }
    }

    /// Number of shared geometries.
    pub const GEOMETRY_COUNT: usize = 9;

    /// Number of shared materials.
    pub const MATERIAL_COUNT: usize = 9;

    /// Body mesh and material of a projectile archetype.
    #[must_use]
    pub const fn projectile(&self, kind: ProjectileKind) -> (GeometryHandle, MaterialHandle) {
        (
            self.projectile_geometry[kind.index()],
            self.projectile_material[kind.index()],
        )
    }

    /// Glow shell shared by every glowing archetype.
    #[must_use]
    pub const fn glow(&self) -> (GeometryHandle, MaterialHandle) {
        (self.glow_geometry, self.glow_material)
    }

    /// Mesh and source material of an effect archetype.
    #[must_use]
    pub const fn effect(&self, kind: EffectKind) -> (GeometryHandle, MaterialHandle) {
        (self.effect_geometry[kind.index()], self.effect_material[kind.index()])
    }

    /// Whether [`SharedAssets::dispose`] already ran.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Frees every shared resource. Returns `false` if already disposed.
    pub fn dispose(&mut self, renderer: &mut GuardedRenderer) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;

        for handle in self.projectile_geometry.iter().chain(&self.effect_geometry) {
            renderer.dispose_geometry(*handle);
        }
        renderer.dispose_geometry(self.glow_geometry);

        for handle in self.projectile_material.iter().chain(&self.effect_material) {
            renderer.dispose_material(*handle);
        }
        renderer.dispose_material(self.glow_material);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingRenderer;

    #[test]
    fn test_dispose_frees_each_handle_once() {
        let (backend, log) = RecordingRenderer::new();
        let mut renderer = GuardedRenderer::new(Box::new(backend));
        let mut assets = SharedAssets::new(&mut renderer, &CombatPoolConfig::default());

        assert_eq!(log.borrow().geometries_created.len(), SharedAssets::GEOMETRY_COUNT);
        assert_eq!(log.borrow().materials_created.len(), SharedAssets::MATERIAL_COUNT);

        assert!(assets.dispose(&mut renderer));
        assert!(!assets.dispose(&mut renderer));

        let log = log.borrow();
        assert_eq!(log.geometries_disposed.len(), SharedAssets::GEOMETRY_COUNT);
        assert_eq!(log.materials_disposed.len(), SharedAssets::MATERIAL_COUNT);
        for handle in &log.materials_created {
            assert_eq!(log.material_dispose_count(*handle), 1);
        }
    }
}
