//! Instance records for renderer upload.
//!
//! One record per active projectile or effect, laid out for a 16-byte
//! aligned instance buffer.

use bytemuck::{Pod, Zeroable};

use crate::effects::Effect;
use crate::projectiles::Projectile;

/// Instance category stored in `params[0]`.
pub const INSTANCE_PROJECTILE: u32 = 0;
/// Instance category stored in `params[0]`.
pub const INSTANCE_EFFECT: u32 = 1;

/// Per-instance data sent to the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// World position (xyz) + uniform scale (w).
    pub position_scale: [f32; 4],
    /// Rotation quaternion (xyzw).
    pub rotation: [f32; 4],
    /// RGB + opacity.
    pub color: [f32; 4],
    /// Category, archetype index, material handle, unused.
    pub params: [u32; 4],
}

impl RenderInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Record for a projectile.
    #[must_use]
    pub fn from_projectile(projectile: &Projectile) -> Self {
        let t = &projectile.transform;
        Self {
            position_scale: [t.position.x, t.position.y, t.position.z, t.scale],
            rotation: [t.rotation.x, t.rotation.y, t.rotation.z, t.rotation.w],
            color: projectile.color,
            params: [
                INSTANCE_PROJECTILE,
                kind_index(projectile.kind.index()),
                projectile.material.0,
                0,
            ],
        }
    }

    /// Record for an effect.
    #[must_use]
    pub fn from_effect(effect: &Effect) -> Self {
        let t = &effect.transform;
        let [r, g, b, a] = effect.color;
        Self {
            position_scale: [t.position.x, t.position.y, t.position.z, t.scale],
            rotation: [t.rotation.x, t.rotation.y, t.rotation.z, t.rotation.w],
            color: [r, g, b, a * effect.opacity],
            params: [
                INSTANCE_EFFECT,
                kind_index(effect.kind.index()),
                effect.draw_material().0,
                0,
            ],
        }
    }
}

fn kind_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout() {
        assert_eq!(RenderInstance::SIZE, 64);
        let instances = [RenderInstance::default(); 4];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 256);
    }
}
