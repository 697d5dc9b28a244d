//! Beam projectiles: straight and fast. Motion is the default ballistic step.

use super::{ProjectileBehavior, ProjectileKind};

/// Beam motion.
#[derive(Debug, Default)]
pub struct BeamBehavior;

impl ProjectileBehavior for BeamBehavior {
    const KIND: ProjectileKind = ProjectileKind::Beam;
}
