//! Pool sizing and archetype tuning.
//!
//! Every table is optional in config files. A missing table falls back to
//! the built-in values; a present archetype table replaces that archetype's
//! tuning as a whole.

use serde::{Deserialize, Serialize};

use crate::effects::{EffectDefaults, EffectKind};
use crate::projectiles::{ProjectileDefaults, ProjectileKind};

/// Pre-allocation and growth step for one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizing {
    /// Objects constructed up front.
    pub initial: usize,
    /// Objects constructed each time the pool runs dry.
    pub expand: usize,
}

impl PoolSizing {
    /// Creates a sizing entry.
    #[must_use]
    pub const fn new(initial: usize, expand: usize) -> Self {
        Self { initial, expand }
    }
}

/// Sizing of every combat pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSizingTable {
    /// Beam projectiles.
    pub beam: PoolSizing,
    /// Guided projectiles.
    pub guided: PoolSizing,
    /// Area projectiles.
    pub area: PoolSizing,
    /// Kinetic projectiles.
    pub kinetic: PoolSizing,
    /// Muzzle flashes.
    pub muzzle_flash: PoolSizing,
    /// Trails.
    pub trail: PoolSizing,
    /// Impacts.
    pub impact: PoolSizing,
    /// Tracers.
    pub tracer: PoolSizing,
}

impl Default for PoolSizingTable {
    fn default() -> Self {
        Self {
            beam: PoolSizing::new(32, 8),
            guided: PoolSizing::new(16, 4),
            area: PoolSizing::new(8, 2),
            kinetic: PoolSizing::new(128, 32),
            muzzle_flash: PoolSizing::new(32, 8),
            trail: PoolSizing::new(16, 4),
            impact: PoolSizing::new(32, 8),
            tracer: PoolSizing::new(64, 16),
        }
    }
}

impl PoolSizingTable {
    /// Sizing of a projectile pool.
    #[must_use]
    pub const fn projectile(&self, kind: ProjectileKind) -> PoolSizing {
        match kind {
            ProjectileKind::Beam => self.beam,
            ProjectileKind::Guided => self.guided,
            ProjectileKind::Area => self.area,
            ProjectileKind::Kinetic => self.kinetic,
        }
    }

    /// Sizing of an effect pool.
    #[must_use]
    pub const fn effect(&self, kind: EffectKind) -> PoolSizing {
        match kind {
            EffectKind::MuzzleFlash => self.muzzle_flash,
            EffectKind::Trail => self.trail,
            EffectKind::Impact => self.impact,
            EffectKind::Tracer => self.tracer,
        }
    }
}

/// Tuning of every projectile archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Beam defaults.
    pub beam: ProjectileDefaults,
    /// Guided defaults.
    pub guided: ProjectileDefaults,
    /// Area defaults.
    pub area: ProjectileDefaults,
    /// Kinetic defaults.
    pub kinetic: ProjectileDefaults,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            beam: ProjectileDefaults::for_kind(ProjectileKind::Beam),
            guided: ProjectileDefaults::for_kind(ProjectileKind::Guided),
            area: ProjectileDefaults::for_kind(ProjectileKind::Area),
            kinetic: ProjectileDefaults::for_kind(ProjectileKind::Kinetic),
        }
    }
}

impl ProjectileTuning {
    /// Defaults of one archetype.
    #[must_use]
    pub const fn get(&self, kind: ProjectileKind) -> &ProjectileDefaults {
        match kind {
            ProjectileKind::Beam => &self.beam,
            ProjectileKind::Guided => &self.guided,
            ProjectileKind::Area => &self.area,
            ProjectileKind::Kinetic => &self.kinetic,
        }
    }
}

/// Tuning of every effect archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    /// Muzzle flash defaults.
    pub muzzle_flash: EffectDefaults,
    /// Trail defaults.
    pub trail: EffectDefaults,
    /// Impact defaults.
    pub impact: EffectDefaults,
    /// Tracer defaults.
    pub tracer: EffectDefaults,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            muzzle_flash: EffectDefaults::for_kind(EffectKind::MuzzleFlash),
            trail: EffectDefaults::for_kind(EffectKind::Trail),
            impact: EffectDefaults::for_kind(EffectKind::Impact),
            tracer: EffectDefaults::for_kind(EffectKind::Tracer),
        }
    }
}

impl EffectTuning {
    /// Defaults of one archetype.
    #[must_use]
    pub const fn get(&self, kind: EffectKind) -> &EffectDefaults {
        match kind {
            EffectKind::MuzzleFlash => &self.muzzle_flash,
            EffectKind::Trail => &self.trail,
            EffectKind::Impact => &self.impact,
            EffectKind::Tracer => &self.tracer,
        }
    }
}

/// Everything the pool manager needs to build its pools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatPoolConfig {
    /// Pool sizes.
    pub sizing: PoolSizingTable,
    /// Projectile archetypes.
    pub projectiles: ProjectileTuning,
    /// Effect archetypes.
    pub effects: EffectTuning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_fields() {
        let config = CombatPoolConfig::default();
        assert_eq!(config.sizing.projectile(ProjectileKind::Kinetic), config.sizing.kinetic);
        assert_eq!(config.sizing.effect(EffectKind::Tracer), config.sizing.tracer);
        assert!(config.projectiles.get(ProjectileKind::Guided).trail);
        assert!(!config.projectiles.get(ProjectileKind::Beam).trail);
        assert!(config.effects.get(EffectKind::Trail).max_points > 0);
    }
}
