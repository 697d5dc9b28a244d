//! Entity creation seam.
//!
//! The spawner decides where, the difficulty controller decides how strong,
//! and an [`EntityFactory`] turns both into an [`Enemy`].

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use starfall_shared::Vec3;

use super::difficulty::DifficultyMultipliers;
use super::enemy::{ArchetypeTable, Enemy, EnemyArchetype};

/// Builds enemies at spawn points.
pub trait EntityFactory {
    /// Creates an enemy of `archetype` at `position` with scaled stats.
    fn create(
        &mut self,
        archetype: EnemyArchetype,
        position: Vec3,
        multipliers: &DifficultyMultipliers,
    ) -> Enemy;
}

/// Factory backed by the configured archetype table.
///
/// Each enemy gets a random spiral phase so a wave does not move in lockstep.
#[derive(Clone, Debug)]
pub struct ArchetypeFactory {
    table: ArchetypeTable,
    rng: ChaCha8Rng,
}

impl ArchetypeFactory {
    /// Creates a factory.
    #[must_use]
    pub const fn new(table: ArchetypeTable, rng: ChaCha8Rng) -> Self {
        Self { table, rng }
    }

    /// Base stats in use.
    #[must_use]
    pub const fn table(&self) -> &ArchetypeTable {
        &self.table
    }
}

impl EntityFactory for ArchetypeFactory {
    fn create(
        &mut self,
        archetype: EnemyArchetype,
        position: Vec3,
        multipliers: &DifficultyMultipliers,
    ) -> Enemy {
        let phase = self.rng.gen_range(0.0..std::f32::consts::TAU);
        Enemy::new(
            archetype,
            position,
            *self.table.get(archetype),
            multipliers,
            phase,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_scaled_stats() {
        let mut factory =
            ArchetypeFactory::new(ArchetypeTable::default(), ChaCha8Rng::seed_from_u64(1));
        let m = DifficultyMultipliers {
            health: 2.0,
            damage: 1.0,
            speed: 1.0,
        };
        let enemy = factory.create(EnemyArchetype::Heavy, Vec3::X, &m);
        assert!((enemy.max_health - 240.0).abs() < 1e-4);
        assert!((enemy.health - enemy.max_health).abs() < f32::EPSILON);
        assert!((0.0..std::f32::consts::TAU).contains(&enemy.phase));
        assert_eq!(enemy.position, Vec3::X);
    }
}
