//! # Simulation Configuration
//!
//! Every tunable number lives here, loaded from TOML. Missing sections and
//! fields fall back to defaults, so a config file only lists what it changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = SimConfig::load("crates/starfall/data/combat.toml")?;
//! let mut sim = CombatSimulation::new(config, GuardedRenderer::headless())?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use starfall_combat::{CombatPoolConfig, ProjectileKind};

use crate::error::ConfigError;
use crate::gameplay::{
    AiTuning, ArchetypeTable, DifficultyConfig, EnemyArchetype, PlayerConfig, SpawnerConfig,
};

/// Relative spawn weights per archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeWeights {
    /// Standard weight.
    pub standard: u32,
    /// Heavy weight.
    pub heavy: u32,
    /// Swift weight.
    pub swift: u32,
}

impl Default for ArchetypeWeights {
    fn default() -> Self {
        Self {
            standard: 6,
            heavy: 1,
            swift: 3,
        }
    }
}

impl ArchetypeWeights {
    /// Sum of all weights.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.standard + self.heavy + self.swift
    }

    /// Archetype for a roll in `0..total()`.
    #[must_use]
    pub const fn pick(&self, roll: u32) -> EnemyArchetype {
        if roll < self.standard {
            EnemyArchetype::Standard
        } else if roll < self.standard + self.heavy {
            EnemyArchetype::Heavy
        } else {
            EnemyArchetype::Swift
        }
    }
}

/// Frame-loop settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Event bus capacity.
    pub event_capacity: usize,
    /// Spawn enemies on the difficulty timer.
    pub auto_spawn: bool,
    /// Fire at the nearest enemy automatically.
    pub auto_fire: bool,
    /// Seconds between automatic shots.
    pub fire_interval: f32,
    /// Weapon used by automatic fire.
    pub weapon: ProjectileKind,
    /// Spawn mix.
    pub archetype_weights: ArchetypeWeights,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            event_capacity: 2048,
            auto_spawn: true,
            auto_fire: true,
            fire_interval: 0.25,
            weapon: ProjectileKind::Beam,
            archetype_weights: ArchetypeWeights::default(),
        }
    }
}

/// Root configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for every random stream.
    pub seed: u64,
    /// Frame-loop settings.
    pub simulation: SimulationSettings,
    /// Player ship.
    pub player: PlayerConfig,
    /// Enemy base stats.
    pub archetypes: ArchetypeTable,
    /// AI tunables.
    pub ai: AiTuning,
    /// Spawn points.
    pub spawner: SpawnerConfig,
    /// Difficulty curves.
    pub difficulty: DifficultyConfig,
    /// Projectile and effect pools.
    pub pools: CombatPoolConfig,
}

impl SimConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on bad syntax, or any validation error.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| {
            tracing::error!("config parse failed: {}", err);
            ConfigError::from(err)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SimConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            tracing::error!("cannot read config {}: {}", path.display(), source);
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(err) = &result {
            tracing::error!("invalid config: {}", err);
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.difficulty.validate()?;

        let invalid = |field, reason| Err(ConfigError::InvalidValue { field, reason });
        if self.simulation.event_capacity == 0 {
            return invalid("simulation.event_capacity", "must be at least 1");
        }
        if self.simulation.fire_interval <= 0.0 {
            return invalid("simulation.fire_interval", "must be positive");
        }
        if self.simulation.archetype_weights.total() == 0 {
            return invalid("simulation.archetype_weights", "at least one weight must be non-zero");
        }
        if self.ai.melee_distance <= 0.0 {
            return invalid("ai.melee_distance", "must be positive");
        }
        if self.ai.separation_factor < 0.0 || self.ai.separation_gain < 0.0 {
            return invalid("ai.separation", "factor and gain must not be negative");
        }
        if self.spawner.regeneration_distance < 0.0 {
            return invalid("spawner.regeneration_distance", "must not be negative");
        }
        if self.spawner.radius < 0.0 || self.spawner.fallback_distance < 0.0 {
            return invalid("spawner.radius", "must not be negative");
        }
        for archetype in EnemyArchetype::ALL {
            let stats = self.archetypes.get(archetype);
            if stats.health <= 0.0 || stats.speed < 0.0 || stats.collision_radius < 0.0 {
                return invalid("archetypes", "health must be positive, speed and radius non-negative");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::FormationPattern;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            seed = 42

            [spawner]
            pattern = "ring"
            count = 12

            [archetypes.heavy]
            health = 200.0
            shield = 50.0
            speed = 60.0
            kamikaze_damage = 40.0
            collision_radius = 10.0
            detection_range = 1500.0
            frequency = 0.0
            amplitude = 0.0
        "#;
        let config = SimConfig::from_toml_str(text).expect("valid config");
        assert_eq!(config.seed, 42);
        assert_eq!(config.spawner.pattern, FormationPattern::Ring);
        assert_eq!(config.spawner.count, 12);
        assert!((config.spawner.radius - 800.0).abs() < f32::EPSILON);
        assert!((config.archetypes.heavy.health - 200.0).abs() < f32::EPSILON);
        assert_eq!(config.archetypes.standard, ArchetypeTable::default().standard);
    }

    #[test]
    fn test_bad_syntax_and_bad_values() {
        assert!(matches!(
            SimConfig::from_toml_str("seed = ["),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("[simulation]\nfire_interval = 0.0"),
            Err(ConfigError::InvalidValue {
                field: "simulation.fire_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::load("/nonexistent/starfall.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_weights_pick() {
        let w = ArchetypeWeights::default();
        assert_eq!(w.pick(0), EnemyArchetype::Standard);
        assert_eq!(w.pick(6), EnemyArchetype::Heavy);
        assert_eq!(w.pick(9), EnemyArchetype::Swift);
    }
}
