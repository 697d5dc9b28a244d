//! # Gameplay Systems
//!
//! Everything that decides what enemies do:
//! - Enemy entities and the AI engine (detection, pursuit, separation, kamikaze)
//! - Formations and the spawner
//! - Difficulty scaling
//! - The player as enemies see it

pub mod ai;
pub mod difficulty;
pub mod enemy;
pub mod factory;
pub mod formation;
pub mod player;
pub mod separation;
pub mod spawner;

pub use ai::{
    blend_separation, lateral_right, spiral_offset, AiFrameReport, AiTuning, EnemyAi,
    HEAVY_SPEED_FACTOR, MAX_SEPARATION_INFLUENCE, SWIFT_SPEED_FACTOR, SWIFT_ZIGZAG_FREQUENCY,
};
pub use difficulty::{
    endless_count_scale, threshold_at, DifficultyConfig, DifficultyController,
    DifficultyMode, DifficultyMultipliers, DifficultySnapshot, DifficultyThreshold,
    EndlessRates, ENDLESS_KNEE_MINUTES,
};
pub use enemy::{AiState, ArchetypeStats, ArchetypeTable, Enemy, EnemyArchetype, EnemyDamage};
pub use factory::{ArchetypeFactory, EntityFactory};
pub use formation::{FormationParams, FormationPattern};
pub use player::{DamageReport, PlayerConfig, PlayerState};
pub use separation::{accumulate_brute_force, pair_force, SeparationBody, SpatialGrid};
pub use spawner::{
    FallbackChain, FixedLocator, LastKnownPosition, PlayerLocator, PositionCell, Spawner,
    SpawnerConfig, TrackedPosition,
};
