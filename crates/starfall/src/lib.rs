//! # STARFALL
//!
//! Headless space-combat simulation: pooled projectiles and effects, enemy
//! AI, formations and difficulty, driven by one frame loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          COMBAT SIMULATION                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │   Difficulty    │────>│    Spawner      │────>│    Enemy AI     │   │
//! │  │                 │     │                 │     │                 │   │
//! │  │  • Thresholds   │     │  • Formations   │     │  • Detection    │   │
//! │  │  • Endless      │     │  • Locators     │     │  • Pursuit      │   │
//! │  │  • Multipliers  │     │  • Factory      │     │  • Separation   │   │
//! │  └─────────────────┘     └─────────────────┘     └────────┬────────┘   │
//! │                                                           │            │
//! │           ┌─────────────────┐          ┌──────────────────┘            │
//! │           │  Pool Manager   │<─────────┘  hits / impacts               │
//! │           │                 │                                          │
//! │           │  • Projectiles  │          ┌─────────────────┐             │
//! │           │  • Effects      │          │   Event Bus     │ <── all     │
//! │           │  • Registry     │          │  (crossbeam)    │             │
//! │           └─────────────────┘          └─────────────────┘             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration for every tunable
//! - `error`: Config and simulation errors
//! - `events`: Combat event bus
//! - `game_loop`: The `CombatSimulation` frame loop
//! - `gameplay`: AI, formations, spawner, difficulty

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod gameplay;

// Re-export the building blocks
pub use starfall_combat as combat;
pub use starfall_core as core;
pub use starfall_shared as shared;

// Re-export commonly used types
pub use config::{ArchetypeWeights, SimConfig, SimulationSettings};
pub use error::{ConfigError, SimError, SimResult};
pub use events::{CombatEvent, DestroyCause, EventBus, EventReceiver, EventSender};
pub use game_loop::{
    CombatSimulation, HitBatch, HitRecord, SimStats, HIT_BATCH_POOL, TARGET_SCRATCH_POOL,
};
pub use starfall_shared::{EnemyId, EntityRef, Vec3};
pub use gameplay::{
    AiState, AiTuning, DifficultyConfig, DifficultyController, DifficultyMultipliers, Enemy,
    EnemyAi, EnemyArchetype, FormationPattern, PlayerState, Spawner, SpawnerConfig,
};
