//! # STARFALL Combat Pools
//!
//! Pooled projectiles and visual effects for the combat simulation.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────────┐
//!   fire / spawn ───>│    CombatPoolManager     │──── update(dt) once per frame
//!                    │  (routes by archetype)   │
//!                    └────────────┬─────────────┘
//!          ┌──────────────┬───────┴───────┬──────────────┐
//!          v              v               v              v
//!   ProjectilePool  ProjectilePool   EffectPool     EffectPool   ... one per archetype
//!    <Kinetic>        <Guided>        <Flash>        <Tracer>
//!          │              │               │              │
//!          └──────────────┴───────┬───────┴──────────────┘
//!                                 v
//!                          GuardedRenderer  (add / remove / dispose)
//! ```
//!
//! ## Modules
//!
//! - `scene`: Renderer facade, handles, recording backend
//! - `config`: Pool sizes and archetype tuning
//! - `assets`: Shared geometry/material handles (built once)
//! - `projectiles`: Projectile archetypes and their pools
//! - `effects`: Effect archetypes and their pools
//! - `manager`: The facade the simulation talks to
//! - `instance`: Pod records for renderer instance buffers

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod assets;
pub mod config;
pub mod effects;
pub mod instance;
pub mod manager;
pub mod projectiles;
pub mod scene;

pub use assets::SharedAssets;
pub use config::{CombatPoolConfig, EffectTuning, PoolSizing, PoolSizingTable, ProjectileTuning};
pub use effects::{Effect, EffectBehavior, EffectDefaults, EffectHandle, EffectKind, EffectPool};
pub use instance::RenderInstance;
pub use manager::{ActiveProjectile, CombatPoolManager};
pub use projectiles::{
    Projectile, ProjectileBehavior, ProjectileDefaults, ProjectileHandle, ProjectileKind,
    ProjectilePool, MAX_RICOCHETS, RICOCHET_DAMAGE_DECAY, RICOCHET_SPEED_DECAY,
};
pub use scene::{
    GeometryDesc, GeometryHandle, GuardedRenderer, MaterialDesc, MaterialHandle, NodeId, NodePart,
    RecordingRenderer, RenderBackend, RenderLog, SceneNode,
};
