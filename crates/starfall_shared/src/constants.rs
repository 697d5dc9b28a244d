//! # Simulation Constants
//!
//! Values every crate agrees on. Tunable gameplay numbers live in the TOML
//! configuration instead.

// =============================================================================
// FRAME LOOP
// =============================================================================

/// Nominal tick rate (ticks per second).
pub const TICK_RATE: u32 = 60;

/// Largest `dt` a single tick will integrate (seconds). Longer frames are
/// clamped so a hitch does not teleport entities through each other.
pub const MAX_TICK_DT: f32 = 0.1;

// =============================================================================
// WORLD
// =============================================================================

/// World up axis used for right-vector construction.
pub const WORLD_UP: crate::math::Vec3 = crate::math::Vec3::Y;

/// Fallback right axis when a direction is parallel to [`WORLD_UP`].
pub const FALLBACK_RIGHT: crate::math::Vec3 = crate::math::Vec3::X;
