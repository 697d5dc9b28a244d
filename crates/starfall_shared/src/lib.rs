//! # STARFALL Shared
//!
//! Common types used by the pools, the AI engine and the frame loop.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on renderer, audio or windowing crates.
//! Renderer-facing types belong in `starfall_combat::scene`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod ids;
pub mod math;

pub use constants::{FALLBACK_RIGHT, MAX_TICK_DT, TICK_RATE, WORLD_UP};
pub use ids::{EnemyId, EntityRef};
pub use math::{Quaternion, Transform, Vec3};
