//! # STARFALL Core
//!
//! Object pooling for the combat simulation:
//! - Hundreds of transient entities per second (projectiles, flashes, trails)
//! - No allocation pauses once the pools are warm
//! - Stale references are detected, never dereferenced
//!
//! ## Architecture Rules
//!
//! 1. **Recycle, don't allocate** - Objects are reset and reused
//! 2. **Never fail on exhaustion** - Pools grow linearly instead
//! 3. **Misconfiguration fails loudly** - Unknown registry keys are errors
//!
//! ## Example
//!
//! ```rust,ignore
//! use starfall_core::ObjectPool;
//!
//! let mut pool = ObjectPool::new(|| 0u32, |v| *v = 0, 64, 16);
//! let handle = pool.get();
//! *pool.get_mut(handle).unwrap() = 7;
//! pool.release(handle);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod memory;

pub use error::{PoolError, PoolResult};
pub use memory::{
    Clearable, ObjectPool, PoolHandle, PoolRegistry, PoolStats, PoolStatsSnapshot, Resettable,
};
