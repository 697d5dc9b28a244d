//! # Memory Management
//!
//! Recycling pools for transient combat objects.
//!
//! ## Design Philosophy
//!
//! Objects are constructed once and reused. During combat:
//! - `get` hands out an available object, growing the pool linearly if empty
//! - `release` resets the object and makes it available again
//! - Releasing twice, or releasing something this pool never handed out, is a no-op

mod pool;
mod registry;
mod stats;

pub use pool::{ObjectPool, PoolHandle};
pub use registry::{Clearable, PoolRegistry, Resettable};
pub use stats::{PoolStats, PoolStatsSnapshot};
