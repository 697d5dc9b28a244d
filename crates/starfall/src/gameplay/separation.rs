//! # Separation Forces
//!
//! Keeps enemies from stacking on top of each other. Every pair closer than
//! `(r_a + r_b) * factor` pushes apart with equal and opposite force
//! `dir * (threshold - d) / threshold`.
//!
//! Two accumulators share one pair function:
//!
//! - [`accumulate_brute_force`] - every `i < j` pair, O(n²)
//! - [`SpatialGrid::accumulate`] - uniform hash grid, only neighbouring cells
//!
//! The grid visits the same pairs in the same `(i, j)` order, so both produce
//! bit-identical results.

use std::collections::HashMap;

use starfall_shared::Vec3;

/// Minimal view of an entity for separation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeparationBody {
    /// World position.
    pub position: Vec3,
    /// Collision radius.
    pub radius: f32,
}

/// Push direction for bodies sitting exactly on top of each other.
const COINCIDENT_DIRECTION: Vec3 = Vec3::X;

/// Force on `a` from `b`, or `None` if they are far enough apart.
///
/// `b` receives the exact negation.
#[inline]
#[must_use]
pub fn pair_force(a: &SeparationBody, b: &SeparationBody, factor: f32) -> Option<Vec3> {
    let threshold = (a.radius + b.radius) * factor;
    if threshold <= 0.0 {
        return None;
    }
    let delta = a.position - b.position;
    let d2 = delta.length_squared();
    if d2 >= threshold * threshold {
        return None;
    }
    let d = d2.sqrt();
    let dir = if d > f32::EPSILON {
        delta / d
    } else {
        COINCIDENT_DIRECTION
    };
    Some(dir * ((threshold - d) / threshold))
}

#[inline]
fn apply_pair(bodies: &[SeparationBody], forces: &mut [Vec3], i: usize, j: usize, factor: f32) {
    if let Some(f) = pair_force(&bodies[i], &bodies[j], factor) {
        forces[i] += f;
        forces[j] -= f;
    }
}

/// O(n²) reference accumulator.
///
/// `forces` is resized to `bodies.len()` and overwritten.
pub fn accumulate_brute_force(bodies: &[SeparationBody], factor: f32, forces: &mut Vec<Vec3>) {
    forces.clear();
    forces.resize(bodies.len(), Vec3::ZERO);
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            apply_pair(bodies, forces, i, j, factor);
        }
    }
}

// ============================================================================
// SPATIAL GRID
// ============================================================================

type CellKey = (i32, i32, i32);

/// Uniform spatial hash for neighbour queries.
///
/// Cell size is the largest possible pair threshold, so every interacting
/// pair lies in the same or an adjacent cell. Buffers are reused across
/// frames.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cells: HashMap<CellKey, Vec<usize>>,
    pairs: Vec<(usize, usize)>,
}

impl SpatialGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same contract as [`accumulate_brute_force`].
    pub fn accumulate(&mut self, bodies: &[SeparationBody], factor: f32, forces: &mut Vec<Vec3>) {
        let max_radius = bodies.iter().map(|b| b.radius).fold(0.0_f32, f32::max);
        let cell_size = 2.0 * max_radius * factor;
        if !(cell_size.is_finite() && cell_size > 0.0) {
            accumulate_brute_force(bodies, factor, forces);
            return;
        }

        forces.clear();
        forces.resize(bodies.len(), Vec3::ZERO);

        self.cells.clear();
        for (index, body) in bodies.iter().enumerate() {
            self.cells
                .entry(cell_of(body.position, cell_size))
                .or_default()
                .push(index);
        }

        self.pairs.clear();
        for (i, body) in bodies.iter().enumerate() {
            let (cx, cy, cz) = cell_of(body.position, cell_size);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let key = (
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        );
                        if let Some(members) = self.cells.get(&key) {
                            self.pairs
                                .extend(members.iter().filter(|&&j| j > i).map(|&j| (i, j)));
                        }
                    }
                }
            }
        }

        // Saturated keys at the edge of i32 can repeat a cell.
        self.pairs.sort_unstable();
        self.pairs.dedup();

        for &(i, j) in &self.pairs {
            apply_pair(bodies, forces, i, j, factor);
        }
    }

    /// Candidate pairs found by the last [`SpatialGrid::accumulate`].
    #[must_use]
    pub fn candidate_pairs(&self) -> usize {
        self.pairs.len()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(position: Vec3, cell_size: f32) -> CellKey {
    (
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
        (position.z / cell_size).floor() as i32,
    )
}
