//! # Formation Patterns
//!
//! Pure point generators. The pattern is configuration data, picked by tag.
//!
//! | Pattern       | Shape                                             |
//! |---------------|---------------------------------------------------|
//! | `sphere`      | Fibonacci lattice on a sphere of `radius`         |
//! | `hemisphere`  | Fibonacci lattice on the upper half               |
//! | `circle`      | Evenly spaced on a horizontal circle              |
//! | `ring`        | Evenly spaced angles, random radius inner..outer  |
//! | `grid`        | Horizontal square grid spanning `2 * radius`      |
//! | `random_cloud`| Uniform inside a ball of `radius`                 |
//!
//! Deterministic patterns ignore the rng; random ones consume it, so a
//! seeded rng reproduces the same set.

use rand::Rng;
use serde::{Deserialize, Serialize};
use starfall_shared::Vec3;

/// Spawn-point layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationPattern {
    /// Full sphere.
    #[default]
    Sphere,
    /// Horizontal circle.
    Circle,
    /// Horizontal annulus.
    Ring,
    /// Upper half sphere.
    Hemisphere,
    /// Horizontal grid.
    Grid,
    /// Random points in a ball.
    RandomCloud,
}

impl FormationPattern {
    /// Resolves a tag. Unknown tags fall back to [`FormationPattern::Sphere`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "sphere" => Self::Sphere,
            "circle" => Self::Circle,
            "ring" => Self::Ring,
            "hemisphere" => Self::Hemisphere,
            "grid" => Self::Grid,
            "random_cloud" | "cloud" | "random" => Self::RandomCloud,
            other => {
                tracing::warn!("unknown formation pattern '{}', using sphere", other);
                Self::Sphere
            }
        }
    }
}

/// Shape parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormationParams {
    /// Number of points.
    pub count: usize,
    /// Radius for sphere, hemisphere, circle, grid and cloud.
    pub radius: f32,
    /// Ring inner radius.
    pub inner_radius: f32,
    /// Ring outer radius.
    pub outer_radius: f32,
}

/// Golden angle in radians.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Generates `params.count` points around `center`.
#[must_use]
pub fn generate<R: Rng + ?Sized>(
    pattern: FormationPattern,
    center: Vec3,
    params: &FormationParams,
    rng: &mut R,
) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(params.count);
    match pattern {
        FormationPattern::Sphere => fibonacci(center, params, false, &mut points),
        FormationPattern::Hemisphere => fibonacci(center, params, true, &mut points),
        FormationPattern::Circle => circle(center, params, &mut points),
        FormationPattern::Ring => ring(center, params, rng, &mut points),
        FormationPattern::Grid => grid(center, params, &mut points),
        FormationPattern::RandomCloud => cloud(center, params, rng, &mut points),
    }
    points
}

#[allow(clippy::cast_precision_loss)]
fn fibonacci(center: Vec3, params: &FormationParams, upper_only: bool, out: &mut Vec<Vec3>) {
    let n = params.count as f32;
    for i in 0..params.count {
        let t = (i as f32 + 0.5) / n;
        let y = if upper_only { 1.0 - t } else { 1.0 - 2.0 * t };
        let r = (1.0 - y * y).max(0.0).sqrt();
        let theta = GOLDEN_ANGLE * i as f32;
        out.push(center + Vec3::new(theta.cos() * r, y, theta.sin() * r) * params.radius);
    }
}

#[allow(clippy::cast_precision_loss)]
fn circle(center: Vec3, params: &FormationParams, out: &mut Vec<Vec3>) {
    let step = std::f32::consts::TAU / params.count.max(1) as f32;
    for i in 0..params.count {
        let angle = step * i as f32;
        out.push(center + Vec3::new(angle.cos(), 0.0, angle.sin()) * params.radius);
    }
}

#[allow(clippy::cast_precision_loss)]
fn ring<R: Rng + ?Sized>(center: Vec3, params: &FormationParams, rng: &mut R, out: &mut Vec<Vec3>) {
    let inner = params.inner_radius.min(params.outer_radius);
    let outer = params.inner_radius.max(params.outer_radius);
    let step = std::f32::consts::TAU / params.count.max(1) as f32;
    for i in 0..params.count {
        let angle = step * i as f32;
        let radius = if outer > inner {
            rng.gen_range(inner..outer)
        } else {
            inner
        };
        out.push(center + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius);
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn grid(center: Vec3, params: &FormationParams, out: &mut Vec<Vec3>) {
    if params.count == 0 {
        return;
    }
    let side = (params.count as f32).sqrt().ceil().max(1.0) as usize;
    let spacing = if side > 1 {
        2.0 * params.radius / (side - 1) as f32
    } else {
        0.0
    };
    let half = spacing * (side - 1) as f32 * 0.5;
    for i in 0..params.count {
        let col = (i % side) as f32;
        let row = (i / side) as f32;
        out.push(center + Vec3::new(col * spacing - half, 0.0, row * spacing - half));
    }
}

fn cloud<R: Rng + ?Sized>(center: Vec3, params: &FormationParams, rng: &mut R, out: &mut Vec<Vec3>) {
    for _ in 0..params.count {
        let y: f32 = rng.gen_range(-1.0..=1.0);
        let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let r = (1.0 - y * y).max(0.0).sqrt();
        let u: f32 = rng.gen();
        let distance = params.radius * u.cbrt();
        out.push(center + Vec3::new(theta.cos() * r, y, theta.sin() * r) * distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(count: usize) -> FormationParams {
        FormationParams {
            count,
            radius: 100.0,
            inner_radius: 50.0,
            outer_radius: 80.0,
        }
    }

    #[test]
    fn test_sphere_points_on_surface() {
        let center = Vec3::new(10.0, -5.0, 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let points = generate(FormationPattern::Sphere, center, &params(40), &mut rng);
        assert_eq!(points.len(), 40);
        for p in &points {
            assert!((p.distance(center) - 100.0).abs() < 1e-2);
        }
        assert!(points.iter().any(|p| p.y < center.y));
    }

    #[test]
    fn test_hemisphere_stays_above_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let points = generate(FormationPattern::Hemisphere, Vec3::ZERO, &params(25), &mut rng);
        assert!(points.iter().all(|p| p.y > 0.0));
    }

    #[test]
    fn test_ring_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let points = generate(FormationPattern::Ring, Vec3::ZERO, &params(64), &mut rng);
        for p in &points {
            let d = p.length();
            assert!((49.99..=80.01).contains(&d));
            assert!(p.y.abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_grid_is_centered() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let points = generate(FormationPattern::Grid, Vec3::ZERO, &params(9), &mut rng);
        assert_eq!(points.len(), 9);
        assert!(points.contains(&Vec3::ZERO));
        assert!(points.contains(&Vec3::new(-100.0, 0.0, -100.0)));
        assert!(points.contains(&Vec3::new(100.0, 0.0, 100.0)));
    }

    #[test]
    fn test_cloud_is_reproducible() {
        let a = generate(
            FormationPattern::RandomCloud,
            Vec3::ZERO,
            &params(30),
            &mut ChaCha8Rng::seed_from_u64(7),
        );
        let b = generate(
            FormationPattern::RandomCloud,
            Vec3::ZERO,
            &params(30),
            &mut ChaCha8Rng::seed_from_u64(7),
        );
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.length() <= 100.0 + 1e-3));
    }

    #[test]
    fn test_pattern_tags() {
        assert_eq!(FormationPattern::from_tag("ring"), FormationPattern::Ring);
        assert_eq!(FormationPattern::from_tag("cloud"), FormationPattern::RandomCloud);
        assert_eq!(FormationPattern::from_tag("wedge"), FormationPattern::Sphere);
    }
}
