//! # Spawner
//!
//! Decides where new enemies appear. Points come from a
//! [`FormationPattern`] centered on the player, and are only regenerated
//! once the player has moved far enough from the last center.
//!
//! The player position is looked up through a [`PlayerLocator`]. Locators
//! compose, so the lookup chain is decided at wiring time:
//!
//! ```rust,ignore
//! let cell = PositionCell::new(Some(Vec3::ZERO));
//! let locator = FallbackChain::new()
//!     .with(TrackedPosition::new(cell.clone()))
//!     .with(FixedLocator(Some(Vec3::ZERO)));
//! let mut spawner = Spawner::new(Box::new(locator), SpawnerConfig::default(), rng);
//! let points = spawner.generate_spawn_points(false);
//! ```

use std::cell::Cell;
use std::rc::Rc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use starfall_shared::Vec3;

use super::difficulty::DifficultyMultipliers;
use super::enemy::{Enemy, EnemyArchetype};
use super::factory::EntityFactory;
use super::formation::{self, FormationParams, FormationPattern};

// ============================================================================
// PLAYER LOCATORS
// ============================================================================

/// Resolves the player's current position.
pub trait PlayerLocator {
    /// Player position, or `None` if it cannot be resolved right now.
    fn locate(&self) -> Option<Vec3>;
}

/// Shared, writable player position.
///
/// The simulation writes it each tick; locators read it.
#[derive(Clone, Debug, Default)]
pub struct PositionCell(Rc<Cell<Option<Vec3>>>);

impl PositionCell {
    /// Creates a cell.
    #[must_use]
    pub fn new(position: Option<Vec3>) -> Self {
        Self(Rc::new(Cell::new(position)))
    }

    /// Stores a position (`None` when the player is gone).
    pub fn set(&self, position: Option<Vec3>) {
        self.0.set(position);
    }

    /// Reads the position.
    #[must_use]
    pub fn get(&self) -> Option<Vec3> {
        self.0.get()
    }
}

/// Reads a [`PositionCell`].
#[derive(Clone, Debug)]
pub struct TrackedPosition(PositionCell);

impl TrackedPosition {
    /// Tracks `cell`.
    #[must_use]
    pub const fn new(cell: PositionCell) -> Self {
        Self(cell)
    }
}

impl PlayerLocator for TrackedPosition {
    fn locate(&self) -> Option<Vec3> {
        self.0.get()
    }
}

/// Remembers the last position `inner` resolved and answers with it while
/// `inner` cannot.
#[derive(Debug)]
pub struct LastKnownPosition<L> {
    inner: L,
    last: Cell<Option<Vec3>>,
}

impl<L: PlayerLocator> LastKnownPosition<L> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: L) -> Self {
        Self {
            inner,
            last: Cell::new(None),
        }
    }
}

impl<L: PlayerLocator> PlayerLocator for LastKnownPosition<L> {
    fn locate(&self) -> Option<Vec3> {
        match self.inner.locate() {
            Some(position) => {
                self.last.set(Some(position));
                Some(position)
            }
            None => self.last.get(),
        }
    }
}

/// Always answers the same thing.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedLocator(pub Option<Vec3>);

impl PlayerLocator for FixedLocator {
    fn locate(&self) -> Option<Vec3> {
        self.0
    }
}

/// Tries each locator in order; first answer wins.
#[derive(Default)]
pub struct FallbackChain(Vec<Box<dyn PlayerLocator>>);

impl FallbackChain {
    /// Empty chain (never resolves).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a lower-priority locator.
    #[must_use]
    pub fn with(mut self, locator: impl PlayerLocator + 'static) -> Self {
        self.0.push(Box::new(locator));
        self
    }
}

impl PlayerLocator for FallbackChain {
    fn locate(&self) -> Option<Vec3> {
        self.0.iter().find_map(|l| l.locate())
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("locators", &self.0.len())
            .finish()
    }
}

// ============================================================================
// SPAWNER
// ============================================================================

/// Spawn-point generation settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Formation layout.
    pub pattern: FormationPattern,
    /// Points per set.
    pub count: usize,
    /// Pattern radius.
    pub radius: f32,
    /// Ring inner radius.
    pub inner_radius: f32,
    /// Ring outer radius.
    pub outer_radius: f32,
    /// Player displacement that triggers a new set.
    pub regeneration_distance: f32,
    /// Radius of the fallback ring when the set is empty.
    pub fallback_distance: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            pattern: FormationPattern::Sphere,
            count: 24,
            radius: 800.0,
            inner_radius: 600.0,
            outer_radius: 1000.0,
            regeneration_distance: 250.0,
            fallback_distance: 800.0,
        }
    }
}

impl SpawnerConfig {
    fn params(&self) -> FormationParams {
        FormationParams {
            count: self.count,
            radius: self.radius,
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius,
        }
    }
}

/// Computes and hands out spawn points around the player.
pub struct Spawner {
    locator: Box<dyn PlayerLocator>,
    config: SpawnerConfig,
    rng: ChaCha8Rng,
    points: Vec<Vec3>,
    last_center: Option<Vec3>,
    player_lost: bool,
}

impl Spawner {
    /// Creates a spawner with no points yet.
    #[must_use]
    pub fn new(locator: Box<dyn PlayerLocator>, config: SpawnerConfig, rng: ChaCha8Rng) -> Self {
        Self {
            locator,
            config,
            rng,
            points: Vec::new(),
            last_center: None,
            player_lost: false,
        }
    }

    /// Current point set, regenerated if the player moved at least the
    /// regeneration distance or `force` is set.
    ///
    /// An unresolvable player centers the set on the origin.
    pub fn generate_spawn_points(&mut self, force: bool) -> &[Vec3] {
        let center = match self.locator.locate() {
            Some(position) => {
                self.player_lost = false;
                position
            }
            None => {
                if !self.player_lost {
                    tracing::warn!("player position unresolved, spawning around origin");
                    self.player_lost = true;
                }
                Vec3::ZERO
            }
        };

        let regen = self.config.regeneration_distance;
        let moved = match self.last_center {
            Some(last) => last.distance_squared(center) >= regen * regen,
            None => true,
        };

        if force || moved {
            self.points = formation::generate(
                self.config.pattern,
                center,
                &self.config.params(),
                &mut self.rng,
            );
            self.last_center = Some(center);
            tracing::debug!(
                "regenerated {} {:?} spawn points around ({:.0}, {:.0}, {:.0})",
                self.points.len(),
                self.config.pattern,
                center.x,
                center.y,
                center.z
            );
        }
        &self.points
    }

    /// A random point from the current set, or a point on the fallback ring
    /// around the last center when the set is empty.
    pub fn get_random_spawn_point(&mut self) -> Vec3 {
        if self.points.is_empty() {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let center = self.last_center.unwrap_or(Vec3::ZERO);
            return center
                + Vec3::new(angle.cos(), 0.0, angle.sin()) * self.config.fallback_distance;
        }
        let index = self.rng.gen_range(0..self.points.len());
        self.points[index]
    }

    /// Picks a point and has `factory` build an enemy there.
    pub fn spawn(
        &mut self,
        factory: &mut dyn EntityFactory,
        archetype: EnemyArchetype,
        multipliers: &DifficultyMultipliers,
    ) -> Enemy {
        let position = self.get_random_spawn_point();
        factory.create(archetype, position, multipliers)
    }

    /// Switches pattern; the next call regenerates.
    pub fn set_pattern(&mut self, pattern: FormationPattern) {
        self.config.pattern = pattern;
        self.last_center = None;
    }

    /// Current point set.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Center of the current set.
    #[must_use]
    pub const fn last_center(&self) -> Option<Vec3> {
        self.last_center
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &SpawnerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner")
            .field("config", &self.config)
            .field("points", &self.points.len())
            .field("last_center", &self.last_center)
            .finish_non_exhaustive()
    }
}
