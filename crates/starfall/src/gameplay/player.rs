//! Player state as seen by the combat core.
//!
//! Enemies only read the position. The one write path is
//! [`PlayerState::apply_damage`], used by kamikaze detonations.

use serde::{Deserialize, Serialize};
use starfall_shared::Vec3;

/// Starting player stats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn position.
    pub position: Vec3,
    /// Shield capacity.
    pub shield: f32,
    /// Hull capacity.
    pub hull: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            shield: 100.0,
            hull: 100.0,
        }
    }
}

/// Split of one hit between shield and hull.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Absorbed by the shield.
    pub shield_absorbed: f32,
    /// Taken by the hull.
    pub hull_damage: f32,
}

/// The player's ship.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// World position.
    pub position: Vec3,
    /// Current shield.
    pub shield: f32,
    /// Shield cap.
    pub max_shield: f32,
    /// Current hull.
    pub hull: f32,
    /// Hull cap.
    pub max_hull: f32,
}

impl PlayerState {
    /// Fresh player from config.
    #[must_use]
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            position: config.position,
            shield: config.shield,
            max_shield: config.shield,
            hull: config.hull,
            max_hull: config.hull,
        }
    }

    /// Shield first, remainder to hull. Hull stops at zero.
    pub fn apply_damage(&mut self, amount: f32) -> DamageReport {
        let amount = amount.max(0.0);
        let shield_absorbed = amount.min(self.shield);
        self.shield -= shield_absorbed;
        let hull_damage = (amount - shield_absorbed).min(self.hull);
        self.hull -= hull_damage;
        DamageReport {
            shield_absorbed,
            hull_damage,
        }
    }

    /// Hull is gone.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.hull <= 0.0
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shield_then_hull() {
        let mut player = PlayerState::default();
        let report = player.apply_damage(130.0);
        assert!((report.shield_absorbed - 100.0).abs() < f32::EPSILON);
        assert!((report.hull_damage - 30.0).abs() < f32::EPSILON);
        assert!((player.hull - 70.0).abs() < f32::EPSILON);

        player.apply_damage(500.0);
        assert!(player.is_destroyed());
        assert!(player.hull.abs() < f32::EPSILON);
    }
}
