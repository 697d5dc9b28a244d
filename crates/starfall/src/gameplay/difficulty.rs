//! # Difficulty Scaling
//!
//! Two progression strategies:
//!
//! - **Threshold** - sorted `(time, max_enemies, enemy_health, spawn_interval)`
//!   breakpoints. Only new spawns see the values.
//! - **Endless** - continuous curve keyed on minutes survived. Switched on
//!   from outside, never switched off, and reapplied to live enemies every
//!   frame.
//!
//! ## Endless count curve
//!
//! ```text
//! scale(m) = 1 + m * linear                       m < 5
//! scale(m) = (1 + 5 * linear) * base^(m - 5)      m >= 5
//! ```
//!
//! Both branches agree at the knee.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::events::{CombatEvent, EventSender};

/// Minutes after which the endless count curve turns exponential.
pub const ENDLESS_KNEE_MINUTES: f32 = 5.0;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// One breakpoint of the threshold table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyThreshold {
    /// Elapsed seconds at which this level unlocks.
    pub time_secs: f32,
    /// Enemy cap.
    pub max_enemies: usize,
    /// Enemy health multiplier.
    pub enemy_health: f32,
    /// Seconds between spawns.
    pub spawn_interval: f32,
}

/// Endless-mode growth rates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndlessRates {
    /// Count scale growth per minute before the knee.
    pub linear_rate: f32,
    /// Count scale factor per minute after the knee.
    pub exp_base: f32,
    /// Health multiplier growth per minute.
    pub health_per_minute: f32,
    /// Damage multiplier growth per minute.
    pub damage_per_minute: f32,
    /// Speed multiplier growth per minute.
    pub speed_per_minute: f32,
}

impl Default for EndlessRates {
    fn default() -> Self {
        Self {
            linear_rate: 0.2,
            exp_base: 1.15,
            health_per_minute: 0.1,
            damage_per_minute: 0.05,
            speed_per_minute: 0.02,
        }
    }
}

/// Threshold table plus endless rates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Breakpoints sorted by time.
    pub thresholds: Vec<DifficultyThreshold>,
    /// Endless-mode rates.
    pub endless: EndlessRates,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        let level = |time_secs, max_enemies, enemy_health, spawn_interval| DifficultyThreshold {
            time_secs,
            max_enemies,
            enemy_health,
            spawn_interval,
        };
        Self {
            thresholds: vec![
                level(0.0, 10, 1.0, 3.0),
                level(60.0, 15, 1.2, 2.5),
                level(120.0, 20, 1.5, 2.0),
                level(180.0, 25, 1.8, 1.5),
                level(300.0, 30, 2.2, 1.0),
            ],
            endless: EndlessRates::default(),
        }
    }
}

impl DifficultyConfig {
    /// Checks the table is non-empty, sorted, starts at 0 s and never
    /// lowers health.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thresholds.is_empty() {
            return Err(ConfigError::EmptyThresholds);
        }
        for (index, pair) in self.thresholds.windows(2).enumerate() {
            if pair[1].time_secs < pair[0].time_secs {
                return Err(ConfigError::UnsortedThresholds { index: index + 1 });
            }
            if pair[1].enemy_health < pair[0].enemy_health {
                return Err(ConfigError::DecreasingHealth { index: index + 1 });
            }
        }
        if self.thresholds[0].time_secs.abs() > f32::EPSILON {
            return Err(ConfigError::InvalidValue {
                field: "difficulty.thresholds.time_secs",
                reason: "first breakpoint must be at 0 seconds",
            });
        }
        if self.thresholds.iter().any(|t| t.spawn_interval <= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "difficulty.thresholds.spawn_interval",
                reason: "must be positive",
            });
        }
        if self.endless.exp_base < 1.0 || self.endless.linear_rate < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "difficulty.endless",
                reason: "count curve must not shrink",
            });
        }
        Ok(())
    }
}

// ============================================================================
// CURVES
// ============================================================================

/// Index of the highest breakpoint reached at `elapsed_secs`.
///
/// Validated tables open at 0 s, so some breakpoint is always reached.
/// Negative times clamp to level 0.
#[must_use]
pub fn threshold_at(thresholds: &[DifficultyThreshold], elapsed_secs: f32) -> usize {
    thresholds
        .iter()
        .rposition(|t| t.time_secs <= elapsed_secs)
        .unwrap_or(0)
}

/// Endless enemy-count scale after `minutes`.
#[must_use]
pub fn endless_count_scale(minutes: f32, rates: &EndlessRates) -> f32 {
    let minutes = minutes.max(0.0);
    if minutes < ENDLESS_KNEE_MINUTES {
        1.0 + minutes * rates.linear_rate
    } else {
        (1.0 + ENDLESS_KNEE_MINUTES * rates.linear_rate)
            * rates.exp_base.powf(minutes - ENDLESS_KNEE_MINUTES)
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Stat multipliers applied to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMultipliers {
    /// Health.
    pub health: f32,
    /// Kamikaze damage.
    pub damage: f32,
    /// Movement speed.
    pub speed: f32,
}

impl Default for DifficultyMultipliers {
    fn default() -> Self {
        Self {
            health: 1.0,
            damage: 1.0,
            speed: 1.0,
        }
    }
}

/// Active progression strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyMode {
    /// Breakpoint table.
    Threshold,
    /// Continuous curve, anchored on the level reached when it was entered.
    Endless {
        /// Threshold level at entry.
        base_level: usize,
    },
}

/// Current difficulty as read by the spawner and the factory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySnapshot {
    /// Stat multipliers for new (and, in endless mode, live) enemies.
    pub multipliers: DifficultyMultipliers,
    /// Enemy cap.
    pub max_enemies: usize,
    /// Seconds between spawns.
    pub spawn_interval: f32,
}

/// Maps survival time to enemy strength.
pub struct DifficultyController {
    config: DifficultyConfig,
    elapsed: f32,
    level: usize,
    mode: DifficultyMode,
    current: DifficultySnapshot,
    events: EventSender,
}

impl DifficultyController {
    /// Creates a controller at level 0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the table fails validation.
    pub fn new(config: DifficultyConfig, events: EventSender) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            tracing::error!("rejecting difficulty table: {}", err);
            return Err(err);
        }
        let current = Self::threshold_snapshot(&config.thresholds[0]);
        Ok(Self {
            config,
            elapsed: 0.0,
            level: 0,
            mode: DifficultyMode::Threshold,
            current,
            events,
        })
    }

    /// Advances the clock and recomputes the snapshot.
    pub fn update(&mut self, dt: f32) -> DifficultySnapshot {
        self.elapsed += dt.max(0.0);

        match self.mode {
            DifficultyMode::Threshold => {
                let reached = threshold_at(&self.config.thresholds, self.elapsed);
                // One wave per level, even when a long frame skips several.
                while self.level < reached {
                    self.level += 1;
                    let threshold = self.config.thresholds[self.level];
                    tracing::info!(
                        "difficulty level {} at {:.0}s: max {} enemies, health x{:.2}",
                        self.level,
                        self.elapsed,
                        threshold.max_enemies,
                        threshold.enemy_health
                    );
                    self.events.send(CombatEvent::WaveStarted {
                        level: self.level,
                        max_enemies: threshold.max_enemies,
                    });
                }
                self.current = Self::threshold_snapshot(&self.config.thresholds[self.level]);
            }
            DifficultyMode::Endless { base_level } => {
                self.current = self.endless_snapshot(base_level);
            }
        }
        self.current
    }

    /// Switches to endless mode. Returns `false` if already endless.
    pub fn enter_endless(&mut self) -> bool {
        if self.is_endless() {
            return false;
        }
        let minutes = self.minutes();
        self.mode = DifficultyMode::Endless {
            base_level: self.level,
        };
        self.current = self.endless_snapshot(self.level);
        tracing::info!("endless mode entered after {:.1} minutes", minutes);
        self.events.send(CombatEvent::EndlessModeEntered { minutes });
        true
    }

    fn threshold_snapshot(threshold: &DifficultyThreshold) -> DifficultySnapshot {
        DifficultySnapshot {
            multipliers: DifficultyMultipliers {
                health: threshold.enemy_health,
                ..DifficultyMultipliers::default()
            },
            max_enemies: threshold.max_enemies,
            spawn_interval: threshold.spawn_interval,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn endless_snapshot(&self, base_level: usize) -> DifficultySnapshot {
        let base = self.config.thresholds[base_level];
        let rates = &self.config.endless;
        let minutes = self.minutes();
        let scale = endless_count_scale(minutes, rates);
        DifficultySnapshot {
            multipliers: DifficultyMultipliers {
                health: base.enemy_health * (1.0 + minutes * rates.health_per_minute),
                damage: 1.0 + minutes * rates.damage_per_minute,
                speed: 1.0 + minutes * rates.speed_per_minute,
            },
            max_enemies: (base.max_enemies as f32 * scale).round() as usize,
            spawn_interval: base.spawn_interval / scale,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub const fn current(&self) -> &DifficultySnapshot {
        &self.current
    }

    /// Current multipliers.
    #[must_use]
    pub const fn multipliers(&self) -> &DifficultyMultipliers {
        &self.current.multipliers
    }

    /// Whether endless mode is on.
    #[must_use]
    pub const fn is_endless(&self) -> bool {
        matches!(self.mode, DifficultyMode::Endless { .. })
    }

    /// Active mode.
    #[must_use]
    pub const fn mode(&self) -> DifficultyMode {
        self.mode
    }

    /// Highest threshold level reached.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Seconds since session start.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Minutes since session start.
    #[must_use]
    pub fn minutes(&self) -> f32 {
        self.elapsed / 60.0
    }
}

impl std::fmt::Debug for DifficultyController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifficultyController")
            .field("elapsed", &self.elapsed)
            .field("level", &self.level)
            .field("mode", &self.mode)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    fn controller() -> (DifficultyController, crate::events::EventReceiver) {
        let bus = EventBus::new(64);
        let c = DifficultyController::new(DifficultyConfig::default(), bus.sender())
            .expect("default table is valid");
        (c, bus.receiver())
    }

    #[test]
    fn test_threshold_health_is_monotonic() {
        let config = DifficultyConfig::default();
        let mut previous = 0.0_f32;
        for second in 0..600 {
            #[allow(clippy::cast_precision_loss)]
            let t = second as f32;
            let health = config.thresholds[threshold_at(&config.thresholds, t)].enemy_health;
            assert!(health >= previous);
            previous = health;
        }
    }

    #[test]
    fn test_knee_is_continuous() {
        let rates = EndlessRates::default();
        let below = endless_count_scale(ENDLESS_KNEE_MINUTES - 1e-4, &rates);
        let at = endless_count_scale(ENDLESS_KNEE_MINUTES, &rates);
        assert!((below - at).abs() < 1e-3);
        assert!((at - 2.0).abs() < 1e-6);
        assert!(endless_count_scale(6.0, &rates) > at);
        assert!((endless_count_scale(6.0, &rates) - 2.3).abs() < 1e-5);
    }

    #[test]
    fn test_levels_advance_with_events() {
        let (mut c, rx) = controller();
        for _ in 0..(61 * 60) {
            c.update(1.0 / 60.0);
        }
        assert_eq!(c.level(), 1);
        assert_eq!(c.current().max_enemies, 15);
        assert!((c.multipliers().health - 1.2).abs() < f32::EPSILON);

        let events = rx.drain();
        assert_eq!(
            events,
            vec![CombatEvent::WaveStarted {
                level: 1,
                max_enemies: 15
            }]
        );
    }

    #[test]
    fn test_endless_is_one_way() {
        let (mut c, rx) = controller();
        c.update(120.0);
        assert_eq!(c.level(), 2);

        assert!(c.enter_endless());
        assert!(!c.enter_endless());
        assert_eq!(c.mode(), DifficultyMode::Endless { base_level: 2 });

        // 2 minutes: scale 1.4, health 1.5 * 1.2.
        let snap = c.update(0.0);
        assert_eq!(snap.max_enemies, 28);
        assert!((snap.multipliers.health - 1.8).abs() < 1e-5);
        assert!((snap.multipliers.damage - 1.1).abs() < 1e-5);

        // Time never returns to threshold mode.
        c.update(600.0);
        assert!(c.is_endless());
        assert!(c.current().max_enemies > 28);

        let entered = rx
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::EndlessModeEntered { .. }))
            .count();
        assert_eq!(entered, 1);
    }

    #[test]
    fn test_validation() {
        let mut config = DifficultyConfig::default();
        config.thresholds.swap(1, 2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsortedThresholds { index: 2 })
        ));

        let mut config = DifficultyConfig::default();
        config.thresholds[3].enemy_health = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DecreasingHealth { index: 3 })
        ));

        let config = DifficultyConfig {
            thresholds: Vec::new(),
            ..DifficultyConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyThresholds)));

        let mut config = DifficultyConfig::default();
        config.thresholds[0].time_secs = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "difficulty.thresholds.time_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_long_frame_starts_every_skipped_wave() {
        let (mut c, rx) = controller();
        c.update(200.0);
        assert_eq!(c.level(), 3);
        assert_eq!(c.current().max_enemies, 25);

        let waves: Vec<_> = rx
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                CombatEvent::WaveStarted { level, max_enemies } => Some((level, max_enemies)),
                _ => None,
            })
            .collect();
        assert_eq!(waves, vec![(1, 15), (2, 20), (3, 25)]);

        // Nothing new until the next breakpoint.
        c.update(50.0);
        assert!(rx.drain().is_empty());
    }
}
