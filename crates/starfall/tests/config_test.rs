//! # Config Loading Test
//!
//! The shipped reference config must load, validate and describe the same
//! game as the built-in defaults.

use starfall::combat::{GuardedRenderer, ProjectileKind};
use starfall::{CombatSimulation, ConfigError, EnemyArchetype, FormationPattern, SimConfig};

fn reference_path() -> String {
    format!("{}/data/combat.toml", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_reference_config_loads() {
    let config = SimConfig::load(reference_path()).expect("reference config is valid");
    let defaults = SimConfig::default();

    assert_eq!(config.seed, 1337);
    assert_eq!(config.simulation.weapon, ProjectileKind::Beam);
    assert_eq!(config.simulation.archetype_weights, defaults.simulation.archetype_weights);
    assert_eq!(config.spawner.pattern, FormationPattern::Sphere);
    assert_eq!(config.spawner.count, defaults.spawner.count);
    assert_eq!(config.difficulty.thresholds.len(), defaults.difficulty.thresholds.len());
    assert_eq!(config.pools.sizing, defaults.pools.sizing);

    for archetype in EnemyArchetype::ALL {
        let loaded = config.archetypes.get(archetype);
        let builtin = defaults.archetypes.get(archetype);
        assert!((loaded.health - builtin.health).abs() < 1e-4, "{} health", archetype.name());
        assert!((loaded.speed - builtin.speed).abs() < 1e-4, "{} speed", archetype.name());
    }
}

#[test]
fn test_reference_config_runs() {
    let config = SimConfig::load(reference_path()).expect("reference config is valid");
    let mut sim = CombatSimulation::new(config, GuardedRenderer::headless()).expect("builds");
    for _ in 0..600 {
        sim.tick(1.0 / 60.0);
    }
    assert!(sim.stats().spawned > 0);
    assert!(sim.stats().shots_fired > 0);
}

#[test]
fn test_unsorted_thresholds_are_rejected() {
    let text = r"
        [[difficulty.thresholds]]
        time_secs = 60.0
        max_enemies = 10
        enemy_health = 1.0
        spawn_interval = 3.0

        [[difficulty.thresholds]]
        time_secs = 30.0
        max_enemies = 12
        enemy_health = 1.1
        spawn_interval = 2.0
    ";
    assert!(matches!(
        SimConfig::from_toml_str(text),
        Err(ConfigError::UnsortedThresholds { index: 1 })
    ));
}

#[test]
fn test_invalid_config_refuses_to_build() {
    let mut config = SimConfig::default();
    config.simulation.event_capacity = 0;
    assert!(CombatSimulation::new(config, GuardedRenderer::headless()).is_err());
}

#[test]
fn test_unknown_pattern_is_a_parse_error() {
    let err = SimConfig::from_toml_str("[spawner]\npattern = \"spiral\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
