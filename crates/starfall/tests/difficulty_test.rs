//! # Difficulty Integration Test
//!
//! Walks the controller through a long session and checks the curves the
//! frame loop relies on.

use starfall::gameplay::{endless_count_scale, DifficultySnapshot, EndlessRates};
use starfall::{CombatEvent, DifficultyConfig, DifficultyController, EventBus};

fn controller() -> (DifficultyController, EventBus) {
    let bus = EventBus::new(64);
    let controller =
        DifficultyController::new(DifficultyConfig::default(), bus.sender()).expect("defaults");
    (controller, bus)
}

/// Advances in whole seconds so breakpoints land exactly.
fn advance(controller: &mut DifficultyController, seconds: u32) -> DifficultySnapshot {
    let mut snapshot = *controller.current();
    for _ in 0..seconds {
        snapshot = controller.update(1.0);
    }
    snapshot
}

#[test]
fn test_threshold_session_never_eases_off() {
    let (mut controller, bus) = controller();
    let mut previous = *controller.current();

    for _ in 0..400 {
        let snapshot = controller.update(1.0);
        assert!(snapshot.max_enemies >= previous.max_enemies);
        assert!(snapshot.multipliers.health >= previous.multipliers.health);
        assert!(snapshot.spawn_interval <= previous.spawn_interval);
        previous = snapshot;
    }

    let levels: Vec<_> = bus
        .receiver()
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            CombatEvent::WaveStarted { level, .. } => Some(level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![1, 2, 3, 4]);
    assert_eq!(previous.max_enemies, 30);
}

#[test]
fn test_endless_from_last_level_keeps_growing() {
    let (mut controller, bus) = controller();
    advance(&mut controller, 300);
    assert_eq!(controller.level(), 4);
    bus.receiver().drain();

    assert!(controller.enter_endless());
    let at_entry = *controller.current();
    // 5 minutes in: linear part of the count curve.
    let expected = endless_count_scale(5.0, &EndlessRates::default());
    assert!((expected - 2.0).abs() < 1e-4);
    assert_eq!(at_entry.max_enemies, 60);
    assert!((at_entry.spawn_interval - 0.5).abs() < 1e-4);

    let later = advance(&mut controller, 600);
    assert!(later.max_enemies > at_entry.max_enemies);
    assert!(later.multipliers.health > at_entry.multipliers.health);
    assert!(later.multipliers.damage > at_entry.multipliers.damage);
    assert!(later.multipliers.speed > at_entry.multipliers.speed);
    assert!(later.spawn_interval < at_entry.spawn_interval);

    // No wave events once endless.
    assert!(bus
        .receiver()
        .drain()
        .iter()
        .all(|e| !matches!(e, CombatEvent::WaveStarted { .. })));
}

#[test]
fn test_count_curve_is_continuous_at_the_knee() {
    let rates = EndlessRates::default();
    let before = endless_count_scale(4.999, &rates);
    let after = endless_count_scale(5.001, &rates);
    assert!((after - before).abs() < 1e-2);
    assert!(endless_count_scale(10.0, &rates) > endless_count_scale(6.0, &rates));
}
