//! # Session Integration Test
//!
//! Runs whole sessions through `CombatSimulation` and checks the event
//! stream, difficulty progression and pool hygiene.

use starfall::combat::{GuardedRenderer, ProjectileKind, RecordingRenderer};
use starfall::{
    AiState, CombatEvent, CombatSimulation, DestroyCause, EnemyArchetype, EntityRef, SimConfig, Vec3,
};

const DT: f32 = 1.0 / 60.0;

fn run_for(sim: &mut CombatSimulation, seconds: u32) {
    for _ in 0..seconds * 60 {
        sim.tick(DT);
    }
}

#[test]
fn test_opening_waves() {
    let mut sim = CombatSimulation::new(SimConfig::default(), GuardedRenderer::headless())
        .expect("default config builds");
    let events = sim.events();
    let mut spawned = 0;
    let mut waves = Vec::new();

    for _ in 0..130 * 60 {
        sim.tick(DT);
        for event in events.drain() {
            match event {
                CombatEvent::EntitySpawned { .. } => spawned += 1,
                CombatEvent::WaveStarted { level, .. } => waves.push(level),
                _ => {}
            }
        }
    }

    let stats = *sim.stats();
    assert_eq!(stats.ticks, 130 * 60);
    assert_eq!(spawned, stats.spawned);
    assert_eq!(waves, vec![1, 2]);
    assert_eq!(sim.difficulty().level(), 2);
    assert!(stats.kills + stats.detonations > 0);
    assert!(stats.peak_enemies <= 20);
}

#[test]
fn test_endless_mode_scales_live_enemies() {
    let mut sim = CombatSimulation::new(SimConfig::default(), GuardedRenderer::headless())
        .expect("default config builds");
    run_for(&mut sim, 180);
    let events = sim.events();
    events.drain();

    assert!(sim.enter_endless());
    assert!(!sim.enter_endless());
    assert!(matches!(
        events.try_recv(),
        Some(CombatEvent::EndlessModeEntered { minutes }) if (minutes - 3.0).abs() < 0.01
    ));

    let id = sim.spawn_enemy_at(EnemyArchetype::Heavy, Vec3::new(0.0, 0.0, 5000.0));
    let before = sim.ai().get(id).map(|e| e.max_health).unwrap_or_default();
    run_for(&mut sim, 60);
    let after = sim.ai().get(id).map(|e| e.max_health).unwrap_or_default();
    assert!(after > before, "max health {before} -> {after}");
}

#[test]
fn test_kamikaze_reaches_the_player() {
    let mut config = SimConfig::default();
    config.simulation.auto_fire = false;
    config.simulation.auto_spawn = false;
    let mut sim = CombatSimulation::new(config, GuardedRenderer::headless()).expect("builds");
    let events = sim.events();

    let id = sim.spawn_enemy_at(EnemyArchetype::Heavy, Vec3::new(0.0, 0.0, 300.0));
    run_for(&mut sim, 10);

    assert!(sim.ai().get(id).is_none());
    assert_eq!(sim.stats().detonations, 1);
    assert!((sim.player().shield - 55.0).abs() < 1e-3);
    assert!((sim.player().hull - 100.0).abs() < f32::EPSILON);

    let drained = events.drain();
    assert!(drained.contains(&CombatEvent::EntityDamaged {
        entity: EntityRef::Player,
        amount: 45.0,
        shield_absorbed: 45.0,
        remaining: 100.0,
    }));
    assert!(drained.iter().any(|e| matches!(
        e,
        CombatEvent::EntityDestroyed { cause: DestroyCause::Kamikaze, .. }
    )));
}

#[test]
fn test_kinetic_ricochets_off_shields() {
    let mut config = SimConfig::default();
    config.simulation.auto_fire = false;
    config.simulation.auto_spawn = false;
    let mut sim = CombatSimulation::new(config, GuardedRenderer::headless()).expect("builds");

    sim.spawn_enemy_at(EnemyArchetype::Heavy, Vec3::new(0.0, 0.0, 200.0));
    sim.fire(ProjectileKind::Kinetic, Vec3::Z);
    run_for(&mut sim, 1);

    assert_eq!(sim.stats().hits, 1);
    assert_eq!(sim.stats().ricochets, 1);
    assert_eq!(sim.stats().kills, 0);
}

#[test]
fn test_reset_scene_clears_enemies_and_projectiles() {
    let mut sim = CombatSimulation::new(SimConfig::default(), GuardedRenderer::headless())
        .expect("default config builds");
    run_for(&mut sim, 20);
    let events = sim.events();
    events.drain();

    let live = sim.ai().live_count();
    sim.reset_scene();

    assert_eq!(sim.ai().live_count(), 0);
    assert_eq!(sim.pools().active_projectile_count(), 0);
    let despawned = events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, CombatEvent::EntityDestroyed { cause: DestroyCause::Despawned, .. }))
        .count();
    assert_eq!(despawned, live);
}

#[test]
fn test_shutdown_releases_renderer_resources() {
    let (backend, log) = RecordingRenderer::new();
    let mut sim = CombatSimulation::new(SimConfig::default(), GuardedRenderer::new(Box::new(backend)))
        .expect("default config builds");
    run_for(&mut sim, 5);
    sim.shutdown();

    let log = log.borrow();
    assert!(log.attached.is_empty(), "{} nodes left in the scene", log.attached.len());
    assert!(log.adds > 0);
}

#[test]
fn test_undocking_resumes_pursuit() {
    let mut config = SimConfig::default();
    config.simulation.auto_fire = false;
    config.simulation.auto_spawn = false;
    let mut sim = CombatSimulation::new(config, GuardedRenderer::headless()).expect("builds");
    sim.spawn_enemy_at(EnemyArchetype::Standard, Vec3::new(0.0, 0.0, 900.0));

    sim.set_docked(true);
    run_for(&mut sim, 5);
    assert!(sim.ai().enemies().iter().all(|e| e.state == AiState::Dormant));

    sim.set_docked(false);
    sim.tick(DT);
    assert!(sim.ai().enemies().iter().all(|e| e.state == AiState::Pursuing));
}
