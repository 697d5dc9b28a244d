//! # Combat Simulation (headless)
//!
//! Runs a full session at 60 Hz with a fixed seed and prints what happened.
//!
//! ```text
//! combat_sim [CONFIG.toml] [SECONDS]
//! ```
//!
//! Without a config file the built-in defaults are used. Endless mode is
//! switched on halfway through, so both difficulty modes get exercised.

use std::process::ExitCode;
use std::time::Instant;

use starfall::combat::GuardedRenderer;
use starfall::shared::TICK_RATE;
use starfall::{CombatEvent, CombatSimulation, SimConfig, SimResult};

const DEFAULT_SEED: u64 = 0x5747_4641_4C4C;
const DEFAULT_SECONDS: u32 = 600;

/// Event totals drained from the bus.
#[derive(Default)]
struct EventTally {
    spawned: usize,
    damaged: usize,
    destroyed: usize,
    waves: usize,
}

impl EventTally {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::EntitySpawned { .. } => self.spawned += 1,
            CombatEvent::EntityDamaged { .. } => self.damaged += 1,
            CombatEvent::EntityDestroyed { .. } => self.destroyed += 1,
            CombatEvent::WaveStarted { level, max_enemies } => {
                self.waves += 1;
                println!("[WAVE] level {level}, up to {max_enemies} enemies");
            }
            CombatEvent::EndlessModeEntered { minutes } => {
                println!("[ENDLESS] entered after {minutes:.1} minutes");
            }
        }
    }
}

fn run(config: SimConfig, seconds: u32) -> SimResult<()> {
    let mut sim = CombatSimulation::new(config, GuardedRenderer::headless())?;
    let events = sim.events();
    let mut tally = EventTally::default();

    let total_ticks = u64::from(seconds) * u64::from(TICK_RATE);
    #[allow(clippy::cast_precision_loss)]
    let dt = 1.0 / TICK_RATE as f32;

    let start = Instant::now();
    for tick in 0..total_ticks {
        if tick == total_ticks / 2 {
            sim.enter_endless();
        }
        sim.tick(dt);
        // Drain every frame so the bounded bus never drops.
        for event in events.drain() {
            tally.record(&event);
        }
        if sim.player().is_destroyed() {
            println!("[PLAYER] destroyed at tick {tick}");
            break;
        }
    }
    let elapsed = start.elapsed();

    println!();
    sim.stats().print_summary();
    println!();
    println!("┌─ EVENTS ───────────────────────────────────────────────────────┐");
    println!("│ Spawned:            {}", tally.spawned);
    println!("│ Damaged:            {}", tally.damaged);
    println!("│ Destroyed:          {}", tally.destroyed);
    println!("│ Waves:              {}", tally.waves);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ TIMING ───────────────────────────────────────────────────────┐");
    println!("│ Real Time:          {:.3} seconds", elapsed.as_secs_f64());
    println!("│ Simulated Time:     {seconds} seconds");
    println!("│ Difficulty Level:   {}", sim.difficulty().level());
    println!("│ Endless:            {}", sim.difficulty().is_endless());
    println!("│ Pool Hit Rate:      {:.1}%", sim.registry().global_stats().hit_rate() * 100.0);
    println!("└──────────────────────────────────────────────────────────────────┘");

    sim.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              STARFALL - HEADLESS COMBAT SIMULATION               ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => {
                println!("Loaded config: {path}");
                config
            }
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig {
            seed: DEFAULT_SEED,
            ..SimConfig::default()
        },
    };

    let seconds = match args.next().map(|raw| raw.parse::<u32>()) {
        None => DEFAULT_SECONDS,
        Some(Ok(seconds)) => seconds,
        Some(Err(err)) => {
            eprintln!("error: invalid duration: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("Seed: {:#x}, duration: {seconds} s", config.seed);
    println!();

    match run(config, seconds) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
