//! Shmup Core headless runner
//!
//! Drives the simulation with a scripted pilot at a fixed logic rate while a
//! simulated display asks for frames at its own rate, the way a real host
//! would. Useful for soak runs, replay checks and profiling.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use glam::IVec2;
use thiserror::Error;

use shmup_core::consts::{MAX_SUBSTEPS, TICK_RATE};
use shmup_core::renderer::prepare_frame;
use shmup_core::settings::{FilterMode, SimSettings};
use shmup_core::sim::spawn::populate_level;
use shmup_core::sim::{Checkpoint, GameEvent, GridMap, Sim, TickInput, tick};

#[derive(Parser, Debug)]
#[command(name = "shmup-core")]
#[command(about = "Headless soak runner for the shmup simulation core")]
struct Args {
    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Logic ticks to run
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// Simulated display refresh rate
    #[arg(long, default_value_t = 75)]
    render_hz: u32,
    /// Render filter: none, interpolate or extrapolate
    #[arg(long, value_parser = parse_filter)]
    filter: Option<FilterMode>,
    /// Level to populate
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Settings JSON file; unreadable files fall back to defaults
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Drop audio events instead of queueing them
    #[arg(long)]
    mute: bool,
    /// Write one checkpoint per tick to this JSON file
    #[arg(long)]
    checkpoints: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("failed to write checkpoints: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode checkpoints: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_filter(s: &str) -> Result<FilterMode, String> {
    FilterMode::from_str(s).ok_or_else(|| format!("unknown filter mode '{s}'"))
}

/// Two bases, a wall strip, open space around the centre.
fn demo_map(settings: &SimSettings) -> GridMap {
    let mut map = GridMap::new(settings.map_width, settings.map_height);
    let size = IVec2::new(settings.map_width, settings.map_height);
    map.build_base(size / 4, 3);
    map.build_base(IVec2::new(size.x * 3 / 4, size.y / 4), 2);
    map.build_wall(IVec2::new(size.x / 4, size.y * 3 / 4), IVec2::new(size.x / 2, 1));
    map
}

/// Circle the compass, half a turn of the stick every second, fire held.
fn scripted_input(tick: u64) -> TickInput {
    TickInput {
        dir: ((tick / TICK_RATE as u64 / 2) % 8 + 1) as u8,
        fire: tick % 4 != 0,
    }
}

#[derive(Debug, Default)]
struct RunStats {
    frames: u64,
    sprites: u64,
    kills: u64,
    dropped: u64,
    sounds: u64,
}

fn run(args: &Args) -> Result<(), RunError> {
    let mut settings = match &args.settings {
        Some(path) => SimSettings::load_or_default(path),
        None => SimSettings::default(),
    };
    if let Some(filter) = args.filter {
        settings.filter = filter;
    }
    let map = demo_map(&settings);
    let mut sim = Sim::new(settings, Box::new(map), args.seed);
    sim.audio.set_muted(args.mute);
    let placed = populate_level(&mut sim, args.level);
    log::info!("seed {} level {}: {} actors", args.seed, args.level, placed);

    let tick_dt = 1.0 / TICK_RATE as f64;
    let frame_dt = 1.0 / args.render_hz.max(1) as f64;
    let mut accumulator = 0.0;
    let mut stats = RunStats::default();
    let mut checkpoints: Vec<Checkpoint> = Vec::new();

    while sim.tick < args.ticks {
        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= tick_dt && substeps < MAX_SUBSTEPS && sim.tick < args.ticks {
            let input = scripted_input(sim.tick);
            tick(&mut sim, &input);
            accumulator -= tick_dt;
            substeps += 1;

            for event in sim.drain_events() {
                match event {
                    GameEvent::ActorKilled { .. } => stats.kills += 1,
                    GameEvent::SpawnDropped { .. } => stats.dropped += 1,
                    GameEvent::ShipDestroyed { x, y } => {
                        log::info!("ship lost at {x},{y} on tick {}", sim.tick);
                    }
                    _ => {}
                }
            }
            stats.sounds += sim.audio.drain().len() as u64;
            if args.checkpoints.is_some() {
                checkpoints.push(sim.checkpoint());
            }
        }
        if substeps == MAX_SUBSTEPS {
            log::debug!("frame {} hit the substep cap", stats.frames);
            accumulator = accumulator.min(tick_dt);
        }

        let frame = prepare_frame(&mut sim, (accumulator / tick_dt) as f32);
        stats.frames += 1;
        stats.sprites += frame.sprites.len() as u64;

        if !sim.ship.alive && sim.actors.live_count() == 0 {
            break;
        }
    }

    log::info!(
        "{} ticks, {} frames, avg {:.1} sprites/frame, {} kills, {} dropped spawns, {} sounds",
        sim.tick,
        stats.frames,
        stats.sprites as f64 / stats.frames.max(1) as f64,
        stats.kills,
        stats.dropped,
        stats.sounds
    );
    if sim.pool.violations() > 0 {
        log::warn!("object pool reported {} violations", sim.pool.violations());
    }
    println!(
        "score {} after {} ticks (ship {})",
        sim.score,
        sim.tick,
        if sim.ship.alive { "alive" } else { "lost" }
    );

    if let Some(path) = &args.checkpoints {
        let out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(out, &checkpoints)?;
        log::info!("wrote {} checkpoints to {}", checkpoints.len(), path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
