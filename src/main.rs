//! Bug Chase headless runner
//!
//! Plays a scripted session without a window: an autopilot chicken hunts the
//! nearest bug and dodges eagles, while events and the score are logged.

use std::path::PathBuf;
use std::process::ExitCode;

use bug_chase::sim::{GameEvent, GameState, Kind, TickInput, tick};
use bug_chase::{ConfigError, SimConfig};
use clap::Parser;
use glam::Vec2;

/// Distance at which the autopilot starts running from an eagle
const DODGE_DISTANCE: f32 = 250.0;

#[derive(Parser)]
#[command(name = "bug-chase")]
#[command(about = "Bug Chase - chase the bugs, avoid the eagles (headless)", long_about = None)]
struct Cli {
    /// JSON config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 3600)]
    frames: u32,
    /// Frame time in milliseconds
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f32,
    /// Override the config seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// Start in advance mode (vortices, stones, eggs)
    #[arg(short, long)]
    advance: bool,
    /// Write the effective config to this path and continue
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mesh(#[from] bug_chase::sim::MeshError),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(points) => {
            log::info!("Final score: {points}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u32, RunError> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.advance {
        config.mode.advance = true;
    }
    config.validate()?;
    if let Some(path) = &cli.save_config {
        config.save(path)?;
    }

    log::info!(
        "Bug Chase starting: {} frames at {} ms, seed {}, {} mode",
        cli.frames,
        cli.frame_ms,
        config.seed,
        if config.mode.advance { "advance" } else { "basic" }
    );

    let mut state = GameState::new(&config)?;
    let mut deaths = 0u32;
    for _ in 0..cli.frames {
        let input = autopilot(&state);
        tick(&mut state, &input, cli.frame_ms, &config);

        for event in state.drain_events() {
            match event {
                GameEvent::ChickenDied => {
                    deaths += 1;
                    log::info!("Frame {}: chicken died", state.frame);
                }
                GameEvent::ChickenAte { points } => {
                    log::info!("Frame {}: ate a bug ({points} points)", state.frame);
                }
                GameEvent::Restarted => log::info!("Frame {}: restarted", state.frame),
                GameEvent::ModeChanged { advance } => {
                    log::info!("Frame {}: advance mode = {advance}", state.frame)
                }
            }
        }
    }

    log::info!(
        "{} frames simulated, {} deaths, {} entities alive",
        state.frame,
        deaths,
        state.registry.len()
    );
    Ok(state.points)
}

/// Arrow-key input that walks toward the closest bug unless an eagle is near
fn autopilot(state: &GameState) -> TickInput {
    let Some(chicken) = state.player_entity() else {
        return TickInput::default();
    };
    let pos = chicken.motion.position;

    let nearest = |kind: Kind| {
        state
            .registry
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.motion.position)
            .min_by(|a, b| {
                a.distance_squared(pos)
                    .partial_cmp(&b.distance_squared(pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    };

    let heading = match nearest(Kind::Eagle) {
        Some(eagle) if eagle.distance(pos) < DODGE_DISTANCE => pos - eagle,
        _ => nearest(Kind::Bug).map_or(Vec2::ZERO, |bug| bug - pos),
    };

    // Cursor straight to the left keeps the chicken at angle 0, so the
    // arrow keys map onto screen axes
    TickInput {
        cursor: Some(pos - Vec2::new(100.0, 0.0)),
        move_left: heading.x < -1.0,
        move_right: heading.x > 1.0,
        move_up: heading.y < -1.0,
        move_down: heading.y > 1.0,
        ..Default::default()
    }
}
