//! Headless platformer demo.
//!
//! Usage:
//!   cargo run -p platformer_sim -- [--config scene.json] [--frames 600] [--realtime]
//!
//! Loads a scene (or the built-in demo scene), then drives the player with a
//! scripted input: walk right, tap jump every 1.5 s, hold it every 4.5 s.
//! Per-tick controller state is logged at `trace`, e.g.
//!   RUST_LOG=platformer_sim=trace cargo run -p platformer_sim

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use platformer_shared::{
    anim::{IS_GROUNDED, IS_JUMPING, IS_WALKING},
    config::SceneConfig,
    input::InputState,
};
use platformer_sim::Simulation;
use tracing::info;

struct Args {
    config: Option<PathBuf>,
    frames: u64,
    realtime: bool,
}

fn parse_args() -> Args {
    let mut out = Args {
        config: None,
        frames: 600,
        realtime: false,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                out.frames = args[i + 1].parse().unwrap_or(600);
                i += 2;
            }
            "--realtime" => {
                out.realtime = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

fn load_scene(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read scene {}", path.display()))?;
    SceneConfig::from_json_str(&text).with_context(|| format!("parse scene {}", path.display()))
}

/// Walk right; short tap every 90 frames, long hold every 270.
fn scripted_input(frame: u64) -> InputState {
    let jump = if frame % 270 < 30 && frame >= 270 {
        true
    } else {
        frame % 90 < 4 && frame >= 60
    };
    InputState::new(1.0, 0.0, jump)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let cfg = load_scene(args.config.as_ref())?;
    info!(
        frame_hz = cfg.frame_hz,
        fixed_hz = cfg.fixed_hz,
        frames = args.frames,
        realtime = args.realtime,
        "Starting simulation"
    );

    let mut sim = Simulation::from_config(&cfg).context("build simulation")?;
    let player = cfg.players.first().and_then(|p| sim.entity_by_name(&p.name));
    let camera = cfg.cameras.first().and_then(|c| sim.entity_by_name(&c.name));

    let frame_interval = Duration::from_secs_f32(cfg.frame_delta());
    let mut next_frame = tokio::time::Instant::now();

    for frame in 0..args.frames {
        sim.frame(scripted_input(frame), cfg.frame_delta());

        if frame % u64::from(cfg.frame_hz) == 0 {
            if let Some(player) = player {
                let state = sim.locomotion(player).map(|l| *l.state());
                let anim = sim.animator(player);
                info!(
                    frame,
                    position = ?sim.position(player),
                    grounded = ?state.map(|s| s.is_grounded),
                    jumping = ?state.map(|s| s.is_jumping),
                    anim_grounded = ?anim.map(|a| a.flag(IS_GROUNDED)),
                    anim_jumping = ?anim.map(|a| a.flag(IS_JUMPING)),
                    anim_walking = ?anim.map(|a| a.flag(IS_WALKING)),
                    "Player"
                );
            }
            if let Some(camera) = camera {
                info!(frame, position = ?sim.position(camera), "Camera");
            }
        }

        if args.realtime {
            next_frame += frame_interval;
            tokio::time::sleep_until(next_frame).await;
        }
    }

    info!(frames = args.frames, elapsed = sim.time().elapsed, "Simulation finished");
    Ok(())
}
