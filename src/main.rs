//! Rat Arena Playback
//!
//! Replays a seeded synthetic match and checks that every seek path lands on
//! the same state.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use playback::{
    core::hash::short_hex,
    playback::render::DrawCommand,
    testkit::{synthetic_events, SyntheticOptions},
    Game, PlaybackConfig, PlaybackMode, SPEC_VERSION, VERSION,
};

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Rat Arena Playback v{} (log format {})", VERSION, SPEC_VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            PlaybackConfig::from_json_str(&json).with_context(|| format!("parsing {}", path))?
        }
        None => PlaybackConfig::default(),
    };
    info!(
        "Snapshot every {} rounds, streaming margin {}",
        config.snapshot_every, config.streaming_margin
    );

    demo_replay(config)
}

/// Replay a synthetic match and verify seek determinism.
fn demo_replay(config: PlaybackConfig) -> Result<()> {
    info!("=== Building Synthetic Match ===");

    let options = SyntheticOptions { rounds: 200, config: config.clone(), ..Default::default() };
    let events = synthetic_events(&options);
    info!("Seed {}: {} events", options.seed, events.len());

    let mut game = Game::from_events(events, config)?;
    let winner = game.winner().map(|t| t.name.clone()).unwrap_or_default();
    let game_match = game.current_match_mut().context("log contained no match")?;
    info!(
        "Map {}x{}, {} rounds, snapshots at {:?}",
        game_match.static_map().width,
        game_match.static_map().height,
        game_match.max_round(),
        game_match.snapshot_rounds()
    );

    // Forward seek from the start
    let target = game_match.max_round() / 2 + 3;
    game_match.jump_to_round(target)?;
    let forward = game_match.fingerprint()?;
    info!("Round {} via forward seek: {}", target, short_hex(&forward));

    // Overshoot then come back through a snapshot
    game_match.jump_to_end()?;
    info!("Round {} (end): {}", game_match.max_round(), short_hex(&game_match.fingerprint()?));
    game_match.jump_to_round(target)?;
    let backward = game_match.fingerprint()?;
    info!("Round {} via snapshot: {}", target, short_hex(&backward));

    if forward != backward {
        bail!("Seek diverged at round {}: {} vs {}", target, hex::encode(forward), hex::encode(backward));
    }
    info!("SEEK VERIFIED: fingerprints match");

    // Timed playback, per turn then per round
    game_match.set_playback_mode(PlaybackMode::PerTurn)?;
    let mut turn_steps = 0;
    for _ in 0..10 {
        let (_, turn_stepped) = game_match.step_simulation_by_time(1.0)?;
        if turn_stepped {
            turn_steps += 1;
        }
    }
    info!(
        "Per-turn playback: {} steps, now round {} turn {}",
        turn_steps,
        game_match.current_round().round_number(),
        game_match.current_round().turn_number()
    );

    game_match.set_playback_mode(PlaybackMode::PerRound)?;
    game_match.step_simulation_by_time(2.5)?;
    game_match.step_simulation_by_time(0.4)?;
    info!(
        "Per-round playback: round {}, interpolation {:.2}",
        game_match.current_round().round_number(),
        game_match.interpolation_factor()
    );

    // One frame
    let ctx = game_match.render_context();
    let mut frame: Vec<DrawCommand> = Vec::new();
    game_match.draw(&ctx, &mut frame);
    let sprites = frame.iter().filter(|c| matches!(c, DrawCommand::Body { .. })).count();
    info!("Frame: {} commands, {} body sprites", frame.len(), sprites);

    if let Some(stat) = game_match.current_stat() {
        for (team, team_stat) in stat.teams() {
            info!(
                "Team {}: {} cheese, {} baby rats, {} rat kings",
                team, team_stat.cheese_amount, team_stat.baby_rat_count, team_stat.rat_king_count
            );
        }
    } else {
        warn!("No stat for round {}", game_match.current_round().round_number());
    }

    game_match.log_position()?;
    info!("=== Winner: {} ===", winner);
    Ok(())
}
