#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Cube Push session.

mod board_view;

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cube_push_core::{Direction, GameStatus, WELCOME_BANNER};
use cube_push_persistence::{decode_json, encode_json, SaveSnapshot};
use cube_push_session::{GameSession, SessionConfig, SessionObserver};
use cube_push_system_spawning::Config as SpawningConfig;
use cube_push_world::{query, GameConfig};
use log::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "cube-push")]
#[command(about = "Plays a scripted Cube Push session and prints the resulting board")]
struct CliArgs {
    /// Board columns for a fresh game.
    #[arg(long, default_value_t = 10)]
    width: u32,
    /// Board rows for a fresh game.
    #[arg(long, default_value_t = 10)]
    height: u32,
    /// Seed for board and spawn timer randomness.
    #[arg(long)]
    seed: Option<u64>,
    /// Player moves as a string of N, E, S, W letters.
    #[arg(long, default_value = "")]
    moves: String,
    /// Simulated milliseconds between moves.
    #[arg(long, default_value_t = 500)]
    tick_ms: u64,
    /// Saved game to resume; a missing file starts a fresh game.
    #[arg(long)]
    load: Option<PathBuf>,
    /// Where to write the board after the run; removed instead once the game ends.
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Prints score and completion notifications as they happen.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_score_changed(&mut self, score: u32, level: u32) {
        info!("score {score} (level {level})");
    }

    fn on_game_complete(&mut self, success: bool, elapsed_seconds: f32) {
        let verdict = if success { "won" } else { "lost" };
        println!("Game {verdict} after {elapsed_seconds:.1}s");
    }
}

/// Entry point for the Cube Push command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let directions = parse_moves(&args.moves)?;
    let config = session_config(&args);
    let mut session = GameSession::new(config).context("invalid game configuration")?;
    let _ = session.subscribe(Box::new(ConsoleObserver));

    let saved = match &args.load {
        Some(path) => read_save(path)?,
        None => None,
    };
    let start = session.start_or_fresh(saved.as_ref());
    println!("{WELCOME_BANNER}");
    info!("started {start:?} game");

    let tick = Duration::from_millis(args.tick_ms);
    for direction in directions {
        if session.status() != GameStatus::Running {
            break;
        }
        let Some(from) = query::player_cell(session.world()) else {
            break;
        };
        if !session.try_move_player(from, direction) {
            info!("move {direction:?} from {from} had no effect");
        }
        session.tick(tick);
    }

    let world = session.world();
    print!("{}", board_view::render(world));
    println!("{}", board_view::legend(world));
    println!(
        "score {} | level {} | pushes {} | time {:.1}s | {:?}",
        query::score(world),
        query::level(world),
        query::push_count(world),
        query::elapsed_seconds(world),
        query::status(world)
    );

    if session.status() == GameStatus::Running {
        if let Some(path) = &args.save {
            let text = encode_json(&session.snapshot())?;
            fs::write(path, text)
                .with_context(|| format!("failed to write save to {}", path.display()))?;
            println!("saved to {}", path.display());
        }
    } else {
        // A finished game can never be resumed.
        for path in args.save.iter().chain(args.load.iter()) {
            remove_save(path)?;
        }
    }
    Ok(())
}

fn remove_save(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("removed save {}", path.display());
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => {
            Err(error).with_context(|| format!("failed to remove save {}", path.display()))
        }
    }
}

fn session_config(args: &CliArgs) -> SessionConfig {
    let mut game = GameConfig {
        width: args.width,
        height: args.height,
        ..GameConfig::default()
    };
    let mut spawning = SpawningConfig::default();
    if let Some(seed) = args.seed {
        game.rng_seed = seed;
        spawning = SpawningConfig::new(spawning.min_delay(), spawning.max_delay(), !seed);
    }
    SessionConfig { game, spawning }
}

fn parse_moves(moves: &str) -> Result<Vec<Direction>> {
    moves
        .chars()
        .filter(|letter| !letter.is_whitespace())
        .map(|letter| {
            Direction::from_letter(letter)
                .ok_or_else(|| anyhow!("unknown move '{letter}', expected one of N, E, S, W"))
        })
        .collect()
}

fn read_save(path: &Path) -> Result<Option<SaveSnapshot>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!("no save at {}, starting fresh", path.display());
            return Ok(None);
        }
        Err(error) => {
            return Err(error).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    match decode_json(&text) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(error) => {
            warn!("ignoring unreadable save {}: {error}", path.display());
            Ok(None)
        }
    }
}
