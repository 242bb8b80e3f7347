use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pac_sim::engine::{Game, GameOptions};
use pac_sim::high_score::{FileHighScoreStore, HighScoreStore, MemoryHighScore};
use pac_sim::notify::Notification;
use pac_sim::rng::Rng;
use pac_sim::settings::Settings;
use pac_sim::types::{Direction, GameStatus};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1)]
    seed: u32,
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    #[arg(long, default_value_t = 12)]
    turn_every: u64,
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    high_score: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u32,
    ticks: u64,
    #[serde(rename = "simulatedMs")]
    simulated_ms: u64,
    #[serde(rename = "gamesStarted")]
    games_started: u32,
    status: GameStatus,
    level: u32,
    score: u32,
    lives: u32,
    #[serde(rename = "highScore")]
    high_score: u32,
    notifications: BTreeMap<&'static str, u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::demo().context("building demo settings")?,
    };
    let store: Box<dyn HighScoreStore> = match &cli.high_score {
        Some(path) => Box::new(FileHighScoreStore::new(path.clone())),
        None => Box::new(MemoryHighScore::default()),
    };

    let mut game = Game::new(settings, store, GameOptions { seed: cli.seed });
    let counters: Vec<(Notification, Arc<AtomicU32>)> = Notification::ALL
        .iter()
        .map(|&kind| {
            let counter = Arc::new(AtomicU32::new(0));
            let handle = Arc::clone(&counter);
            game.subscribe(kind, move || {
                handle.fetch_add(1, Ordering::Relaxed);
            });
            (kind, counter)
        })
        .collect();

    info!(seed = cli.seed, ticks = cli.ticks, tick_ms = cli.tick_ms, "simulation started");
    let mut player = Rng::new(cli.seed ^ 0x9e37_79b9);
    game.start_game();
    game.press_start();

    let turn_every = cli.turn_every.max(1);
    let mut now_ms = 0;
    for tick in 0..cli.ticks {
        now_ms = tick * cli.tick_ms;
        if game.status() == GameStatus::AttractMode {
            debug!(tick, score = game.score(), "restarting after game over");
            game.press_start();
        }
        if tick % turn_every == 0 {
            if let Some(direction) = player.pick_direction(&Direction::ALL) {
                game.change_direction(direction);
            }
        }
        game.tick(now_ms);
    }

    let notifications: BTreeMap<&'static str, u32> = counters
        .iter()
        .map(|(kind, counter)| (kind.as_str(), counter.load(Ordering::Relaxed)))
        .collect();
    let summary = RunSummary {
        seed: cli.seed,
        ticks: cli.ticks,
        simulated_ms: now_ms,
        games_started: notifications
            .get(Notification::GameBeginning.as_str())
            .copied()
            .unwrap_or(0),
        status: game.status(),
        level: game.level(),
        score: game.score(),
        lives: game.lives(),
        high_score: game.high_score(),
        notifications,
    };
    info!(score = summary.score, high_score = summary.high_score, "simulation finished");
    println!(
        "{}",
        serde_json::to_string(&summary).context("serializing run summary")?
    );
    Ok(())
}
