use anyhow::{Context, Result, anyhow};
use clap::Parser;
use grid_snake::game::GameConfig;
use grid_snake::modes::HumanMode;
use grid_snake::storage::{HighScoreStore, JsonFileStore, MemoryStore};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Classic snake on a grid, in the terminal")]
struct Cli {
    /// JSON file with game settings; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Side of the square board surface, in pixels
    #[arg(long)]
    surface_size: Option<u32>,

    /// Side of one grid cell, in pixels
    #[arg(long)]
    grid_size: Option<u32>,

    /// File the high score is kept in
    #[arg(long, default_value = ".grid_snake.json")]
    store: PathBuf,

    /// Keep the high score for this session only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_tracing(path)?;
    }

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(surface_size) = cli.surface_size {
        config.surface_size = surface_size;
    }
    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {e}"))?;

    let store: Box<dyn HighScoreStore> = if cli.no_persist {
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::new(&cli.store, config.high_score_key.clone()))
    };

    tracing::info!(
        tiles = config.tile_count(),
        tick_ms = config.tick_interval_ms,
        "starting"
    );

    let mut human_mode = HumanMode::new(config, store);
    human_mode.run().await?;

    Ok(())
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
