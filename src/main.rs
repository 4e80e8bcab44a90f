use anyhow::Result;
use clap::Parser;
use snake_arcade::audio::{AudioSink, Muted, TerminalBell};
use snake_arcade::game::{GameConfig, GameEngine};
use snake_arcade::modes::PlayMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snake-arcade")]
#[command(version, about = "Classic snake in the terminal")]
struct Cli {
    /// JSON file with pacing settings (initial_interval_ms, interval_step_ms, min_interval_ms)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the terminal bell
    #[arg(long)]
    mute: bool,

    /// Ring the bell on collisions only, not when food is eaten
    #[arg(long, conflicts_with = "mute")]
    no_eat_chime: bool,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    snake_arcade::logging::init(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let engine = match cli.seed {
        Some(seed) => GameEngine::seeded(config, seed),
        None => GameEngine::from_entropy(config),
    };

    let audio: Box<dyn AudioSink> = if cli.mute {
        Box::new(Muted)
    } else if cli.no_eat_chime {
        Box::new(TerminalBell::stderr().without_eat_chime())
    } else {
        Box::new(TerminalBell::stderr())
    };

    let mut play_mode = PlayMode::new(engine, audio);
    play_mode.run().await?;

    Ok(())
}
