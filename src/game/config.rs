use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Columns of the playing field
pub const GRID_WIDTH: usize = 40;
/// Rows of the playing field
pub const GRID_HEIGHT: usize = 30;

/// Configuration for the game
///
/// The grid is fixed for the lifetime of an engine and is never read from a
/// config file; only the pacing can be tuned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    #[serde(skip, default = "fixed_grid_width")]
    pub grid_width: usize,
    /// Height of the game grid
    #[serde(skip, default = "fixed_grid_height")]
    pub grid_height: usize,
    /// Tick interval at the start of every game, in milliseconds
    pub initial_interval_ms: u64,
    /// How much faster each eaten food makes the game, in milliseconds
    pub interval_step_ms: u64,
    /// The interval never drops below this, in milliseconds
    pub min_interval_ms: u64,
}

fn fixed_grid_width() -> usize {
    GRID_WIDTH
}

fn fixed_grid_height() -> usize {
    GRID_HEIGHT
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
            initial_interval_ms: 150,
            interval_step_ms: 5,
            min_interval_ms: 50,
        }
    }
}

impl GameConfig {
    /// Create a configuration with a custom grid size and default pacing
    pub fn with_grid(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::with_grid(10, 10)
    }

    /// Load pacing settings from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must have at least one cell"
        );
        ensure!(self.interval_step_ms > 0, "interval_step_ms must be positive");
        ensure!(self.min_interval_ms > 0, "min_interval_ms must be positive");
        ensure!(
            self.min_interval_ms <= self.initial_interval_ms,
            "min_interval_ms ({}) exceeds initial_interval_ms ({})",
            self.min_interval_ms,
            self.initial_interval_ms
        );
        Ok(())
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn interval_step(&self) -> Duration {
        Duration::from_millis(self.interval_step_ms)
    }

    /// Number of cells on the grid
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}
