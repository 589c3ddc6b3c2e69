use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Storage key the high score is kept under
pub const DEFAULT_HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Largest board side, in cells, the terminal renderer can lay out
pub const MAX_TILE_COUNT: i32 = 255;

/// Configuration for the game
///
/// Every field has a default, so a config file only needs to name the
/// values it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square drawing surface, in pixels
    pub surface_size: u32,
    /// Side length of one grid cell, in pixels
    pub grid_size: u32,
    /// Period of the game loop tick, in milliseconds
    pub tick_interval_ms: u64,
    /// Points awarded per food eaten
    pub food_points: u32,
    /// Key the high score is persisted under
    pub high_score_key: String,
    /// Random draws tried before falling back to enumerating free cells
    pub max_food_attempts: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            surface_size: 400,
            grid_size: 20,
            tick_interval_ms: 150,
            food_points: 10,
            high_score_key: DEFAULT_HIGH_SCORE_KEY.to_string(),
            max_food_attempts: 256,
        }
    }
}

impl GameConfig {
    /// Create a configuration for a surface and cell size
    pub fn new(surface_size: u32, grid_size: u32) -> Self {
        Self {
            surface_size,
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self::new(200, 20)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Number of cells along each side of the board
    pub fn tile_count(&self) -> i32 {
        if self.grid_size == 0 {
            return 0;
        }
        (self.surface_size / self.grid_size) as i32
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check that the configuration describes a playable board
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size == 0 {
            return Err("grid_size must be at least 1".to_string());
        }

        if self.surface_size % self.grid_size != 0 {
            return Err(format!(
                "surface_size ({}) must be a multiple of grid_size ({})",
                self.surface_size, self.grid_size
            ));
        }

        if self.tile_count() < 2 {
            return Err(format!(
                "board must be at least 2x2 cells, got {}x{}",
                self.tile_count(),
                self.tile_count()
            ));
        }

        if self.tile_count() > MAX_TILE_COUNT {
            return Err(format!(
                "surface_size / grid_size must be at most {MAX_TILE_COUNT} cells, got {}",
                self.tile_count()
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be at least 1".to_string());
        }

        if self.food_points == 0 {
            return Err("food_points must be at least 1".to_string());
        }

        if self.high_score_key.is_empty() {
            return Err("high_score_key must not be empty".to_string());
        }

        Ok(())
    }
}
