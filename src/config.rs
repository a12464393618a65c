use std::time::Duration;

use thiserror::Error;

use crate::grid::Grid;

/// Blocks across the play field when no width is given.
pub const DEFAULT_BLOCKS_WIDE: i32 = 40;
pub const DEFAULT_BLOCKS_HIGH: i32 = 20;
pub const DEFAULT_BLOCK_SIZE: i32 = 50;
/// 10 logic updates per second.
pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_FRAME_MS: u64 = 5;

/// The smallest grid an apple can still spawn inside with its 1-cell margin.
const MIN_GRID_SIDE: i32 = 3;
/// Keeps terminal-wide pixel maths (65535 columns) inside `i32`.
pub const MAX_BLOCK_SIZE: i32 = 1000;
/// Upper bound on either side of the field in pixels.
const MAX_FIELD_PIXELS: i64 = 1 << 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid of {width}x{height} is too small, both sides must be at least {min}")]
    GridTooSmall { width: i32, height: i32, min: i32 },
    #[error("block size must be between 1 and {max}, got {block_size}")]
    InvalidBlockSize { block_size: i32, max: i32 },
    #[error("a {width}x{height} grid of {block_size}px blocks is too large for pixel maths")]
    FieldTooLarge { width: i32, height: i32, block_size: i32 },
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
}

/// Configuration for a game session and its tick loop
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub grid: Grid,
    /// Time between two logic updates
    pub tick_interval: Duration,
    /// Sleep between two redraws; zero spins as fast as possible
    pub frame_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: Grid::new(DEFAULT_BLOCKS_WIDE, DEFAULT_BLOCKS_HIGH, DEFAULT_BLOCK_SIZE),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            frame_interval: Duration::from_millis(DEFAULT_FRAME_MS),
        }
    }
}

impl GameConfig {
    /// Create a configuration with a custom grid size
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid: Grid::new(width, height, DEFAULT_BLOCK_SIZE),
            ..Default::default()
        }
    }

    pub fn with_block_size(mut self, block_size: i32) -> Self {
        self.grid.block_size = block_size;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Grid { width, height, block_size } = self.grid;

        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall { width, height, min: MIN_GRID_SIDE });
        }
        if block_size <= 0 || block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize { block_size, max: MAX_BLOCK_SIZE });
        }
        let longest_side = width.max(height) as i64;
        if longest_side * block_size as i64 > MAX_FIELD_PIXELS {
            return Err(ConfigError::FieldTooLarge { width, height, block_size });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }

        Ok(())
    }
}
