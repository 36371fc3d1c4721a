//! Game tuning
//!
//! Defaults reproduce the original game. Hosts may override any subset of the
//! fields with a JSON object; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tunable parameters for one game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Grid ===
    /// Tile edge length
    pub tile_size: f32,
    /// Grid radius in tiles (signed so bad input can be reported, not wrapped)
    pub grid_size: i32,

    // === Timers ===
    /// Milliseconds between meteor spawns
    pub spawn_interval_ms: u64,
    /// Milliseconds before a struck tile is re-enabled
    pub tile_recovery_ms: u64,

    // === Meteors ===
    pub spawn_altitude: f32,
    /// Height lost per tick
    pub fall_rate: f32,
    pub ground_contact_height: f32,
    pub fell_out_height: f32,
    pub meteor_diameter: f32,

    // === Player ===
    /// Player feet below this height count as a fall
    pub player_fall_height: f32,

    // === Host ===
    /// Clamp for a single frame's clock advance
    pub max_frame_ms: u64,
    /// Scheduler capacity
    pub max_timers: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            grid_size: GRID_SIZE,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            tile_recovery_ms: TILE_RECOVERY_MS,

            spawn_altitude: SPAWN_ALTITUDE,
            fall_rate: FALL_RATE,
            ground_contact_height: GROUND_CONTACT_HEIGHT,
            fell_out_height: FELL_OUT_HEIGHT,
            meteor_diameter: METEOR_DIAMETER,

            player_fall_height: PLAYER_FALL_HEIGHT,

            max_frame_ms: MAX_FRAME_MS,
            max_timers: MAX_TIMERS,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field that would make a session meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 0 {
            return Err(ConfigError::NegativeGridSize(self.grid_size));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                grid_size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::NonPositiveTileSize(self.tile_size));
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        if !(self.fall_rate.is_finite() && self.fall_rate > 0.0) {
            return Err(ConfigError::NonPositiveFallRate(self.fall_rate));
        }
        if !(self.meteor_diameter.is_finite() && self.meteor_diameter > 0.0) {
            return Err(ConfigError::NonPositiveMeteorDiameter(self.meteor_diameter));
        }
        Ok(())
    }

    /// Horizontal half-extent of the area meteors spawn over
    pub fn spawn_range(&self) -> f32 {
        self.tile_size * self.grid_size.max(0) as f32
    }
}
