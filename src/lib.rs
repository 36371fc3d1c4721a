//! Meteor Fall - survive the meteor shower on a crumbling tile grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, meteors, collisions, timers, game flow)
//! - `config`: Data-driven game tuning
//! - `error`: Configuration, scheduling and transition errors
//! - `web`: wasm-bindgen surface for the browser host (wasm32 only)

pub mod config;
pub mod error;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::GameConfig;
pub use error::{ConfigError, GameError, ScheduleError};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Ground tile edge length (world units)
    pub const TILE_SIZE: f32 = 5.0;
    /// Grid radius in tiles: coordinates span [-GRID_SIZE, +GRID_SIZE]
    pub const GRID_SIZE: i32 = 10;
    /// Largest accepted grid radius (513 x 513 tiles)
    pub const MAX_GRID_SIZE: i32 = 256;

    /// Milliseconds between meteor spawns
    pub const SPAWN_INTERVAL_MS: u64 = 300;
    /// Milliseconds before a destroyed tile grows back
    pub const TILE_RECOVERY_MS: u64 = 10_000;

    /// Meteors appear at this height
    pub const SPAWN_ALTITUDE: f32 = 30.0;
    /// Height lost per tick
    pub const FALL_RATE: f32 = 0.4;
    /// At or below this height a meteor hits the ground
    pub const GROUND_CONTACT_HEIGHT: f32 = 0.25;
    /// Below this height a meteor has left the world
    pub const FELL_OUT_HEIGHT: f32 = -10.0;
    /// Meteor sphere diameter
    pub const METEOR_DIAMETER: f32 = 5.0;

    /// Player collision box (width, height, depth), origin at the feet
    pub const PLAYER_SIZE: Vec3 = Vec3::new(2.0, 3.0, 1.0);
    /// Where the player is placed when a session starts
    pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 3.0, 0.0);
    /// A player below this height has fallen through the grid
    pub const PLAYER_FALL_HEIGHT: f32 = -10.0;

    /// Longest frame the clock will advance in one step (spiral of death guard)
    pub const MAX_FRAME_MS: u64 = 250;
    /// Upper bound on concurrently registered timers
    pub const MAX_TIMERS: usize = 4096;
}
