//! Error types
//!
//! The taxonomy is deliberately narrow: bad configuration, a scheduler that
//! cannot take another timer, and menu actions that make no sense in the
//! current phase. Everything else (double disposal, re-enabling an enabled
//! tile, cancelling a dead timer) is a silent no-op.

use thiserror::Error;

use crate::sim::GamePhase;

/// Rejected game configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid size must be >= 0, got {0}")]
    NegativeGridSize(i32),

    #[error("grid size {grid_size} exceeds the maximum of {max}")]
    GridTooLarge { grid_size: i32, max: i32 },

    #[error("tile size must be a positive finite number, got {0}")]
    NonPositiveTileSize(f32),

    #[error("spawn interval must be at least 1 ms")]
    ZeroSpawnInterval,

    #[error("fall rate must be a positive finite number, got {0}")]
    NonPositiveFallRate(f32),

    #[error("meteor diameter must be a positive finite number, got {0}")]
    NonPositiveMeteorDiameter(f32),

    #[error("invalid config JSON: {0}")]
    Parse(String),
}

/// The scheduler could not register a timer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("timer capacity exhausted ({capacity} timers registered)")]
    Full { capacity: usize },
}

/// Errors surfaced by the game flow controller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("cannot {action} while in {phase:?}")]
    InvalidTransition {
        phase: GamePhase,
        action: &'static str,
    },
}
