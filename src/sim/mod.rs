//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the host's frame calls
//! - Seeded RNG only
//! - Stable iteration order (grid order for tiles, spawn order for meteors)
//! - No rendering or platform dependencies

pub mod collision;
pub mod game;
pub mod grid;
pub mod hazard;
pub mod session;
pub mod spawner;
pub mod tiles;
pub mod timers;

pub use collision::{Aabb, struck_tiles};
pub use game::{GameFlow, GamePhase, Snapshot};
pub use grid::{Grid, Tile, TileCoord};
pub use hazard::{Hazard, HazardId, HazardSet, TickOutcome};
pub use session::{
    DeathCause, DeathSignal, GameEvent, Player, RunSummary, Session, SessionSnapshot,
    TeardownReport,
};
pub use spawner::HazardSpawner;
pub use tiles::TileRecovery;
pub use timers::{Scheduler, TimerEvent, TimerHandle};
