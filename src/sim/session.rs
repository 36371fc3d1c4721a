//! One GAME playthrough
//!
//! A `Session` owns everything that exists only while the game is running:
//! the grid, the player box, live meteors, the spawner, the scheduler with its
//! spawn and recovery timers, and the death signal. The controller builds a
//! fresh one on every GAME entry and tears it down on exit.

use glam::Vec3;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::grid::{Grid, TileCoord};
use super::hazard::{HazardId, HazardSet, TickOutcome};
use super::spawner::HazardSpawner;
use super::tiles::TileRecovery;
use super::timers::{Scheduler, TimerEvent, TimerHandle};
use crate::config::GameConfig;
use crate::consts::{PLAYER_SIZE, PLAYER_SPAWN};
use crate::error::GameError;

/// The player's collision volume. Movement belongs to the host; the session
/// only reads the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Feet position
    pub position: Vec3,
    /// Width, height, depth
    pub size: Vec3,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: PLAYER_SPAWN,
            size: PLAYER_SIZE,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        let half = Vec3::new(self.size.x / 2.0, 0.0, self.size.z / 2.0);
        Aabb::new(
            self.position - half,
            self.position + half + Vec3::new(0.0, self.size.y, 0.0),
        )
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Crushed by a meteor
    MeteorHit(HazardId),
    /// Fell through the grid
    Fell,
    /// Gave up from the in-game menu
    Forfeit,
}

/// Player-death notification. Latches the first cause; later publishes are
/// ignored so one run produces exactly one death.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeathSignal {
    cause: Option<DeathCause>,
}

impl DeathSignal {
    /// Returns true if this call raised the signal
    pub fn publish(&mut self, cause: DeathCause) -> bool {
        if self.cause.is_some() {
            return false;
        }
        self.cause = Some(cause);
        true
    }

    pub fn is_raised(&self) -> bool {
        self.cause.is_some()
    }

    pub fn cause(&self) -> Option<DeathCause> {
        self.cause
    }
}

/// Things that happened during a frame, for the host to present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HazardSpawned { id: HazardId, pos: Vec3 },
    HazardDisposed { id: HazardId },
    TileStruck(TileCoord),
    TileRecovered(TileCoord),
    PlayerHit(HazardId),
    PlayerFell,
}

/// What teardown released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownReport {
    pub hazards_disposed: usize,
    pub timers_cancelled: usize,
}

/// End-of-run statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub cause: DeathCause,
    pub survived_ms: u64,
    pub hazards_spawned: u32,
    pub tiles_struck: u32,
}

/// Tile as the renderer needs it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub x: i32,
    pub z: i32,
    pub position: Vec3,
    pub enabled: bool,
}

/// Meteor as the renderer needs it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardView {
    pub id: HazardId,
    pub pos: Vec3,
    pub diameter: f32,
}

/// Drawable state of a running session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub elapsed_ms: u64,
    pub tile_size: f32,
    pub tiles: Vec<TileView>,
    pub hazards: Vec<HazardView>,
    pub player: Player,
}

/// Complete mutable state of one GAME playthrough
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    grid: Grid,
    player: Player,
    hazards: HazardSet,
    spawner: HazardSpawner,
    scheduler: Scheduler,
    recovery: TileRecovery,
    spawn_timer: Option<TimerHandle>,
    death: DeathSignal,
    events: Vec<GameEvent>,
    /// Hazard-update passes run so far
    ticks: u64,
    closed: bool,
}

impl Session {
    /// Build the grid, place the player and arm the spawn timer
    pub fn start(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let grid = Grid::build(config.tile_size, config.grid_size)?;

        let mut scheduler = Scheduler::new(config.max_timers);
        let spawn_timer =
            scheduler.schedule_every(config.spawn_interval_ms, TimerEvent::SpawnHazard)?;

        info!(
            "Session started: {} tiles, seed {}, meteor every {} ms",
            grid.len(),
            seed,
            config.spawn_interval_ms
        );

        Ok(Self {
            spawner: HazardSpawner::new(seed, config.spawn_altitude, config.meteor_diameter),
            recovery: TileRecovery::new(config.tile_recovery_ms),
            config,
            grid,
            player: Player::default(),
            hazards: HazardSet::new(),
            scheduler,
            spawn_timer: Some(spawn_timer),
            death: DeathSignal::default(),
            events: Vec::new(),
            ticks: 0,
            closed: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn hazards(&self) -> &HazardSet {
        &self.hazards
    }

    pub fn recovery(&self) -> &TileRecovery {
        &self.recovery
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn death(&self) -> Option<DeathCause> {
        self.death.cause()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Nothing may be simulated once the run is over or torn down
    fn is_live(&self) -> bool {
        !self.closed && !self.death.is_raised()
    }

    /// Events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// One rendered frame: fire due timers, then advance every meteor
    pub fn frame(&mut self, dt_ms: u64) {
        self.advance_clock(dt_ms);
        self.tick();
    }

    /// Move the session clock forward, firing spawn and recovery timers in order
    pub fn advance_clock(&mut self, dt_ms: u64) {
        if !self.is_live() {
            return;
        }
        let target = self.scheduler.now_ms().saturating_add(dt_ms);
        while let Some(event) = self.scheduler.next_due(target) {
            self.handle_timer(event);
            if !self.is_live() {
                return;
            }
        }
        self.scheduler.set_now(target);
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::SpawnHazard => {
                let hazard = self.spawner.spawn(&self.grid);
                debug!("Meteor {} spawned at {:?}", hazard.id.0, hazard.pos);
                self.events.push(GameEvent::HazardSpawned {
                    id: hazard.id,
                    pos: hazard.pos,
                });
                self.hazards.insert(hazard);
            }
            TimerEvent::RecoverTile(coord) => {
                if self.recovery.recover(&mut self.grid, coord) {
                    self.events.push(GameEvent::TileRecovered(coord));
                }
            }
        }
    }

    /// Per-frame meteor update
    pub fn tick(&mut self) {
        if !self.is_live() {
            return;
        }
        self.ticks += 1;

        let player = self.player.bounds();
        let ended = self.hazards.advance_all(&player, &self.grid, &self.config);

        for (id, outcome) in ended {
            match outcome {
                TickOutcome::HitPlayer => {
                    info!("Meteor {} hit the player", id.0);
                    self.death.publish(DeathCause::MeteorHit(id));
                    self.events.push(GameEvent::PlayerHit(id));
                }
                TickOutcome::HitGround { struck } => {
                    for coord in struck {
                        match self
                            .recovery
                            .strike(&mut self.grid, &mut self.scheduler, coord)
                        {
                            Ok(true) => self.events.push(GameEvent::TileStruck(coord)),
                            Ok(false) => {}
                            Err(e) => warn!("Tile ({}, {}) not struck: {}", coord.x, coord.z, e),
                        }
                    }
                }
                TickOutcome::FellOut | TickOutcome::Falling => {}
            }
            debug!("Meteor {} disposed", id.0);
            self.events.push(GameEvent::HazardDisposed { id });
        }
    }

    /// Host reports the player's current feet position
    pub fn set_player_position(&mut self, position: Vec3) {
        if self.closed {
            return;
        }
        self.player.position = position;
        if position.y < self.config.player_fall_height {
            self.report_player_fell();
        }
    }

    /// External fall detection says the player dropped through the grid
    pub fn report_player_fell(&mut self) {
        if self.is_live() && self.death.publish(DeathCause::Fell) {
            info!("Player fell through the grid");
            self.events.push(GameEvent::PlayerFell);
        }
    }

    /// End the run from the in-game menu
    pub fn forfeit(&mut self) {
        if self.is_live() {
            self.death.publish(DeathCause::Forfeit);
        }
    }

    /// Drop a meteor at an exact position (scripted drops, tests)
    pub fn drop_hazard_at(&mut self, pos: Vec3) -> Option<HazardId> {
        if !self.is_live() {
            return None;
        }
        let hazard = self.spawner.spawn_at(pos);
        let id = hazard.id;
        self.events.push(GameEvent::HazardSpawned { id, pos });
        self.hazards.insert(hazard);
        Some(id)
    }

    /// Cancel the spawn timer and every recovery timer and dispose live
    /// meteors. Safe to call more than once.
    pub fn teardown(&mut self) -> TeardownReport {
        if self.closed {
            return TeardownReport::default();
        }
        self.closed = true;

        let mut timers_cancelled = 0;
        if let Some(handle) = self.spawn_timer.take() {
            if self.scheduler.cancel(handle) {
                timers_cancelled += 1;
            }
        }
        timers_cancelled += self.recovery.cancel_all(&mut self.scheduler);
        // Anything left was registered outside the two owners above
        timers_cancelled += self.scheduler.cancel_all();

        let report = TeardownReport {
            hazards_disposed: self.hazards.dispose_all(),
            timers_cancelled,
        };
        info!(
            "Session torn down: {} meteors disposed, {} timers cancelled",
            report.hazards_disposed, report.timers_cancelled
        );
        report
    }

    /// Stats for the LOSE screen
    pub fn summary(&self, cause: DeathCause) -> RunSummary {
        RunSummary {
            cause,
            survived_ms: self.elapsed_ms(),
            hazards_spawned: self.spawner.spawned(),
            tiles_struck: self.recovery.struck_total(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            elapsed_ms: self.elapsed_ms(),
            tile_size: self.grid.tile_size(),
            tiles: self
                .grid
                .tiles()
                .iter()
                .map(|t| TileView {
                    x: t.coord.x,
                    z: t.coord.z,
                    position: t.position,
                    enabled: t.enabled,
                })
                .collect(),
            hazards: self
                .hazards
                .iter()
                .map(|h| HazardView {
                    id: h.id,
                    pos: h.pos,
                    diameter: h.diameter,
                })
                .collect(),
            player: self.player,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-tile grid with spawning effectively off and the player out of the way
    fn quiet_session() -> Session {
        let config = GameConfig {
            grid_size: 0,
            spawn_interval_ms: 1_000_000,
            ..Default::default()
        };
        let mut session = Session::start(config, 7).expect("valid config");
        session.set_player_position(Vec3::new(100.0, 0.0, 100.0));
        session
    }

    #[test]
    fn test_meteor_strikes_single_tile_on_tick_75() {
        let mut session = quiet_session();
        let id = session
            .drop_hazard_at(Vec3::new(0.0, 30.0, 0.0))
            .expect("session live");
        let origin = TileCoord::new(0, 0);

        for _ in 0..74 {
            session.tick();
        }
        assert!(session.hazards().get(id).is_some());
        assert!(session.grid().is_enabled(origin));

        session.tick();
        assert!(session.hazards().is_empty());
        assert!(!session.grid().is_enabled(origin));
        assert!(session.death().is_none());

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::TileStruck(origin)));
        assert!(events.contains(&GameEvent::HazardDisposed { id }));
    }

    #[test]
    fn test_struck_tile_recovers_after_delay() {
        let mut session = quiet_session();
        session.advance_clock(500);
        session.drop_hazard_at(Vec3::new(0.0, 0.5, 0.0));
        session.tick();
        let origin = TileCoord::new(0, 0);
        assert!(!session.grid().is_enabled(origin));

        session.advance_clock(9_999);
        assert!(!session.grid().is_enabled(origin));
        session.advance_clock(1);
        assert!(session.grid().is_enabled(origin));
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::TileRecovered(origin))
        );
    }

    #[test]
    fn test_player_hit_signals_once_without_strike() {
        let mut session = quiet_session();
        session.set_player_position(Vec3::ZERO);
        let first = session.drop_hazard_at(Vec3::new(0.0, 30.0, 0.0)).unwrap();
        session.drop_hazard_at(Vec3::new(0.5, 30.0, 0.0)).unwrap();

        for _ in 0..200 {
            session.tick();
        }

        assert_eq!(session.death(), Some(DeathCause::MeteorHit(first)));
        let hits = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PlayerHit(_)))
            .count();
        assert_eq!(hits, 1);
        assert!(session.grid().is_enabled(TileCoord::new(0, 0)));
        assert_eq!(session.recovery().struck_total(), 0);
    }

    #[test]
    fn test_meteor_off_grid_leaves_no_trace() {
        let mut session = quiet_session();
        let id = session
            .drop_hazard_at(Vec3::new(40.0, 30.0, 40.0))
            .unwrap();
        for _ in 0..200 {
            session.tick();
        }
        assert!(session.hazards().get(id).is_none());
        assert_eq!(session.grid().enabled_count(), 1);
        assert_eq!(session.pending_timers(), 1); // only the spawn timer
        assert!(session.death().is_none());
    }

    #[test]
    fn test_meteor_falls_out_of_world() {
        let config = GameConfig {
            grid_size: 0,
            spawn_interval_ms: 1_000_000,
            ground_contact_height: -100.0,
            ..Default::default()
        };
        let mut session = Session::start(config, 7).unwrap();
        session.set_player_position(Vec3::new(100.0, 0.0, 100.0));
        let before = session.player().position;
        session.drop_hazard_at(Vec3::new(0.0, -9.0, 0.0));

        for _ in 0..3 {
            session.tick();
        }
        assert!(session.hazards().is_empty());
        assert!(session.grid().is_enabled(TileCoord::new(0, 0)));
        assert_eq!(session.player().position, before);
        assert!(session.death().is_none());
    }

    #[test]
    fn test_spawn_timer_creates_one_meteor_per_period() {
        let config = GameConfig {
            grid_size: 2,
            ..Default::default()
        };
        let mut session = Session::start(config, 99).unwrap();
        session.set_player_position(Vec3::new(500.0, 0.0, 500.0));

        session.advance_clock(299);
        assert_eq!(session.hazards().len(), 0);
        session.advance_clock(1);
        assert_eq!(session.hazards().len(), 1);
        session.advance_clock(900);
        assert_eq!(session.hazards().len(), 4);
    }

    #[test]
    fn test_fall_below_threshold_raises_death() {
        let mut session = quiet_session();
        session.set_player_position(Vec3::new(0.0, -10.5, 0.0));
        assert_eq!(session.death(), Some(DeathCause::Fell));
        session.report_player_fell();
        let falls = session
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::PlayerFell)
            .count();
        assert_eq!(falls, 1);
    }

    #[test]
    fn test_nothing_mutates_after_teardown() {
        let config = GameConfig {
            grid_size: 0,
            ..Default::default()
        };
        let mut session = Session::start(config, 3).unwrap();
        session.set_player_position(Vec3::new(100.0, 0.0, 100.0));
        session.drop_hazard_at(Vec3::new(0.0, 0.5, 0.0));
        session.tick();
        session.advance_clock(600);
        assert!(!session.grid().is_enabled(TileCoord::new(0, 0)));
        assert_eq!(session.hazards().len(), 2);

        let report = session.teardown();
        assert_eq!(report.hazards_disposed, 2);
        assert_eq!(report.timers_cancelled, 2);
        assert_eq!(session.teardown(), TeardownReport::default());

        let ticks = session.ticks();
        let spawned = session.summary(DeathCause::Forfeit).hazards_spawned;
        session.drain_events();
        for _ in 0..100 {
            session.frame(250);
        }
        assert_eq!(session.ticks(), ticks);
        assert_eq!(session.summary(DeathCause::Forfeit).hazards_spawned, spawned);
        assert!(!session.grid().is_enabled(TileCoord::new(0, 0)));
        assert!(session.hazards().is_empty());
        assert!(session.drain_events().is_empty());
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_schedule_failure_aborts_start() {
        let config = GameConfig {
            max_timers: 0,
            ..Default::default()
        };
        assert!(matches!(
            Session::start(config, 1),
            Err(GameError::Schedule(_))
        ));
    }
}
