//! START / GAME / LOSE flow
//!
//! `GameFlow` is what the host talks to. It owns at most one `Session`, which
//! exists exactly while the phase is `Game`. Leaving GAME tears the session
//! down and drops it, so no timer or meteor can outlive the run.

use glam::Vec3;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::session::{DeathCause, GameEvent, RunSummary, Session, SessionSnapshot};
use crate::config::GameConfig;
use crate::error::GameError;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title menu
    Start,
    /// Meteors falling
    Game,
    /// Run over, showing the summary
    Lose,
}

#[derive(Debug)]
enum FlowState {
    Start,
    Game(Box<Session>),
    Lose(RunSummary),
}

/// Everything the host draws for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub session: Option<SessionSnapshot>,
    pub last_run: Option<RunSummary>,
}

/// The game-flow state machine
#[derive(Debug)]
pub struct GameFlow {
    config: GameConfig,
    state: FlowState,
    /// Fractional milliseconds carried between frames
    accumulator_ms: f64,
    last_run: Option<RunSummary>,
}

impl GameFlow {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            state: FlowState::Start,
            accumulator_ms: 0.0,
            last_run: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Takes effect on the next `play`
    pub fn set_config(&mut self, config: GameConfig) {
        self.config = config;
    }

    pub fn phase(&self) -> GamePhase {
        match self.state {
            FlowState::Start => GamePhase::Start,
            FlowState::Game(_) => GamePhase::Game,
            FlowState::Lose(_) => GamePhase::Lose,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            FlowState::Game(session) => Some(&**session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            FlowState::Game(session) => Some(&mut **session),
            _ => None,
        }
    }

    /// Summary of the most recent finished run
    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    fn invalid(&self, action: &'static str) -> GameError {
        let err = GameError::InvalidTransition {
            phase: self.phase(),
            action,
        };
        warn!("{}", err);
        err
    }

    /// START -> GAME. On any setup failure the phase stays `Start`.
    pub fn play(&mut self, seed: u64) -> Result<(), GameError> {
        if self.phase() != GamePhase::Start {
            return Err(self.invalid("play"));
        }
        let session = Session::start(self.config.clone(), seed).inspect_err(|e| {
            warn!("Could not start game: {}", e);
        })?;
        self.accumulator_ms = 0.0;
        self.state = FlowState::Game(Box::new(session));
        info!("Entered GAME");
        Ok(())
    }

    /// GAME -> LOSE from the in-game menu
    pub fn forfeit(&mut self) -> Result<(), GameError> {
        match self.session_mut() {
            Some(session) => session.forfeit(),
            None => return Err(self.invalid("forfeit")),
        }
        self.check_death();
        Ok(())
    }

    /// LOSE -> START
    pub fn to_menu(&mut self) -> Result<(), GameError> {
        if self.phase() != GamePhase::Lose {
            return Err(self.invalid("return to menu"));
        }
        self.state = FlowState::Start;
        info!("Entered START");
        Ok(())
    }

    /// Advance one rendered frame. Only GAME simulates; the other phases
    /// ignore the call. Returns what happened during the frame.
    pub fn frame(&mut self, dt_ms: f64) -> Vec<GameEvent> {
        let max_frame_ms = self.config.max_frame_ms;
        let FlowState::Game(session) = &mut self.state else {
            return Vec::new();
        };

        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.accumulator_ms += dt_ms;
        }
        let step = if self.accumulator_ms >= max_frame_ms.saturating_add(1) as f64 {
            // Drop the excess, including any carried fraction
            warn!(
                "Frame of {:.0} ms clamped to {} ms",
                self.accumulator_ms, max_frame_ms
            );
            self.accumulator_ms = 0.0;
            max_frame_ms
        } else {
            let whole = self.accumulator_ms.floor();
            self.accumulator_ms -= whole;
            whole as u64
        };

        session.frame(step);
        let events = session.drain_events();
        self.check_death();
        events
    }

    /// Host-side fall detection fired
    pub fn report_player_fell(&mut self) {
        if let Some(session) = self.session_mut() {
            session.report_player_fell();
            self.check_death();
        }
    }

    /// Host reports the player's feet position for this frame
    pub fn set_player_position(&mut self, position: Vec3) {
        if let Some(session) = self.session_mut() {
            session.set_player_position(position);
            self.check_death();
        }
    }

    /// GAME -> LOSE if the session's death signal is raised
    fn check_death(&mut self) {
        let cause = match &self.state {
            FlowState::Game(session) => session.death(),
            _ => None,
        };
        if let Some(cause) = cause {
            self.enter_lose(cause);
        }
    }

    fn enter_lose(&mut self, cause: DeathCause) {
        let mut session = match std::mem::replace(&mut self.state, FlowState::Start) {
            FlowState::Game(session) => session,
            other => {
                self.state = other;
                return;
            }
        };
        session.teardown();
        let summary = session.summary(cause);
        drop(session);

        info!(
            "Entered LOSE ({:?}) after {} ms, {} meteors, {} tiles destroyed",
            summary.cause, summary.survived_ms, summary.hazards_spawned, summary.tiles_struck
        );
        self.last_run = Some(summary);
        self.state = FlowState::Lose(summary);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase(),
            session: self.session().map(Session::snapshot),
            last_run: match &self.state {
                FlowState::Lose(summary) => Some(*summary),
                _ => self.last_run,
            },
        }
    }
}
