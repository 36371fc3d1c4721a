//! Meteors and the registry the tick driver iterates

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, struck_tiles};
use super::grid::{Grid, TileCoord};
use crate::config::GameConfig;

/// Stable meteor identity (allocated by the spawner, never reused in a session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HazardId(pub u32);

/// Result of advancing a meteor by one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Still in the air
    Falling,
    /// Hit the player (terminal)
    HitPlayer,
    /// Reached the ground; `struck` lists every enabled tile it overlapped (terminal)
    HitGround { struck: Vec<TileCoord> },
    /// Dropped below the world without touching anything (terminal)
    FellOut,
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TickOutcome::Falling)
    }
}

/// A falling meteor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub pos: Vec3,
    /// Meteor sphere diameter; the collision box is its bounding cube
    pub diameter: f32,
    alive: bool,
}

impl Hazard {
    pub fn new(id: HazardId, pos: Vec3, diameter: f32) -> Self {
        Self {
            id,
            pos,
            diameter,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.pos, Vec3::splat(self.diameter / 2.0))
    }

    /// Mark dead. Returns false if it already was.
    pub fn dispose(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Fall one tick and classify the result. Player contact wins over ground
    /// contact when both hold in the same tick. Terminal outcomes dispose the
    /// meteor. A dead meteor does not move and yields `None`.
    pub fn advance(
        &mut self,
        player: &Aabb,
        grid: &Grid,
        config: &GameConfig,
    ) -> Option<TickOutcome> {
        if !self.alive {
            return None;
        }

        self.pos.y -= config.fall_rate;
        let bounds = self.bounds();

        let outcome = if bounds.intersects(player) {
            TickOutcome::HitPlayer
        } else if self.pos.y <= config.ground_contact_height {
            TickOutcome::HitGround {
                struck: struck_tiles(&bounds, grid),
            }
        } else if self.pos.y < config.fell_out_height {
            TickOutcome::FellOut
        } else {
            TickOutcome::Falling
        };

        if outcome.is_terminal() {
            self.dispose();
        }
        Some(outcome)
    }
}

/// Live meteors, in spawn order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardSet {
    hazards: Vec<Hazard>,
}

impl HazardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hazard: Hazard) {
        self.hazards.push(hazard);
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    /// Advance every live meteor once and drop the ones that ended, returning
    /// the terminal outcomes in spawn order. Stops early after a player hit:
    /// the session is over and nothing else may be simulated.
    pub fn advance_all(
        &mut self,
        player: &Aabb,
        grid: &Grid,
        config: &GameConfig,
    ) -> Vec<(HazardId, TickOutcome)> {
        let mut ended = Vec::new();
        for hazard in self.hazards.iter_mut() {
            let Some(outcome) = hazard.advance(player, grid, config) else {
                continue;
            };
            if outcome.is_terminal() {
                let hit_player = outcome == TickOutcome::HitPlayer;
                ended.push((hazard.id, outcome));
                if hit_player {
                    break;
                }
            }
        }
        self.hazards.retain(Hazard::is_alive);
        ended
    }

    /// Dispose every meteor (session teardown). Returns how many were alive.
    pub fn dispose_all(&mut self) -> usize {
        let n = self
            .hazards
            .iter_mut()
            .map(Hazard::dispose)
            .filter(|was_alive| *was_alive)
            .count();
        self.hazards.clear();
        n
    }
}
