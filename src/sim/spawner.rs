//! Meteor spawning
//!
//! Positions come from a seeded PCG32 stream, so a session replays exactly
//! for the same seed.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::Grid;
use super::hazard::{Hazard, HazardId};

/// Creates meteors above the grid
#[derive(Debug, Clone)]
pub struct HazardSpawner {
    rng: Pcg32,
    next_id: u32,
    altitude: f32,
    diameter: f32,
    spawned: u32,
}

impl HazardSpawner {
    pub fn new(seed: u64, altitude: f32, diameter: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            altitude,
            diameter,
            spawned: 0,
        }
    }

    /// Total meteors created so far
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Allocate a new meteor ID
    fn next_hazard_id(&mut self) -> HazardId {
        let id = HazardId(self.next_id);
        self.next_id += 1;
        id
    }

    /// New meteor at a uniform random point over the grid, at spawn altitude
    pub fn spawn(&mut self, grid: &Grid) -> Hazard {
        let range = grid.tile_size() * grid.grid_size() as f32;
        let (x, z) = if range > 0.0 {
            (
                self.rng.random_range(-range..=range),
                self.rng.random_range(-range..=range),
            )
        } else {
            (0.0, 0.0)
        };
        self.spawn_at(Vec3::new(x, self.altitude, z))
    }

    /// New meteor at an exact position (scripted drops, tests)
    pub fn spawn_at(&mut self, pos: Vec3) -> Hazard {
        let id = self.next_hazard_id();
        self.spawned += 1;
        Hazard::new(id, pos, self.diameter)
    }
}
