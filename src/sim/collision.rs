//! Axis-aligned box collision
//!
//! Intervals are closed on every axis: boxes that merely touch intersect.
//! Every collision test in the simulation goes through `Aabb::intersects`, so
//! the boundary rule is applied uniformly.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, TileCoord};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered at `center` extending `half_extents` along each axis
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Closed-interval overlap test on all three axes
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Coordinates of every enabled tile the box overlaps, in grid order
pub fn struck_tiles(hazard: &Aabb, grid: &Grid) -> Vec<TileCoord> {
    grid.enabled_tiles()
        .filter(|tile| hazard.intersects(&grid.tile_bounds(tile)))
        .map(|tile| tile.coord)
        .collect()
}
