//! Destructible ground grid
//!
//! A square of thin slabs centered on the origin. The shape never changes
//! after `Grid::build`; only the `enabled` flags do, and only through the
//! tile recovery manager.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::MAX_GRID_SIZE;
use crate::error::ConfigError;

/// Stable identity of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// One ground tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub coord: TileCoord,
    /// Slab center in world space
    pub position: Vec3,
    /// Disabled tiles are invisible and never collide
    pub enabled: bool,
}

/// The full ground grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    tile_size: f32,
    grid_size: i32,
    /// Ordered by x, then z (ascending)
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build every tile in `[-grid_size, grid_size]²`, all enabled
    pub fn build(tile_size: f32, grid_size: i32) -> Result<Self, ConfigError> {
        if grid_size < 0 {
            return Err(ConfigError::NegativeGridSize(grid_size));
        }
        if grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(ConfigError::NonPositiveTileSize(tile_size));
        }

        let side = (2 * grid_size + 1) as usize;
        let mut tiles = Vec::with_capacity(side * side);
        for x in -grid_size..=grid_size {
            for z in -grid_size..=grid_size {
                tiles.push(Tile {
                    coord: TileCoord::new(x, z),
                    position: Vec3::new(
                        x as f32 * tile_size,
                        -tile_size / 20.0,
                        z as f32 * tile_size,
                    ),
                    enabled: true,
                });
            }
        }

        Ok(Self {
            tile_size,
            grid_size,
            tiles,
        })
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Index into `tiles` for a coordinate, if it lies on the grid
    fn index_of(&self, coord: TileCoord) -> Option<usize> {
        let n = self.grid_size;
        if !(-n..=n).contains(&coord.x) || !(-n..=n).contains(&coord.z) {
            return None;
        }
        let side = (2 * n + 1) as usize;
        Some((coord.x + n) as usize * side + (coord.z + n) as usize)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index_of(coord).map(|i| &self.tiles[i])
    }

    pub fn is_enabled(&self, coord: TileCoord) -> bool {
        self.tile(coord).is_some_and(|t| t.enabled)
    }

    pub fn enabled_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.enabled)
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled_tiles().count()
    }

    /// Toggle a tile's presence. Returns true if the flag changed.
    pub(crate) fn set_enabled(&mut self, coord: TileCoord, enabled: bool) -> bool {
        match self.index_of(coord) {
            Some(i) if self.tiles[i].enabled != enabled => {
                self.tiles[i].enabled = enabled;
                true
            }
            _ => false,
        }
    }

    /// Slab bounds: `tile_size` square, `tile_size / 10` thick, top face at y = 0
    pub fn tile_bounds(&self, tile: &Tile) -> Aabb {
        let half = self.tile_size / 2.0;
        Aabb::from_center_half_extents(
            tile.position,
            Vec3::new(half, self.tile_size / 20.0, half),
        )
    }
}
