//! Tile destruction and regrowth
//!
//! The only writer of `Tile::enabled`. A strike disables the tile and arms a
//! one-shot `RecoverTile` timer that refers to the tile by coordinate.

use std::collections::HashMap;

use log::debug;

use super::grid::{Grid, TileCoord};
use super::timers::{Scheduler, TimerEvent, TimerHandle};
use crate::error::ScheduleError;

/// Tracks pending recovery timers per struck tile
#[derive(Debug, Clone, Default)]
pub struct TileRecovery {
    delay_ms: u64,
    pending: HashMap<TileCoord, TimerHandle>,
    struck_total: u32,
}

impl TileRecovery {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: HashMap::new(),
            struck_total: 0,
        }
    }

    /// Tiles disabled over the whole session
    pub fn struck_total(&self) -> u32 {
        self.struck_total
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, coord: TileCoord) -> bool {
        self.pending.contains_key(&coord)
    }

    /// Disable an enabled tile and schedule its recovery. Striking a tile that
    /// is already down (or off the grid) does nothing and keeps the original
    /// recovery time. Returns true if the tile went down.
    pub fn strike(
        &mut self,
        grid: &mut Grid,
        scheduler: &mut Scheduler,
        coord: TileCoord,
    ) -> Result<bool, ScheduleError> {
        if !grid.is_enabled(coord) {
            return Ok(false);
        }
        let handle = scheduler.schedule_once(self.delay_ms, TimerEvent::RecoverTile(coord))?;
        grid.set_enabled(coord, false);
        self.pending.insert(coord, handle);
        self.struck_total += 1;
        debug!(
            "Tile ({}, {}) destroyed, recovers in {} ms",
            coord.x, coord.z, self.delay_ms
        );
        Ok(true)
    }

    /// Recovery timer fired. Re-enables the tile only if it is still down.
    pub fn recover(&mut self, grid: &mut Grid, coord: TileCoord) -> bool {
        self.pending.remove(&coord);
        let restored = grid.set_enabled(coord, true);
        if restored {
            debug!("Tile ({}, {}) recovered", coord.x, coord.z);
        }
        restored
    }

    /// Cancel every outstanding recovery timer. Returns how many were pending.
    pub fn cancel_all(&mut self, scheduler: &mut Scheduler) -> usize {
        let n = self.pending.len();
        for (_, handle) in self.pending.drain() {
            scheduler.cancel(handle);
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_due(
        recovery: &mut TileRecovery,
        grid: &mut Grid,
        scheduler: &mut Scheduler,
        until_ms: u64,
    ) -> Vec<TileCoord> {
        let mut restored = Vec::new();
        while let Some(event) = scheduler.next_due(until_ms) {
            if let TimerEvent::RecoverTile(coord) = event {
                if recovery.recover(grid, coord) {
                    restored.push(coord);
                }
            }
        }
        scheduler.set_now(until_ms);
        restored
    }

    #[test]
    fn test_strike_then_recover_after_delay() {
        let mut grid = Grid::build(5.0, 1).unwrap();
        let mut scheduler = Scheduler::new(64);
        let mut recovery = TileRecovery::new(10_000);
        let coord = TileCoord::new(0, 1);

        scheduler.set_now(1_234);
        assert!(recovery.strike(&mut grid, &mut scheduler, coord).unwrap());
        assert!(!grid.is_enabled(coord));
        assert!(recovery.is_pending(coord));

        assert!(fire_due(&mut recovery, &mut grid, &mut scheduler, 11_233).is_empty());
        assert!(!grid.is_enabled(coord));

        assert_eq!(
            fire_due(&mut recovery, &mut grid, &mut scheduler, 11_234),
            vec![coord]
        );
        assert!(grid.is_enabled(coord));
        assert_eq!(recovery.pending(), 0);
        assert_eq!(recovery.struck_total(), 1);
    }

    #[test]
    fn test_restrike_keeps_original_timer() {
        let mut grid = Grid::build(5.0, 0).unwrap();
        let mut scheduler = Scheduler::new(64);
        let mut recovery = TileRecovery::new(10_000);
        let coord = TileCoord::new(0, 0);

        assert!(recovery.strike(&mut grid, &mut scheduler, coord).unwrap());
        scheduler.set_now(5_000);
        assert!(!recovery.strike(&mut grid, &mut scheduler, coord).unwrap());
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(
            fire_due(&mut recovery, &mut grid, &mut scheduler, 10_000),
            vec![coord]
        );
        assert_eq!(recovery.struck_total(), 1);
    }

    #[test]
    fn test_recover_enabled_tile_is_noop() {
        let mut grid = Grid::build(5.0, 0).unwrap();
        let mut recovery = TileRecovery::new(10_000);
        assert!(!recovery.recover(&mut grid, TileCoord::new(0, 0)));
        assert!(grid.is_enabled(TileCoord::new(0, 0)));
    }

    #[test]
    fn test_cancel_all_leaves_tiles_down() {
        let mut grid = Grid::build(5.0, 1).unwrap();
        let mut scheduler = Scheduler::new(64);
        let mut recovery = TileRecovery::new(10_000);
        for coord in [TileCoord::new(-1, -1), TileCoord::new(1, 1)] {
            recovery.strike(&mut grid, &mut scheduler, coord).unwrap();
        }

        assert_eq!(recovery.cancel_all(&mut scheduler), 2);
        assert_eq!(recovery.cancel_all(&mut scheduler), 0);
        assert_eq!(scheduler.pending(), 0);
        assert!(fire_due(&mut recovery, &mut grid, &mut scheduler, 60_000).is_empty());
        assert_eq!(grid.enabled_count(), 7);
    }

    #[test]
    fn test_strike_fails_when_scheduler_full() {
        let mut grid = Grid::build(5.0, 0).unwrap();
        let mut scheduler = Scheduler::new(0);
        let mut recovery = TileRecovery::new(10_000);
        assert!(
            recovery
                .strike(&mut grid, &mut scheduler, TileCoord::new(0, 0))
                .is_err()
        );
        // Nothing changes if the timer could not be armed
        assert!(grid.is_enabled(TileCoord::new(0, 0)));
    }
}
