//! Deterministic timer scheduler
//!
//! Timers carry a `TimerEvent` value instead of a callback, so whoever owns
//! the scheduler decides what firing means, and cancellation is just removal.
//! Due events come out ordered by due time, then by registration order.

use serde::{Deserialize, Serialize};

use super::grid::TileCoord;
use crate::error::ScheduleError;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Periodic meteor spawn
    SpawnHazard,
    /// Re-enable a struck tile
    RecoverTile(TileCoord),
}

/// Handle returned by the scheduler, used to cancel a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    due_ms: u64,
    /// Some for periodic timers
    period_ms: Option<u64>,
    event: TimerEvent,
}

/// Millisecond clock plus the set of pending timers
#[derive(Debug, Clone)]
pub struct Scheduler {
    now_ms: u64,
    capacity: usize,
    next_handle: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new(capacity: usize) -> Self {
        Self {
            now_ms: 0,
            capacity,
            next_handle: 1,
            timers: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Fire `event` once, `delay_ms` from now
    pub fn schedule_once(
        &mut self,
        delay_ms: u64,
        event: TimerEvent,
    ) -> Result<TimerHandle, ScheduleError> {
        self.register(delay_ms, None, event)
    }

    /// Fire `event` every `period_ms` until cancelled (first firing one period from now)
    pub fn schedule_every(
        &mut self,
        period_ms: u64,
        event: TimerEvent,
    ) -> Result<TimerHandle, ScheduleError> {
        // A zero period would fire forever within a single advance
        self.register(period_ms.max(1), Some(period_ms.max(1)), event)
    }

    fn register(
        &mut self,
        delay_ms: u64,
        period_ms: Option<u64>,
        event: TimerEvent,
    ) -> Result<TimerHandle, ScheduleError> {
        if self.timers.len() >= self.capacity {
            return Err(ScheduleError::Full {
                capacity: self.capacity,
            });
        }
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            event,
        });
        Ok(handle)
    }

    /// Cancel a timer. Unknown or already-fired handles are ignored.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Periodic timers are re-armed one period later.
    pub fn next_due(&mut self, until_ms: u64) -> Option<TimerEvent> {
        // Handles are monotonic, so (due, handle) is (due, registration order)
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle.0))
            .map(|(i, _)| i)?;

        let Timer {
            due_ms,
            period_ms,
            event,
            ..
        } = self.timers[idx];
        self.now_ms = self.now_ms.max(due_ms);
        match period_ms {
            Some(period) => self.timers[idx].due_ms = due_ms + period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(event)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until_ms: u64) -> Vec<(u64, TimerEvent)> {
        let mut fired = Vec::new();
        while let Some(event) = scheduler.next_due(until_ms) {
            fired.push((scheduler.now_ms(), event));
        }
        scheduler.set_now(until_ms);
        fired
    }

    #[test]
    fn test_one_shot_fires_once_at_due_time() {
        let mut s = Scheduler::new(16);
        let coord = TileCoord::new(1, 2);
        s.schedule_once(100, TimerEvent::RecoverTile(coord)).unwrap();

        assert!(drain(&mut s, 99).is_empty());
        assert_eq!(drain(&mut s, 100), vec![(100, TimerEvent::RecoverTile(coord))]);
        assert!(drain(&mut s, 1000).is_empty());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_periodic_catches_up_in_order() {
        let mut s = Scheduler::new(16);
        s.schedule_every(300, TimerEvent::SpawnHazard).unwrap();
        s.schedule_once(450, TimerEvent::RecoverTile(TileCoord::new(0, 0)))
            .unwrap();

        let fired = drain(&mut s, 1000);
        assert_eq!(
            fired,
            vec![
                (300, TimerEvent::SpawnHazard),
                (450, TimerEvent::RecoverTile(TileCoord::new(0, 0))),
                (600, TimerEvent::SpawnHazard),
                (900, TimerEvent::SpawnHazard),
            ]
        );
        assert_eq!(s.now_ms(), 1000);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_same_due_time_uses_registration_order() {
        let mut s = Scheduler::new(16);
        let a = TimerEvent::RecoverTile(TileCoord::new(0, 0));
        let b = TimerEvent::RecoverTile(TileCoord::new(1, 0));
        s.schedule_once(50, b).unwrap();
        s.schedule_once(50, a).unwrap();
        let events: Vec<_> = drain(&mut s, 50).into_iter().map(|(_, e)| e).collect();
        assert_eq!(events, vec![b, a]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut s = Scheduler::new(16);
        let handle = s.schedule_every(10, TimerEvent::SpawnHazard).unwrap();
        assert!(s.is_pending(handle));
        assert!(s.cancel(handle));
        assert!(!s.cancel(handle));
        assert!(drain(&mut s, 1000).is_empty());
    }

    #[test]
    fn test_capacity_limit() {
        let mut s = Scheduler::new(1);
        s.schedule_every(10, TimerEvent::SpawnHazard).unwrap();
        assert_eq!(
            s.schedule_once(10, TimerEvent::SpawnHazard),
            Err(ScheduleError::Full { capacity: 1 })
        );
        assert_eq!(s.cancel_all(), 1);
        assert!(s.schedule_once(10, TimerEvent::SpawnHazard).is_ok());
    }
}
