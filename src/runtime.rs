//! Time abstraction for deferred work
//!
//! The element never reads the wall clock or sets browser timeouts directly.
//! It asks a [`Clock`] for the current instant and keeps its deferred work in a
//! [`TimerQueue`] that the host drains on every poll. Tests swap in a
//! [`ManualClock`] and advance it explicitly.

use instant::Instant;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Clock backed by the platform monotonic clock (`performance.now()` on wasm)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += by;
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Handle of a scheduled timer, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct ScheduledTimer<T> {
    id: TimerId,
    deadline: Instant,
    payload: T,
}

/// One-shot timers keyed by deadline
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: Vec<ScheduledTimer<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules `payload` to become due `delay` after `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(ScheduledTimer {
            id,
            deadline: now + delay,
            payload,
        });
        id
    }

    /// Cancels a timer, returning its payload if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.swap_remove(index).payload)
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Removes and returns every timer due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<(TimerId, T)> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.deadline <= now);
        self.timers = pending;

        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        due.into_iter().map(|t| (t.id, t.payload)).collect()
    }

    /// Earliest pending deadline, useful for hosts that sleep between polls
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
