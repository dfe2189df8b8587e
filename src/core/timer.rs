//! Cancellable timers
//!
//! The session never sleeps or spawns threads. Instead it records deadlines
//! here and the main loop asks for whatever is due on every iteration.

use std::time::{Duration, Instant};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Deferred switch from shell mode into game mode
    LaunchGame,
    /// One simulation step
    Tick,
    /// Deferred return to shell after a collision
    GameOverTeardown,
}

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct TimerEntry {
    id: TimerId,
    kind: TimerKind,
    deadline: Instant,
    period: Option<Duration>,
}

/// A timer taken off the queue by [`Timers::pop_due`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    /// When it was due, which may be earlier than the `now` it was popped at
    pub deadline: Instant,
}

/// Set of pending timers owned by a session
#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `kind` once, `delay` after `now`
    pub fn schedule_once(&mut self, now: Instant, delay: Duration, kind: TimerKind) -> TimerId {
        self.push(now + delay, None, kind)
    }

    /// Fire `kind` every `period`, first at `now + period`
    pub fn schedule_repeating(&mut self, now: Instant, period: Duration, kind: TimerKind) -> TimerId {
        // A zero period would make pop_due spin forever
        let period = period.max(Duration::from_millis(1));
        self.push(now + period, Some(period), kind)
    }

    fn push(&mut self, deadline: Instant, period: Option<Duration>, kind: TimerKind) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(TimerEntry { id, kind, deadline, period });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest timer due at `now`.
    ///
    /// Repeating timers are re-armed one period later, so a stalled loop
    /// catches up tick by tick instead of skipping steps. Callers should
    /// loop until this returns `None`; handling one timer at a time lets a
    /// handler cancel the others before they run. Handlers that schedule
    /// follow-up timers should count from `Fired::deadline`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Fired> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| e.deadline)
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let fired = Fired { id: entry.id, kind: entry.kind, deadline: entry.deadline };
        match entry.period {
            Some(period) => entry.deadline += period,
            None => {
                self.entries.remove(idx);
            }
        }
        Some(fired)
    }
}
