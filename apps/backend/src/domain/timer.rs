//! Round and parlay timer record.
//!
//! The timer is pure bookkeeping: `remaining` is derived on read from the
//! start instant, so no task has to tick it. Pausing freezes the derived
//! value; resuming shifts the start instant forward by the pause span.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerState {
    Running,
    Paused,
    Stopped,
}

/// A one-shot countdown owned by the round engine.
///
/// `generation` increments on every state change; scheduled callbacks carry
/// the generation they were armed with and no-op when it has moved on, which
/// makes late fires after a stop or pause harmless.
#[derive(Debug, Clone)]
pub struct GameTimer {
    duration: Duration,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    state: TimerState,
    generation: u64,
}

impl GameTimer {
    /// A stopped timer with no configured duration.
    pub fn idle() -> Self {
        Self {
            duration: Duration::ZERO,
            started_at: None,
            paused_at: None,
            state: TimerState::Stopped,
            generation: 0,
        }
    }

    /// Arm the timer without starting it: paused with full remaining.
    pub fn prepare(&mut self, duration: Duration) -> u64 {
        self.duration = duration;
        self.started_at = None;
        self.paused_at = None;
        self.state = TimerState::Paused;
        self.bump()
    }

    /// Start counting down from `duration`.
    pub fn start(&mut self, duration: Duration, now: Instant) -> u64 {
        self.duration = duration;
        self.started_at = Some(now);
        self.paused_at = None;
        self.state = TimerState::Running;
        self.bump()
    }

    /// Freeze the remaining value. No-op unless running.
    pub fn pause(&mut self, now: Instant) -> u64 {
        if self.state != TimerState::Running {
            return self.generation;
        }
        self.paused_at = Some(now);
        self.state = TimerState::Paused;
        self.bump()
    }

    /// Continue from the frozen remaining value. No-op unless paused.
    ///
    /// A prepared timer (paused, never started) begins its full duration.
    pub fn resume(&mut self, now: Instant) -> u64 {
        if self.state != TimerState::Paused {
            return self.generation;
        }
        self.started_at = match (self.started_at, self.paused_at) {
            // Shift the start forward by the span spent paused.
            (Some(started), Some(paused)) => Some(started + now.duration_since(paused)),
            _ => Some(now),
        };
        self.paused_at = None;
        self.state = TimerState::Running;
        self.bump()
    }

    /// Stop the timer. A stopped timer never fires.
    pub fn stop(&mut self) -> u64 {
        self.state = TimerState::Stopped;
        self.started_at = None;
        self.paused_at = None;
        self.bump()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Derived remaining time at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state {
            TimerState::Running => match self.started_at {
                Some(started) => self
                    .duration
                    .saturating_sub(now.saturating_duration_since(started)),
                None => self.duration,
            },
            TimerState::Paused => match (self.started_at, self.paused_at) {
                (Some(started), Some(paused)) => self
                    .duration
                    .saturating_sub(paused.saturating_duration_since(started)),
                _ => self.duration,
            },
            TimerState::Stopped => Duration::ZERO,
        }
    }

    /// Serializable snapshot for public timer events.
    pub fn view(&self, now: Instant) -> TimerView {
        TimerView {
            duration_secs: self.duration.as_secs(),
            remaining_secs: self.remaining(now).as_secs(),
            state: self.state,
        }
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Public projection of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub duration_secs: u64,
    pub remaining_secs: u64,
    pub state: TimerState,
}
