//! Time source, wait descriptions and the mode-active flag.
//!
//! Blocking primitives never sleep on their own. They describe what they
//! wait for as a [`Wait`] and hand it to the robot context, which keeps the
//! control ticks running until the condition holds, the timeout expires or
//! the operating mode ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use stacker_common::prelude::Axis;

// ─── Clock ──────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait Clock {
    /// Time since the clock was created.
    fn now(&self) -> Duration;
    /// Let `duration` pass.
    fn sleep(&mut self, duration: Duration);
}

/// Virtual time; `sleep` advances instantly and exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    now: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SimClock {
    #[inline]
    fn now(&self) -> Duration {
        self.now
    }

    #[inline]
    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ─── Mode Flag ──────────────────────────────────────────────────────

/// Shared "operating mode still active" flag.
///
/// Cloned into whatever ends the mode (a signal handler, a test).
/// Clearing it makes every pending wait return [`WaitOutcome::Abandoned`].
#[derive(Debug, Clone, Default)]
pub struct ModeFlag(Arc<AtomicBool>);

impl ModeFlag {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::Release);
    }

    /// End the current mode.
    #[inline]
    pub fn clear(&self) {
        self.set(false);
    }

    /// Underlying atomic, for handlers that want the raw flag.
    pub fn as_atomic(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

// ─── Waits ──────────────────────────────────────────────────────────

/// What a wait is waiting for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitCondition {
    /// A fixed amount of time.
    Elapsed(Duration),
    /// The loop on this axis is on target and stationary.
    Settled(Axis),
    /// Field-state data became available.
    FieldState,
}

/// A blocking wait described as data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wait {
    pub condition: WaitCondition,
    /// `None` waits until satisfied or abandoned.
    pub timeout: Option<Duration>,
    /// Spacing between condition checks.
    pub poll: Duration,
}

impl Wait {
    /// Wait for `duration`, checked every `poll`.
    pub fn elapsed(duration: Duration, poll: Duration) -> Self {
        Self {
            condition: WaitCondition::Elapsed(duration),
            timeout: None,
            poll,
        }
    }

    /// Wait for `axis` to settle, sampling every `sample`.
    pub fn settled(axis: Axis, sample: Duration, timeout: Option<Duration>) -> Self {
        Self {
            condition: WaitCondition::Settled(axis),
            timeout,
            poll: sample,
        }
    }

    /// Poll for field-state data.
    pub fn field_state(poll: Duration, timeout: Duration) -> Self {
        Self {
            condition: WaitCondition::FieldState,
            timeout: Some(timeout),
            poll,
        }
    }
}

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied,
    TimedOut,
    /// The operating mode ended first.
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_clock_advances_exactly() {
        let mut clock = SimClock::new();
        for _ in 0..250 {
            clock.sleep(Duration::from_millis(10));
        }
        assert_eq!(clock.now(), Duration::from_millis(2500));
    }

    #[test]
    fn mode_flag_shared_between_clones() {
        let flag = ModeFlag::new(true);
        let other = flag.clone();
        other.clear();
        assert!(!flag.is_active());
        flag.set(true);
        assert!(other.as_atomic().load(Ordering::Acquire));
    }

    #[test]
    fn wait_constructors() {
        let w = Wait::field_state(Duration::from_millis(50), Duration::from_millis(2500));
        assert_eq!(w.condition, WaitCondition::FieldState);
        assert_eq!(w.timeout, Some(Duration::from_millis(2500)));

        let w = Wait::settled(Axis::Turn, Duration::from_millis(10), None);
        assert_eq!(w.condition, WaitCondition::Settled(Axis::Turn));
        assert_eq!(w.timeout, None);
    }
}
