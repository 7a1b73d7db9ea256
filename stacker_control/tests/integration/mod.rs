//! Shared fixtures for the integration tests.

mod autonomous;
mod mechanism;
mod settling;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use stacker_common::prelude::*;
use stacker_control::robot::SimContext;
use stacker_control::scheduler::{Clock, ModeFlag, SimClock};

/// Default config with the given selectors.
pub fn config(start: StartPosition, objective: Objective, approach: Approach) -> RobotConfig {
    let mut config = RobotConfig::with_service_name("integration");
    config.auto.start = start;
    config.auto.objective = objective;
    config.auto.approach = approach;
    config
}

/// Simulated robot in autonomous with `code` published at `at`.
pub fn autonomous_at(config: RobotConfig, code: Option<&str>, at: Duration) -> SimContext {
    let mut robot = SimContext::simulated(config).unwrap();
    robot.io_mut().set_field_state(code, at);
    robot.enter_mode(Mode::Autonomous);
    robot
}

pub fn autonomous(config: RobotConfig, code: Option<&str>) -> SimContext {
    autonomous_at(config, code, Duration::ZERO)
}

pub fn assert_near(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: {actual:.3} not within {tolerance} of {expected}"
    );
}

/// Virtual clock that ends the mode once `trip_at` has passed.
///
/// The flag is attached after the context exists, through the shared slot.
pub struct TripClock {
    inner: SimClock,
    trip_at: Duration,
    slot: Arc<Mutex<Option<ModeFlag>>>,
}

impl TripClock {
    pub fn new(trip_at: Duration) -> (Self, Arc<Mutex<Option<ModeFlag>>>) {
        let slot = Arc::new(Mutex::new(None));
        let clock = Self {
            inner: SimClock::new(),
            trip_at,
            slot: Arc::clone(&slot),
        };
        (clock, slot)
    }
}

impl Clock for TripClock {
    fn now(&self) -> Duration {
        self.inner.now()
    }

    fn sleep(&mut self, duration: Duration) {
        self.inner.sleep(duration);
        if self.inner.now() >= self.trip_at {
            if let Some(flag) = self.slot.lock().unwrap().as_ref() {
                flag.clear();
            }
        }
    }
}
