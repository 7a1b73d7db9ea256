//! Settling detection: on target and no longer moving.
//!
//! Velocity is estimated from two position samples one sample interval
//! apart. The blocking form lives in the robot context's wait loop; the
//! [`SettleTracker`] here is the tick-driven form used while teleop keeps
//! running.

use std::time::Duration;

use stacker_common::prelude::SettleConfig;

/// Velocity threshold and sample spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleCriteria {
    pub sample: Duration,
    pub velocity_threshold: f64,
}

impl From<&SettleConfig> for SettleCriteria {
    fn from(config: &SettleConfig) -> Self {
        Self {
            sample: config.sample_interval(),
            velocity_threshold: config.velocity_threshold,
        }
    }
}

impl SettleCriteria {
    /// Settled when on target and the estimated speed is under threshold.
    #[inline]
    pub fn is_settled(&self, on_target: bool, before: f64, after: f64, interval: Duration) -> bool {
        let secs = interval.as_secs_f64();
        if !on_target || secs <= 0.0 {
            return false;
        }
        ((after - before) / secs).abs() < self.velocity_threshold
    }
}

/// Non-blocking settling detector fed once per control tick.
#[derive(Debug, Clone)]
pub struct SettleTracker {
    criteria: SettleCriteria,
    anchor: Option<f64>,
    since_anchor: Duration,
}

impl SettleTracker {
    pub fn new(criteria: SettleCriteria) -> Self {
        Self {
            criteria,
            anchor: None,
            since_anchor: Duration::ZERO,
        }
    }

    /// Forget previous samples.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.since_anchor = Duration::ZERO;
    }

    /// Feed one sample taken `dt` after the previous one.
    ///
    /// Returns true once a full sample interval has elapsed since the
    /// anchor sample and the pair satisfies the criteria.
    pub fn observe(&mut self, position: f64, on_target: bool, dt: Duration) -> bool {
        let Some(anchor) = self.anchor else {
            self.anchor = Some(position);
            self.since_anchor = Duration::ZERO;
            return false;
        };
        self.since_anchor += dt;
        if self.since_anchor < self.criteria.sample {
            return false;
        }
        let settled = self
            .criteria
            .is_settled(on_target, anchor, position, self.since_anchor);
        self.anchor = Some(position);
        self.since_anchor = Duration::ZERO;
        settled
    }
}
