//! Mechanical-stop protection for the elevator output.

use stacker_common::prelude::*;

use super::table::SetpointTable;

/// Output capping rule near the elevator's travel limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopGuard {
    ground: f64,
    slow_below: f64,
    slow_above: f64,
    reduction: f64,
    safety_mode: bool,
}

impl StopGuard {
    pub fn new(table: &SetpointTable, config: &ElevatorConfig) -> Self {
        Self {
            ground: table.height(ElevatorStep::Ground),
            slow_below: table.height(config.slow_below),
            slow_above: table.height(config.slow_above),
            reduction: config.speed_reduction,
            safety_mode: config.safety_mode,
        }
    }

    #[inline]
    pub fn safety_mode(&self) -> bool {
        self.safety_mode
    }

    /// Cap a commanded output at the current height.
    ///
    /// Downward output below GROUND is cut to zero. With safety mode on,
    /// output heading into either end of travel is multiplied by the
    /// reduction factor.
    pub fn cap(&self, output: f64, height: f64) -> f64 {
        if output < 0.0 && height < self.ground {
            return 0.0;
        }
        if self.safety_mode && self.approaching_stop(output, height) {
            return output * self.reduction;
        }
        output
    }

    #[inline]
    fn approaching_stop(&self, output: f64, height: f64) -> bool {
        (output < 0.0 && height < self.slow_below) || (output > 0.0 && height > self.slow_above)
    }
}
