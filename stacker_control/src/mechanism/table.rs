//! Elevator step table.

use stacker_common::consts::NUM_ELEVATOR_STEPS;
use stacker_common::prelude::*;

/// Ordered, non-decreasing elevator step heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointTable {
    heights: [f64; NUM_ELEVATOR_STEPS],
}

impl SetpointTable {
    /// Build from configured heights; exactly one entry per [`ElevatorStep`].
    pub fn new(heights: &[f64]) -> Result<Self, ConfigError> {
        let heights: [f64; NUM_ELEVATOR_STEPS] = heights.try_into().map_err(|_| {
            ConfigError::ValidationError(format!(
                "step table needs {NUM_ELEVATOR_STEPS} entries, got {}",
                heights.len()
            ))
        })?;
        if heights.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::ValidationError(
                "step table must be non-decreasing".to_string(),
            ));
        }
        Ok(Self { heights })
    }

    #[inline]
    pub fn height(&self, step: ElevatorStep) -> f64 {
        self.heights[step.index()]
    }

    /// Height at `index`, saturating at the last entry.
    #[inline]
    pub fn height_at(&self, index: usize) -> f64 {
        self.heights[index.min(self.last_index())]
    }

    /// Height at `index`, `None` past the last entry.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied()
    }

    #[inline]
    pub const fn last_index(&self) -> usize {
        NUM_ELEVATOR_STEPS - 1
    }

    #[inline]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Smallest index whose height is strictly above `height`, or the
    /// last index when nothing is.
    pub fn next_step_above(&self, height: f64) -> usize {
        self.heights
            .iter()
            .position(|&h| h > height)
            .unwrap_or(self.last_index())
    }

    /// Bound a setpoint to `[GROUND, MAX]`.
    #[inline]
    pub fn clamp(&self, setpoint: f64) -> f64 {
        setpoint.clamp(self.heights[0], self.heights[self.last_index()])
    }
}

impl Default for SetpointTable {
    fn default() -> Self {
        Self {
            heights: stacker_common::consts::ELEVATOR_STEPS,
        }
    }
}
