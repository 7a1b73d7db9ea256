//! Error and flag types for the control core.
//!
//! [`MotionError`] is the outcome of a blocking primitive that did not
//! complete. [`MechanismFlags`] packs the mechanism's boolean state.

use std::time::Duration;

use bitflags::bitflags;
use thiserror::Error;

use super::state::Axis;

bitflags! {
    /// Boolean mechanism state published alongside [`MechanismState`](super::state::MechanismState).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MechanismFlags: u8 {
        /// Returning to GROUND; an advance event cancels it.
        const LOWERING    = 0x01;
        /// Elevator loop owns the output.
        const AUTO        = 0x02;
        /// Override input held; capping and step table bypassed.
        const OVERRIDE    = 0x04;
        /// Slow down near the mechanical stops.
        const SAFETY_MODE = 0x08;
    }
}

impl Default for MechanismFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A blocking primitive stopped before its goal was reached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// Settling did not happen within the configured bound.
    #[error("{axis} loop did not settle at {setpoint:.2} (measured {measured:.2}) after {elapsed:?}")]
    NotSettled {
        axis: Axis,
        setpoint: f64,
        measured: f64,
        elapsed: Duration,
    },

    /// The operating mode ended while the primitive was in flight.
    #[error("operating mode ended during {0}")]
    Abandoned(&'static str),
}

impl MotionError {
    /// True when the mode boundary cut the motion short.
    #[inline]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned(_))
    }
}
