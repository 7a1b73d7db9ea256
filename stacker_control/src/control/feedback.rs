//! Closed-loop controller with enable/disable, setpoint, tolerance and a
//! bounded output range.
//!
//! A loop does not own its sensor or actuator. It carries a [`Source`] and
//! a [`Sink`] tag; the robot context reads the source before
//! [`FeedbackLoop::step`] and routes the result to the sink afterwards.

use stacker_common::prelude::*;

use super::pid::{PidGains, PidState, pid_compute};
use crate::hal::SensorFrame;

/// Measurement a loop is fed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Averaged drive encoder distance [in].
    DriveDistance,
    /// Gyro heading [deg].
    Heading,
    /// Elevator encoder height [in].
    ElevatorHeight,
}

impl Source {
    /// Pick this source's reading out of a sensor frame.
    #[inline]
    pub fn read(self, frame: &SensorFrame) -> f64 {
        match self {
            Self::DriveDistance => frame.distance,
            Self::Heading => frame.heading,
            Self::ElevatorHeight => frame.elevator_height,
        }
    }
}

/// Where a loop's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Forward channel of the drive link.
    DriveForward,
    /// Heading correction channel of the drive link.
    DriveCorrection,
    /// Rotate-in-place channel of the drive link.
    DriveTurn,
    /// Elevator motor, through the stop capping rule.
    Elevator,
}

/// One feedback loop.
#[derive(Debug, Clone)]
pub struct FeedbackLoop {
    axis: Axis,
    source: Source,
    sink: Sink,
    gains: PidGains,
    state: PidState,
    setpoint: f64,
    tolerance: f64,
    out_min: f64,
    out_max: f64,
    enabled: bool,
    last_measured: Option<f64>,
    output: f64,
}

impl FeedbackLoop {
    /// Disabled loop at setpoint 0 with the configured gains and range.
    pub fn new(axis: Axis, source: Source, sink: Sink, config: &LoopConfig) -> Self {
        Self {
            axis,
            source,
            sink,
            gains: PidGains {
                kp: config.kp,
                ki: config.ki,
                kd: config.kd,
            },
            state: PidState::default(),
            setpoint: 0.0,
            tolerance: config.tolerance,
            out_min: config.out_min,
            out_max: config.out_max,
            enabled: false,
            last_measured: None,
            output: 0.0,
        }
    }

    // ─── Configuration ──────────────────────────────────────────────

    /// Set setpoint, tolerance and output range together.
    ///
    /// Accumulated state is cleared so an enabled loop starts fresh.
    pub fn configure(&mut self, setpoint: f64, tolerance: f64, range: (f64, f64)) {
        self.setpoint = setpoint;
        self.tolerance = tolerance.abs();
        self.out_min = range.0.min(range.1);
        self.out_max = range.0.max(range.1);
        self.state.reset();
    }

    /// Change only the setpoint, clearing accumulated state.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
        self.state.reset();
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop contributing output. State is reset and the output reads zero.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.state.reset();
        self.output = 0.0;
    }

    // ─── Stepping ───────────────────────────────────────────────────

    /// Advance the loop by `dt_s` seconds with a fresh measurement.
    ///
    /// Returns the clamped output, or exactly 0.0 when disabled.
    pub fn step(&mut self, measured: f64, dt_s: f64) -> f64 {
        self.last_measured = Some(measured);
        if !self.enabled {
            self.output = 0.0;
            return 0.0;
        }
        let error = self.setpoint - measured;
        let raw = pid_compute(
            &mut self.state,
            &self.gains,
            error,
            dt_s,
            (self.out_min, self.out_max),
        );
        self.output = raw.clamp(self.out_min, self.out_max);
        self.output
    }

    /// True when `measured` is within tolerance of the setpoint.
    #[inline]
    pub fn on_target(&self, measured: f64) -> bool {
        (measured - self.setpoint).abs() <= self.tolerance
    }

    /// [`on_target`](Self::on_target) against the last stepped measurement.
    pub fn is_on_target(&self) -> bool {
        self.last_measured.is_some_and(|m| self.on_target(m))
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn source(&self) -> Source {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> Sink {
        self.sink
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    pub fn range(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    /// Output of the most recent step.
    #[inline]
    pub fn output(&self) -> f64 {
        self.output
    }
}
