//! Hardware boundary of the control core.
//!
//! Everything the core reads or drives goes through [`RobotIo`]. The only
//! implementation in this crate is the simulated robot in [`sim`].

pub mod sim;

use std::time::Duration;

use stacker_common::prelude::FieldCode;

pub use sim::SimRobot;

/// Sensors and actuators of the robot.
///
/// Units: inches for distance and height, degrees (clockwise positive) for
/// heading, normalized [-1, 1] for every actuator command.
pub trait RobotIo {
    /// Averaged drive encoder distance since the last reset.
    fn distance(&self) -> f64;
    /// Heading since the last reset.
    fn heading(&self) -> f64;
    /// Elevator height relative to the last re-zero.
    fn elevator_height(&self) -> f64;

    fn reset_drive_encoders(&mut self);
    fn reset_heading(&mut self);
    /// Make the current elevator position read as zero.
    fn rezero_elevator(&mut self);

    fn arcade_drive(&mut self, forward: f64, turn: f64);
    fn set_elevator(&mut self, output: f64);
    /// Positive ejects, negative intakes.
    fn set_intake(&mut self, output: f64);

    /// Field-state code, once the field has published it.
    fn field_state(&mut self) -> Option<FieldCode>;

    /// Let the plant run for `dt` under the current commands.
    fn advance(&mut self, dt: Duration);
}

/// Sensor readings taken together at the start of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorFrame {
    pub distance: f64,
    pub heading: f64,
    pub elevator_height: f64,
}

impl SensorFrame {
    pub fn sample<Io: RobotIo + ?Sized>(io: &Io) -> Self {
        Self {
            distance: io.distance(),
            heading: io.heading(),
            elevator_height: io.elevator_height(),
        }
    }
}
