//! Simulated robot.
//!
//! Each axis is a first-order velocity lag toward `command * max_speed`.
//! The elevator carriage is bounded by hard stops. The field-state code
//! appears after a configurable delay, or never.

use std::time::Duration;

use stacker_common::prelude::*;
use stacker_common::control::field::field_code;
use tracing::trace;

use super::RobotIo;
use crate::control::ArcadeCommand;

/// Robot pose on the field. Heading 0 faces downfield (+y), positive
/// headings turn clockwise toward +x.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// Actuator commands in force during one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorSample {
    pub at: Duration,
    pub drive: ArcadeCommand,
    pub elevator: f64,
    pub intake: f64,
}

/// Recorded start of an outward intake run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ejection {
    pub at: Duration,
    /// Elevator reading when the cube left.
    pub elevator_height: f64,
    pub pose: Pose,
}

/// Simulated drive base, elevator and intake.
#[derive(Debug, Clone)]
pub struct SimRobot {
    config: SimConfig,
    time: Duration,

    // Drive
    travelled: f64,
    encoder_origin: f64,
    drive_velocity: f64,
    pose: Pose,
    heading_origin: f64,
    yaw_rate: f64,

    // Elevator
    carriage: f64,
    elevator_origin: f64,
    elevator_velocity: f64,

    // Commands
    drive: ArcadeCommand,
    elevator: f64,
    intake: f64,

    field_state: Option<FieldCode>,
    field_state_at: Duration,

    log: Vec<ActuatorSample>,
    ejections: Vec<Ejection>,
}

impl SimRobot {
    pub fn new(config: SimConfig) -> Self {
        let field_state = config.field_state.as_deref().map(field_code);
        let field_state_at = Duration::from_millis(config.field_state_delay_ms);
        let carriage = config.elevator_floor.max(0.0).min(config.elevator_ceiling);
        Self {
            config,
            time: Duration::ZERO,
            travelled: 0.0,
            encoder_origin: 0.0,
            drive_velocity: 0.0,
            pose: Pose::default(),
            heading_origin: 0.0,
            yaw_rate: 0.0,
            carriage,
            elevator_origin: carriage,
            elevator_velocity: 0.0,
            drive: ArcadeCommand::STOP,
            elevator: 0.0,
            intake: 0.0,
            field_state,
            field_state_at,
            log: Vec::new(),
            ejections: Vec::new(),
        }
    }

    /// Replace the field-state code and the time it becomes available.
    pub fn set_field_state(&mut self, code: Option<&str>, available_at: Duration) {
        self.field_state = code.map(field_code);
        self.field_state_at = available_at;
    }

    /// Offset the elevator encoder so it reads `drift` below the carriage.
    pub fn set_encoder_drift(&mut self, drift: f64) {
        self.elevator_origin = self.carriage + drift;
    }

    // ─── Inspection ─────────────────────────────────────────────────

    #[inline]
    pub fn time(&self) -> Duration {
        self.time
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Physical carriage position, ignoring re-zeroing.
    #[inline]
    pub fn carriage(&self) -> f64 {
        self.carriage
    }

    #[inline]
    pub fn drive_command(&self) -> ArcadeCommand {
        self.drive
    }

    #[inline]
    pub fn elevator_command(&self) -> f64 {
        self.elevator
    }

    #[inline]
    pub fn intake_command(&self) -> f64 {
        self.intake
    }

    pub fn log(&self) -> &[ActuatorSample] {
        &self.log
    }

    pub fn ejections(&self) -> &[Ejection] {
        &self.ejections
    }

    // ─── Physics ────────────────────────────────────────────────────

    fn lag(&self, velocity: f64, target: f64, dt_s: f64) -> f64 {
        let alpha = (dt_s / self.config.tau_s).min(1.0);
        velocity + (target - velocity) * alpha
    }

    fn integrate_drive(&mut self, dt_s: f64) {
        self.drive_velocity = self.lag(
            self.drive_velocity,
            self.drive.forward * self.config.max_drive_speed,
            dt_s,
        );
        self.yaw_rate = self.lag(
            self.yaw_rate,
            self.drive.turn * self.config.max_turn_rate,
            dt_s,
        );

        let step = self.drive_velocity * dt_s;
        let heading_rad = self.pose.heading.to_radians();
        self.travelled += step;
        self.pose.x += step * heading_rad.sin();
        self.pose.y += step * heading_rad.cos();
        self.pose.heading += self.yaw_rate * dt_s;
    }

    fn integrate_elevator(&mut self, dt_s: f64) {
        self.elevator_velocity = self.lag(
            self.elevator_velocity,
            self.elevator * self.config.max_elevator_speed,
            dt_s,
        );
        let next = self.carriage + self.elevator_velocity * dt_s;
        let (floor, ceiling) = (self.config.elevator_floor, self.config.elevator_ceiling);
        if next <= floor || next >= ceiling {
            self.elevator_velocity = 0.0;
        }
        self.carriage = next.clamp(floor, ceiling);
    }
}

impl RobotIo for SimRobot {
    fn distance(&self) -> f64 {
        self.travelled - self.encoder_origin
    }

    fn heading(&self) -> f64 {
        self.pose.heading - self.heading_origin
    }

    fn elevator_height(&self) -> f64 {
        self.carriage - self.elevator_origin
    }

    fn reset_drive_encoders(&mut self) {
        self.encoder_origin = self.travelled;
    }

    fn reset_heading(&mut self) {
        self.heading_origin = self.pose.heading;
    }

    fn rezero_elevator(&mut self) {
        trace!(carriage = self.carriage, "elevator encoder re-zeroed");
        self.elevator_origin = self.carriage;
    }

    fn arcade_drive(&mut self, forward: f64, turn: f64) {
        self.drive = ArcadeCommand {
            forward: forward.clamp(-1.0, 1.0),
            turn: turn.clamp(-1.0, 1.0),
        };
    }

    fn set_elevator(&mut self, output: f64) {
        self.elevator = output.clamp(-1.0, 1.0);
    }

    fn set_intake(&mut self, output: f64) {
        let output = output.clamp(-1.0, 1.0);
        if output > 0.0 && self.intake <= 0.0 {
            self.ejections.push(Ejection {
                at: self.time,
                elevator_height: self.elevator_height(),
                pose: self.pose,
            });
        }
        self.intake = output;
    }

    fn field_state(&mut self) -> Option<FieldCode> {
        if self.time < self.field_state_at {
            return None;
        }
        self.field_state.clone()
    }

    fn advance(&mut self, dt: Duration) {
        self.log.push(ActuatorSample {
            at: self.time,
            drive: self.drive,
            elevator: self.elevator,
            intake: self.intake,
        });
        let dt_s = dt.as_secs_f64();
        self.integrate_drive(dt_s);
        self.integrate_elevator(dt_s);
        self.time += dt;
    }
}
