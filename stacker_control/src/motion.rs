//! Drive base loops and the blocking motion primitives.
//!
//! Every primitive resets what it needs, configures and enables its loops,
//! then waits for settling through the robot context. A settled loop is
//! disabled before the primitive returns.

use std::time::Duration;

use stacker_common::prelude::*;
use tracing::{debug, error, info};

use crate::control::{ArcadeCommand, FeedbackLoop, MutualExclusionLink, Sink, Source};
use crate::hal::{RobotIo, SensorFrame};
use crate::robot::RobotContext;
use crate::scheduler::{Clock, Wait, WaitOutcome};
use crate::telemetry::{TARGET_ANGLE, TARGET_DISTANCE};

// ─── Drive Base ─────────────────────────────────────────────────────

/// The three drive loops, their link and an optional open-loop command.
#[derive(Debug, Clone)]
pub struct DriveBase {
    pub distance: FeedbackLoop,
    pub heading_hold: FeedbackLoop,
    pub turn: FeedbackLoop,
    pub link: MutualExclusionLink,
    open_loop: Option<ArcadeCommand>,
}

impl DriveBase {
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            distance: FeedbackLoop::new(
                Axis::Distance,
                Source::DriveDistance,
                Sink::DriveForward,
                &config.distance,
            ),
            heading_hold: FeedbackLoop::new(
                Axis::HeadingHold,
                Source::Heading,
                Sink::DriveCorrection,
                &config.heading_hold,
            ),
            turn: FeedbackLoop::new(Axis::Turn, Source::Heading, Sink::DriveTurn, &config.turn),
            link: MutualExclusionLink::new(),
            open_loop: None,
        }
    }

    /// Disable every loop, null the link and drop any open-loop command.
    pub fn stop(&mut self) {
        self.distance.disable();
        self.heading_hold.disable();
        self.turn.disable();
        self.link.unlink();
        self.open_loop = None;
    }

    /// Command the drive directly. Only used while no loop is enabled.
    pub fn set_open_loop(&mut self, command: Option<ArcadeCommand>) {
        self.open_loop = command;
    }

    #[inline]
    pub fn open_loop(&self) -> Option<ArcadeCommand> {
        self.open_loop
    }

    pub fn any_enabled(&self) -> bool {
        self.distance.is_enabled() || self.heading_hold.is_enabled() || self.turn.is_enabled()
    }

    pub fn loop_for(&self, axis: Axis) -> Option<&FeedbackLoop> {
        match axis {
            Axis::Distance => Some(&self.distance),
            Axis::HeadingHold => Some(&self.heading_hold),
            Axis::Turn => Some(&self.turn),
            Axis::Elevator => None,
        }
    }

    pub fn loop_for_mut(&mut self, axis: Axis) -> Option<&mut FeedbackLoop> {
        match axis {
            Axis::Distance => Some(&mut self.distance),
            Axis::HeadingHold => Some(&mut self.heading_hold),
            Axis::Turn => Some(&mut self.turn),
            Axis::Elevator => None,
        }
    }

    /// Step every loop and combine the outputs into one arcade command.
    pub fn step(&mut self, frame: &SensorFrame, dt_s: f64) -> ArcadeCommand {
        let Self {
            distance,
            heading_hold,
            turn,
            link,
            ..
        } = &mut *self;
        for fl in [distance, heading_hold, turn] {
            let out = fl.step(fl.source().read(frame), dt_s);
            match fl.sink() {
                Sink::DriveForward => link.write_forward(out),
                Sink::DriveCorrection => link.write_correction(out),
                Sink::DriveTurn => link.write_turn(out),
                Sink::Elevator => {}
            }
        }
        if self.any_enabled() {
            self.link.command()
        } else {
            self.open_loop.unwrap_or(ArcadeCommand::STOP)
        }
    }
}

// ─── Primitives ─────────────────────────────────────────────────────

impl<Io: RobotIo, C: Clock> RobotContext<Io, C> {
    /// Drive `distance` inches straight, holding heading.
    pub fn drive_distance(&mut self, distance: f64) -> Result<(), MotionError> {
        info!(distance, "drive distance");
        self.telemetry.put_number(TARGET_DISTANCE, distance);

        self.drive.turn.disable();
        self.drive.set_open_loop(None);
        self.io.reset_drive_encoders();
        self.io.reset_heading();
        self.drive.link.link();

        self.drive.heading_hold.set_setpoint(0.0);
        self.drive.distance.set_setpoint(distance);
        self.drive.heading_hold.enable();
        self.drive.distance.enable();

        self.wait_until_steady(Axis::Distance)
    }

    /// Turn in place by `angle` degrees, clockwise positive.
    pub fn turn_angle(&mut self, angle: f64) -> Result<(), MotionError> {
        info!(angle, "turn angle");
        self.telemetry.put_number(TARGET_ANGLE, angle);

        self.drive.distance.disable();
        self.drive.heading_hold.disable();
        self.drive.set_open_loop(None);
        self.io.reset_heading();
        self.drive.link.unlink();

        self.drive.turn.set_setpoint(angle);
        self.drive.turn.enable();

        self.wait_until_steady(Axis::Turn)
    }

    /// Open-loop drive at `speed` for `duration`, then stop.
    pub fn drive_for(&mut self, duration: Duration, speed: f64) -> Result<(), MotionError> {
        info!(?duration, speed, "drive for");
        self.drive.stop();
        self.drive.set_open_loop(Some(ArcadeCommand {
            forward: speed,
            turn: 0.0,
        }));
        let outcome = self.wait(&Wait::elapsed(duration, self.period));
        self.drive.stop();
        self.io.arcade_drive(0.0, 0.0);
        self.finish_timed(outcome, "drive for")
    }

    /// Run the effector outward for the configured eject time.
    pub fn eject_cube(&mut self) -> Result<(), MotionError> {
        debug!("eject cube");
        self.intake = 1.0;
        let outcome = self.wait(&Wait::elapsed(
            self.config.intake.eject_duration(),
            self.period,
        ));
        self.intake = 0.0;
        self.io.set_intake(0.0);
        self.finish_timed(outcome, "eject")
    }

    /// Move the elevator to `step` and wait for it to settle.
    pub fn raise_elevator(&mut self, step: ElevatorStep) -> Result<(), MotionError> {
        info!(?step, height = self.mechanism.table().height(step), "raise elevator");
        self.mechanism.seek(step);
        self.wait_until_steady(Axis::Elevator)
    }

    /// Drive in, raise, eject, lower to GROUND, back out.
    pub fn drop_cube(&mut self, distance: f64, step: ElevatorStep) -> Result<(), MotionError> {
        info!(distance, ?step, "drop cube");
        self.drive_distance(distance)?;
        self.raise_elevator(step)?;
        self.eject_cube()?;
        self.raise_elevator(ElevatorStep::Ground)?;
        self.drive_distance(-distance)
    }

    /// Block until `axis` is on target and stationary, then disable it.
    ///
    /// Bounded by `[settle] timeout_ms`; on timeout the loop is disabled,
    /// the drive stopped and [`MotionError::NotSettled`] returned.
    pub fn wait_until_steady(&mut self, axis: Axis) -> Result<(), MotionError> {
        let settle = self.config.settle;
        let started = self.clock.now();
        let outcome = self.wait(&Wait::settled(
            axis,
            settle.sample_interval(),
            settle.timeout(),
        ));
        let elapsed = self.clock.now().saturating_sub(started);

        match outcome {
            WaitOutcome::Satisfied => {
                self.release_loop(axis);
                debug!(%axis, ?elapsed, "settled");
                Ok(())
            }
            WaitOutcome::TimedOut => {
                let measured = self.measure(axis);
                let setpoint = self.loop_for(axis).setpoint();
                self.release_loop(axis);
                self.drive.stop();
                self.io.arcade_drive(0.0, 0.0);
                error!(%axis, setpoint, measured, ?elapsed, "loop did not settle");
                Err(MotionError::NotSettled {
                    axis,
                    setpoint,
                    measured,
                    elapsed,
                })
            }
            WaitOutcome::Abandoned => {
                self.stop_all();
                Err(MotionError::Abandoned(wait_label(axis)))
            }
        }
    }

    fn finish_timed(&mut self, outcome: WaitOutcome, label: &'static str) -> Result<(), MotionError> {
        match outcome {
            WaitOutcome::Satisfied | WaitOutcome::TimedOut => Ok(()),
            WaitOutcome::Abandoned => {
                self.stop_all();
                Err(MotionError::Abandoned(label))
            }
        }
    }

    /// Disable the loops a primitive enabled. A straight drive owns both
    /// the distance and heading-hold loops and the link between them.
    fn release_loop(&mut self, axis: Axis) {
        match axis {
            Axis::Distance | Axis::HeadingHold => {
                self.drive.distance.disable();
                self.drive.heading_hold.disable();
                self.drive.link.unlink();
            }
            Axis::Turn => self.drive.turn.disable(),
            Axis::Elevator => self.mechanism.release(),
        }
    }
}

fn wait_label(axis: Axis) -> &'static str {
    match axis {
        Axis::Distance | Axis::HeadingHold => "drive distance",
        Axis::Turn => "turn angle",
        Axis::Elevator => "raise elevator",
    }
}
