//! Operator-controlled periods.
//!
//! Input devices are decoded elsewhere; these handlers take the decoded
//! commands once per periodic call and leave the control ticks to the
//! robot context.

use tracing::debug;

use crate::control::ArcadeCommand;
use crate::hal::RobotIo;
use crate::mechanism::{MechanismEvent, MechanismInput};
use crate::robot::RobotContext;
use crate::scheduler::Clock;

/// Effector command.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum IntakeCommand {
    #[default]
    Idle,
    /// Pull a cube in at the configured speed.
    Intake,
    /// Push a cube out at the configured speed.
    Eject,
    /// Direct speed, positive outward.
    Variable(f64),
}

impl IntakeCommand {
    /// Effector output for this command.
    pub fn output(self, speed: f64) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Intake => -speed,
            Self::Eject => speed,
            Self::Variable(v) => v.clamp(-1.0, 1.0),
        }
    }
}

/// Decoded operator input for one periodic call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OperatorInput {
    pub drive: ArcadeCommand,
    pub elevator: MechanismInput,
    pub intake: IntakeCommand,
}

impl<Io: RobotIo, C: Clock> RobotContext<Io, C> {
    /// Teleop: step buttons, manual axes, open-loop drive and intake.
    pub fn teleop_periodic(&mut self, input: &OperatorInput) {
        let height = self.io.elevator_height();
        if self.mechanism.update(&input.elevator, height) {
            debug!(height, "re-zeroing elevator");
            self.io.rezero_elevator();
        }
        self.apply_drive_and_intake(input, height);
    }

    /// Test mode: the analog axes jog the elevator setpoint.
    pub fn test_periodic(&mut self, input: &OperatorInput) {
        let height = self.io.elevator_height();
        let elevator = &input.elevator;
        if elevator.rezero {
            self.mechanism.update(elevator, height);
            self.io.rezero_elevator();
        } else {
            self.mechanism.jog(elevator.raise, elevator.lower, height);
            if elevator.advance {
                let _ = self.mechanism.handle_event(MechanismEvent::Advance, height);
            }
            if elevator.lower_to_bottom {
                let _ = self
                    .mechanism
                    .handle_event(MechanismEvent::LowerToBottom, height);
            }
        }
        self.apply_drive_and_intake(input, height);
    }

    fn apply_drive_and_intake(&mut self, input: &OperatorInput, height: f64) {
        let elevator = &self.config.elevator;
        let drive = if height > elevator.drive_reduction_height {
            input.drive.scaled(elevator.drive_speed_reduction)
        } else {
            input.drive
        };
        self.drive.set_open_loop(Some(drive));
        self.intake = input.intake.output(self.config.intake.speed);
    }
}
