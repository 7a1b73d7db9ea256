//! Operator sessions driving the elevator mechanism on the simulated robot.

use std::time::Duration;

use stacker_common::prelude::*;
use stacker_control::control::ArcadeCommand;
use stacker_control::hal::RobotIo;
use stacker_control::mechanism::MechanismInput;
use stacker_control::robot::SimContext;
use stacker_control::teleop::OperatorInput;

use super::assert_near;

/// Default control period.
const TICK: Duration = Duration::from_millis(10);

fn session() -> SimContext {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("teleop")).unwrap();
    robot.enter_mode(Mode::Teleop);
    robot
}

/// Run teleop periods for `duration`. Button edges only on the first one.
fn hold(robot: &mut SimContext, input: OperatorInput, duration: Duration) {
    let period = robot.period();
    let held = OperatorInput {
        elevator: MechanismInput {
            advance: false,
            lower_to_bottom: false,
            rezero: false,
            ..input.elevator
        },
        ..input
    };
    let mut elapsed = Duration::ZERO;
    let mut current = input;
    while elapsed < duration {
        robot.teleop_periodic(&current);
        robot.tick(period);
        current = held;
        elapsed += period;
    }
}

fn elevator(input: MechanismInput) -> OperatorInput {
    OperatorInput {
        elevator: input,
        ..Default::default()
    }
}

fn press_advance(robot: &mut SimContext, settle: Duration) {
    hold(
        robot,
        elevator(MechanismInput {
            advance: true,
            ..Default::default()
        }),
        settle,
    );
}

#[test]
fn advance_walks_the_step_table() {
    let mut robot = session();
    let steps = [1.0, 22.0, 50.0, 62.0, 68.0];

    for (index, height) in steps.iter().enumerate() {
        press_advance(&mut robot, Duration::from_secs(4));
        let m = robot.mechanism();
        assert_eq!(m.target(), index);
        assert_eq!(m.state(), MechanismState::AutoHolding, "step {index}");
        assert!(m.flags().contains(MechanismFlags::AUTO));
        assert_near(robot.io().elevator_height(), *height, 0.5, "step height");
    }

    // Saturates at the top entry
    press_advance(&mut robot, Duration::from_secs(1));
    assert_eq!(robot.mechanism().target(), 4);
    assert_near(robot.io().elevator_height(), 68.0, 0.5, "top height");
}

#[test]
fn lower_to_bottom_returns_to_ground() {
    let mut robot = session();
    press_advance(&mut robot, Duration::from_secs(3));
    press_advance(&mut robot, Duration::from_secs(3));
    assert_near(robot.io().elevator_height(), 22.0, 0.5, "switch height");

    let lower = elevator(MechanismInput {
        lower_to_bottom: true,
        ..Default::default()
    });
    hold(&mut robot, lower, TICK);
    assert_eq!(robot.mechanism().state(), MechanismState::Lowering);
    assert!(robot.mechanism().flags().contains(MechanismFlags::LOWERING));

    hold(&mut robot, OperatorInput::default(), Duration::from_secs(4));
    assert_eq!(robot.mechanism().state(), MechanismState::AutoHolding);
    assert!(!robot.mechanism().flags().contains(MechanismFlags::LOWERING));
    assert_near(robot.io().elevator_height(), 1.0, 0.5, "ground height");
}

#[test]
fn advance_while_lowering_stops_the_elevator() {
    let mut robot = session();
    press_advance(&mut robot, Duration::from_secs(3));
    press_advance(&mut robot, Duration::from_secs(3));
    let lower = elevator(MechanismInput {
        lower_to_bottom: true,
        ..Default::default()
    });
    hold(&mut robot, lower, Duration::from_millis(200));
    assert_eq!(robot.mechanism().state(), MechanismState::Lowering);

    press_advance(&mut robot, TICK);
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
    assert_eq!(robot.mechanism().output(), 0.0);
    assert!(!robot.mechanism().pid().is_enabled());
}

#[test]
fn trigger_takes_over_and_release_idles() {
    let mut robot = session();
    press_advance(&mut robot, Duration::from_secs(3));
    press_advance(&mut robot, Duration::from_secs(3));
    let start = robot.io().elevator_height();

    let raise = elevator(MechanismInput {
        raise: 0.6,
        ..Default::default()
    });
    hold(&mut robot, raise, Duration::from_millis(500));
    assert_eq!(robot.mechanism().state(), MechanismState::Manual);
    assert_eq!(robot.io().elevator_command(), 0.6);
    assert!(robot.io().elevator_height() > start + 5.0);

    hold(&mut robot, OperatorInput::default(), TICK);
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
    assert_eq!(robot.io().elevator_command(), 0.0);
}

#[test]
fn trigger_inside_deadband_is_ignored() {
    let mut robot = session();
    let raise = elevator(MechanismInput {
        raise: 0.05,
        ..Default::default()
    });
    hold(&mut robot, raise, Duration::from_millis(200));
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
    assert_eq!(robot.io().elevator_command(), 0.0);
}

#[test]
fn override_blocks_step_events() {
    let mut robot = session();
    let input = elevator(MechanismInput {
        advance: true,
        override_held: true,
        ..Default::default()
    });
    hold(&mut robot, input, Duration::from_millis(500));
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
    assert!(robot.mechanism().flags().contains(MechanismFlags::OVERRIDE));
    assert_near(robot.io().elevator_height(), 0.0, 1e-9, "height");
}

#[test]
fn override_bypasses_stop_and_rezeroes_on_release() {
    let mut robot = session();
    // Encoder reads below the expected zero
    robot.io_mut().set_encoder_drift(0.5);
    assert_near(robot.io().elevator_height(), -0.5, 1e-9, "drifted height");

    let lower = elevator(MechanismInput {
        lower: 1.0,
        ..Default::default()
    });
    hold(&mut robot, lower, TICK);
    assert_eq!(robot.mechanism().state(), MechanismState::Manual);
    assert_eq!(robot.io().elevator_command(), 0.0);

    let forced = elevator(MechanismInput {
        lower: 1.0,
        override_held: true,
        ..Default::default()
    });
    hold(&mut robot, forced, TICK);
    assert_eq!(robot.io().elevator_command(), -1.0);

    hold(&mut robot, OperatorInput::default(), TICK);
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
    assert!(!robot.mechanism().flags().contains(MechanismFlags::OVERRIDE));
    assert_near(robot.io().elevator_height(), 0.0, 1e-9, "re-zeroed height");
}

#[test]
fn drive_slows_with_elevator_raised() {
    let mut robot = session();
    let drive = ArcadeCommand {
        forward: 0.8,
        turn: -0.4,
    };
    let input = OperatorInput {
        drive,
        ..Default::default()
    };
    hold(&mut robot, input, TICK);
    assert_eq!(robot.io().drive_command(), drive);

    press_advance(&mut robot, Duration::from_secs(3));
    press_advance(&mut robot, Duration::from_secs(3));
    hold(&mut robot, input, TICK);
    assert_eq!(robot.io().drive_command(), drive.scaled(0.5));
}

#[test]
fn mode_change_resets_mechanism() {
    let mut robot = session();
    press_advance(&mut robot, Duration::from_secs(3));
    press_advance(&mut robot, Duration::from_millis(100));
    assert_eq!(robot.mechanism().state(), MechanismState::AutoSeeking);

    robot.enter_mode(Mode::Disabled);
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
    assert!(robot.mechanism().flags().contains(MechanismFlags::SAFETY_MODE));
    assert!(!robot.mechanism().flags().contains(MechanismFlags::AUTO));
    assert_eq!(robot.io().elevator_command(), 0.0);
}
