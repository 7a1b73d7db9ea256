//! Settling behavior against scripted sensors, and output bounds on the
//! simulated robot.

use std::time::Duration;

use stacker_common::consts::DRIVE_FOR_SPEED;
use stacker_common::prelude::*;
use stacker_control::auto::AutonomousSequencer;
use stacker_control::control::{ArcadeCommand, LinkMode};
use stacker_control::hal::RobotIo;
use stacker_control::robot::{RobotContext, SimContext};
use stacker_control::scheduler::SimClock;

use super::{assert_near, autonomous, config};

/// Drive encoder that ramps to `stop_at` at a fixed rate regardless of
/// commands. Everything else reads zero.
struct RampIo {
    travelled: f64,
    origin: f64,
    rate: f64,
    stop_at: f64,
    forward_commands: Vec<f64>,
}

impl RampIo {
    fn new(rate: f64, stop_at: f64) -> Self {
        Self {
            travelled: 0.0,
            origin: 0.0,
            rate,
            stop_at,
            forward_commands: Vec::new(),
        }
    }
}

impl RobotIo for RampIo {
    fn distance(&self) -> f64 {
        self.travelled - self.origin
    }
    fn heading(&self) -> f64 {
        0.0
    }
    fn elevator_height(&self) -> f64 {
        0.0
    }
    fn reset_drive_encoders(&mut self) {
        self.origin = self.travelled;
    }
    fn reset_heading(&mut self) {}
    fn rezero_elevator(&mut self) {}
    fn arcade_drive(&mut self, forward: f64, _turn: f64) {
        self.forward_commands.push(forward);
    }
    fn set_elevator(&mut self, _output: f64) {}
    fn set_intake(&mut self, _output: f64) {}
    fn field_state(&mut self) -> Option<FieldCode> {
        None
    }
    fn advance(&mut self, dt: Duration) {
        self.travelled = (self.travelled + self.rate * dt.as_secs_f64()).min(self.stop_at);
    }
}

fn ramp_robot(io: RampIo, timeout_ms: u64) -> RobotContext<RampIo, SimClock> {
    let mut cfg = RobotConfig::with_service_name("settling");
    cfg.settle.timeout_ms = timeout_ms;
    let mut robot = RobotContext::new(cfg, io, SimClock::new()).unwrap();
    robot.enter_mode(Mode::Autonomous);
    robot
}

#[test]
fn settles_once_stopped_on_target() {
    let mut robot = ramp_robot(RampIo::new(50.0, 100.0), 5_000);
    robot.drive_distance(100.0).unwrap();

    // On target from ~1.93 s but still moving until 2.0 s
    assert!(robot.now() > Duration::from_secs(2));
    assert!(robot.now() <= Duration::from_millis(2050));
    assert!(!robot.loop_for(Axis::Distance).is_enabled());
    assert!(!robot.loop_for(Axis::HeadingHold).is_enabled());
}

#[test]
fn passing_through_target_never_settles() {
    let mut robot = ramp_robot(RampIo::new(50.0, 120.0), 3_000);
    let err = robot.drive_distance(100.0).unwrap_err();
    match err {
        MotionError::NotSettled {
            axis,
            setpoint,
            measured,
            elapsed,
        } => {
            assert_eq!(axis, Axis::Distance);
            assert_eq!(setpoint, 100.0);
            assert_near(measured, 120.0, 1e-9, "measured");
            assert_eq!(elapsed, Duration::from_secs(3));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!robot.drive().any_enabled());
    assert_eq!(robot.io().forward_commands.last(), Some(&0.0));
}

#[test]
fn zero_timeout_waits_for_settling() {
    // Would time out under any bound shorter than the ramp
    let mut robot = ramp_robot(RampIo::new(5.0, 60.0), 0);
    robot.drive_distance(60.0).unwrap();
    assert!(robot.now() > Duration::from_secs(12));
}

#[test]
fn drive_output_stays_in_range() {
    let cfg = config(StartPosition::Left, Objective::Scale, Approach::Front);
    let sequencer = AutonomousSequencer::new(&cfg.auto);
    let mut robot = autonomous(cfg.clone(), Some("LL"));
    sequencer.run(&mut robot).unwrap();

    let distance = cfg.drive.distance;
    for sample in robot.io().log() {
        assert!(
            sample.drive.forward >= distance.out_min && sample.drive.forward <= distance.out_max,
            "forward {} at {:?}",
            sample.drive.forward,
            sample.at
        );
        assert!(sample.drive.turn.abs() <= 1.0);
        assert!(sample.elevator.abs() <= 1.0);
    }
}

#[test]
fn forward_is_nulled_while_turning() {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("turn")).unwrap();
    robot.enter_mode(Mode::Autonomous);

    robot.drive_distance(40.0).unwrap();
    let turn_start = robot.io().log().len();
    robot.turn_angle(-90.0).unwrap();

    let turning = &robot.io().log()[turn_start..];
    assert!(!turning.is_empty());
    assert!(turning.iter().all(|s| s.drive.forward == 0.0));
    assert!(turning.iter().any(|s| s.drive.turn < 0.0));
    assert_near(robot.io().pose().heading, -90.0, 1.5, "heading");
    assert_near(robot.io().pose().y, 40.0, 3.5, "y");
}

#[test]
fn straight_drive_releases_heading_hold() {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("release")).unwrap();
    robot.enter_mode(Mode::Autonomous);
    robot.drive_distance(60.0).unwrap();

    assert!(!robot.drive().any_enabled());
    assert_eq!(robot.drive().link.mode(), LinkMode::Unlinked);

    // Nothing steers the drive once the primitive has returned
    let idle_start = robot.io().log().len();
    let period = robot.period();
    for _ in 0..50 {
        robot.tick(period);
    }
    let idle = &robot.io().log()[idle_start..];
    assert_eq!(idle.len(), 50);
    assert!(idle.iter().all(|s| s.drive == ArcadeCommand::STOP));
}

#[test]
fn timed_drive_runs_open_loop_then_stops() {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("timed")).unwrap();
    robot.enter_mode(Mode::Autonomous);
    robot
        .drive_for(Duration::from_secs(1), DRIVE_FOR_SPEED)
        .unwrap();

    assert_eq!(robot.now(), Duration::from_secs(1));
    let commanded = ArcadeCommand {
        forward: DRIVE_FOR_SPEED,
        turn: 0.0,
    };
    let driving = robot.io().log();
    assert_eq!(driving.len(), 100);
    assert!(driving.iter().all(|s| s.drive == commanded));
    assert!(robot.io().pose().y > 5.0);
    assert_near(robot.io().pose().heading, 0.0, 1e-9, "heading");

    // Stopped afterwards: no loop, no open-loop command
    assert!(!robot.drive().any_enabled());
    assert!(robot.drive().open_loop().is_none());
    let period = robot.period();
    robot.tick(period);
    assert_eq!(robot.io().log().last().map(|s| s.drive), Some(ArcadeCommand::STOP));
}

#[test]
fn heading_held_while_driving() {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("straight")).unwrap();
    robot.enter_mode(Mode::Autonomous);
    robot.drive_distance(120.0).unwrap();
    let pose = robot.io().pose();
    assert_near(pose.heading, 0.0, 0.5, "heading");
    assert_near(pose.x, 0.0, 0.5, "x");
    assert_near(robot.io().distance(), 120.0, 3.5, "distance");
}

#[test]
fn elevator_settles_at_step() {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("lift")).unwrap();
    robot.enter_mode(Mode::Autonomous);
    robot.raise_elevator(ElevatorStep::ScaleLow).unwrap();
    assert_near(robot.io().elevator_height(), 50.0, 0.5, "height");
    assert_eq!(robot.mechanism().state(), MechanismState::Idle);
}
