//! Autonomous routines end to end on the simulated robot.

use std::time::Duration;

use stacker_common::prelude::*;
use stacker_control::auto::{Action, AutoError, AutoReport, AutonomousSequencer, PathKind};
use stacker_control::control::ArcadeCommand;
use stacker_control::hal::SimRobot;
use stacker_control::robot::{RobotContext, SimContext};

use super::{TripClock, assert_near, autonomous, autonomous_at, config};

fn run(
    start: StartPosition,
    objective: Objective,
    approach: Approach,
    code: Option<&str>,
) -> (SimContext, AutoReport) {
    let cfg = config(start, objective, approach);
    let sequencer = AutonomousSequencer::new(&cfg.auto);
    let mut robot = autonomous(cfg, code);
    let report = sequencer.run(&mut robot).unwrap();
    (robot, report)
}

#[test]
fn left_start_own_switch_places_one_cube() {
    let (robot, report) = run(
        StartPosition::Left,
        Objective::Default,
        Approach::Front,
        Some("LL"),
    );
    assert_eq!(report.plan.kind, PathKind::SidePath);
    assert_eq!(report.completed, 3);
    assert!(!report.fell_back());

    let ejections = robot.io().ejections();
    assert_eq!(ejections.len(), 1);
    let cube = ejections[0];
    assert_near(cube.elevator_height, 22.0, 1.0, "eject height");
    assert_near(cube.pose.y, 148.0, 4.0, "eject y");
    assert_near(cube.pose.x, 5.0, 2.0, "eject x");
    assert_near(cube.pose.heading, 90.0, 2.0, "eject heading");

    // Backed out and lowered again
    let pose = robot.io().pose();
    assert_near(pose.x, 0.0, 2.0, "final x");
    assert_near(robot.io().carriage(), 1.0, 1.0, "final carriage");
    assert!(!robot.drive().any_enabled());
}

#[test]
fn right_start_mirrors_turns() {
    let (robot, report) = run(
        StartPosition::Right,
        Objective::Default,
        Approach::Front,
        Some("RR"),
    );
    assert_eq!(report.plan.kind, PathKind::SidePath);
    assert_eq!(report.plan.actions[1], Action::Turn(-90.0));

    let cube = robot.io().ejections()[0];
    assert_near(cube.pose.heading, -90.0, 2.0, "eject heading");
    assert_near(cube.pose.x, -5.0, 2.0, "eject x");
}

#[test]
fn left_start_continues_to_own_scale() {
    let (robot, report) = run(
        StartPosition::Left,
        Objective::Default,
        Approach::Front,
        Some("RL"),
    );
    assert_eq!(report.completed, 8);

    let ejections = robot.io().ejections();
    assert_eq!(ejections.len(), 1);
    let cube = ejections[0];
    assert_near(cube.elevator_height, 62.0, 1.0, "eject height");
    assert_near(cube.pose.x, -9.0, 4.0, "eject x");
    assert_near(cube.pose.y, 304.0, 6.0, "eject y");
}

#[test]
fn left_start_neither_side_only_drives() {
    let (robot, report) = run(
        StartPosition::Left,
        Objective::Default,
        Approach::Front,
        Some("RR"),
    );
    assert_eq!(report.completed, 2);
    assert!(robot.io().ejections().is_empty());
    assert_near(robot.io().pose().y, 248.0, 5.0, "final y");
}

#[test]
fn middle_start_follows_scale_character() {
    let (robot, report) = run(
        StartPosition::Middle,
        Objective::Default,
        Approach::Front,
        Some("LR"),
    );
    assert_eq!(report.plan.kind, PathKind::MiddlePath);
    // Scale on the right: first turn is clockwise
    assert_eq!(report.plan.actions[1], Action::Turn(90.0));

    let cube = robot.io().ejections()[0];
    assert_near(cube.pose.x, 29.0, 3.0, "eject x");
    assert_near(cube.pose.y, 120.5, 5.0, "eject y");
    assert_near(cube.elevator_height, 22.0, 1.0, "eject height");
}

#[test]
fn baseline_objective_ignores_field_state() {
    let (robot, report) = run(
        StartPosition::Left,
        Objective::Baseline,
        Approach::Front,
        Some("LL"),
    );
    assert!(!report.fell_back());
    assert_eq!(report.plan.kind, PathKind::Baseline);
    assert!(robot.io().ejections().is_empty());
    assert_near(robot.io().pose().y, 85.0, 3.5, "final y");
}

#[test]
fn missing_field_state_falls_back_after_timeout() {
    let (robot, report) = run(
        StartPosition::Left,
        Objective::Switch,
        Approach::Front,
        None,
    );
    assert!(report.fell_back());
    assert_eq!(report.field_wait, Duration::from_millis(2500));
    assert_eq!(report.plan.kind, PathKind::Baseline);

    // Nothing moved while waiting
    let waiting = robot
        .io()
        .log()
        .iter()
        .filter(|s| s.at < Duration::from_millis(2500));
    assert!(waiting.clone().count() > 0);
    assert!(waiting.into_iter().all(|s| s.drive == ArcadeCommand::STOP));
    assert_near(robot.io().pose().y, 85.0, 3.5, "final y");
}

#[test]
fn late_field_state_is_used() {
    let cfg = config(StartPosition::Left, Objective::Switch, Approach::Front);
    let sequencer = AutonomousSequencer::new(&cfg.auto);
    let mut robot = autonomous_at(cfg, Some("LR"), Duration::from_millis(1200));
    let report = sequencer.run(&mut robot).unwrap();
    assert_eq!(report.field_wait, Duration::from_millis(1200));
    assert_eq!(report.plan.kind, PathKind::NearSwitch);
    assert_eq!(robot.io().ejections().len(), 1);
}

#[test]
fn startup_delay_holds_the_robot() {
    let mut cfg = config(StartPosition::Left, Objective::Baseline, Approach::Front);
    cfg.auto.delay_s = 1.0;
    let sequencer = AutonomousSequencer::new(&cfg.auto);
    let mut robot = autonomous(cfg, Some("LL"));
    sequencer.run(&mut robot).unwrap();

    let log = robot.io().log();
    assert!(
        log.iter()
            .filter(|s| s.at < Duration::from_secs(1))
            .all(|s| s.drive == ArcadeCommand::STOP)
    );
    let first_move = log
        .iter()
        .find(|s| s.drive != ArcadeCommand::STOP)
        .map(|s| s.at)
        .unwrap();
    assert_eq!(first_move, Duration::from_secs(1));
}

#[test]
fn clearing_mode_flag_abandons_and_stops() {
    let cfg = config(StartPosition::Left, Objective::Default, Approach::Front);
    let sequencer = AutonomousSequencer::new(&cfg.auto);
    let (clock, slot) = TripClock::new(Duration::from_secs(1));
    let io = SimRobot::new(cfg.sim.clone());
    let mut robot = RobotContext::new(cfg, io, clock).unwrap();
    robot.io_mut().set_field_state(Some("LL"), Duration::ZERO);
    robot.enter_mode(Mode::Autonomous);
    *slot.lock().unwrap() = Some(robot.mode_flag());

    let err = sequencer.run(&mut robot).unwrap_err();
    assert!(err.is_abandoned());
    match err {
        AutoError::Action { index, source, .. } => {
            assert_eq!(index, 0);
            assert_eq!(source, MotionError::Abandoned("drive distance"));
        }
        other => panic!("unexpected {other:?}"),
    }

    // Stopped at the first tick after the flag cleared
    assert_eq!(robot.now(), Duration::from_secs(1));
    assert!(!robot.drive().any_enabled());
    assert_eq!(robot.io().drive_command(), ArcadeCommand::STOP);
    assert_eq!(robot.io().elevator_command(), 0.0);
    assert_eq!(robot.io().intake_command(), 0.0);
    assert!(robot.io().pose().y < 148.0);
}

#[test]
fn middle_side_approach_turns_right_first() {
    let (robot, report) = run(
        StartPosition::Middle,
        Objective::Default,
        Approach::Side,
        Some("LR"),
    );
    assert_eq!(report.plan.kind, PathKind::MiddlePath);
    assert_eq!(report.plan.actions[1], Action::Turn(90.0));
    assert_eq!(report.completed, 7);

    let cube = robot.io().ejections()[0];
    assert_near(cube.pose.x, 79.0, 5.0, "eject x");
    assert_near(cube.pose.y, 148.5, 5.0, "eject y");
    assert_near(cube.pose.heading, 90.0, 3.0, "eject heading");
}
