//! Control tick micro-benchmark.
//!
//! Measures the per-tick cost of the control stages:
//! - PID compute alone
//! - One feedback loop step (PID + clamp + bookkeeping)
//! - Mechanism tick (loop + settle tracker + stop capping)
//! - Full robot ticks against the simulated plant

use std::hint::black_box;
use std::time::Duration;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use stacker_common::prelude::*;
use stacker_control::control::pid::{PidGains, PidState, pid_compute};
use stacker_control::control::{ArcadeCommand, FeedbackLoop, SettleCriteria, Sink, Source};
use stacker_control::mechanism::{MechanismController, MechanismInput};
use stacker_control::robot::SimContext;
use stacker_control::teleop::OperatorInput;

const DT: f64 = 0.01; // 100 Hz

fn bench_pid_only(c: &mut Criterion) {
    let gains = PidGains {
        kp: 0.03,
        ki: 0.001,
        kd: 0.003,
    };
    let mut state = PidState::default();
    let mut cycle = 0u64;

    c.bench_function("pid_compute", |b| {
        b.iter(|| {
            cycle += 1;
            let t = cycle as f64 * DT;
            let error = 20.0 * t.sin(); // oscillating error
            pid_compute(&mut state, &gains, black_box(error), DT, (-0.7, 0.7))
        });
    });
}

fn bench_feedback_step(c: &mut Criterion) {
    let config = DriveConfig::default();
    let mut fl = FeedbackLoop::new(
        Axis::Distance,
        Source::DriveDistance,
        Sink::DriveForward,
        &config.distance,
    );
    fl.set_setpoint(100.0);
    fl.enable();
    let mut cycle = 0u64;

    c.bench_function("feedback_loop_step", |b| {
        b.iter(|| {
            cycle += 1;
            let measured = 100.0 - 50.0 * (cycle as f64 * DT).cos();
            fl.step(black_box(measured), DT)
        });
    });
}

fn bench_mechanism_tick(c: &mut Criterion) {
    let config = ElevatorConfig::default();
    let criteria = SettleCriteria::from(&SettleConfig::default());
    let mut mechanism = MechanismController::new(&config, criteria).unwrap();
    mechanism.seek(ElevatorStep::ScaleHigh);
    let dt = Duration::from_secs_f64(DT);
    let mut cycle = 0u64;

    c.bench_function("mechanism_tick", |b| {
        b.iter(|| {
            cycle += 1;
            let height = 62.0 + 2.0 * (cycle as f64 * DT).sin();
            mechanism.tick(black_box(height), dt)
        });
    });
}

/// Teleop robot with the elevator seeking and the drive open-loop.
fn seeking_robot() -> SimContext {
    let mut robot = SimContext::simulated(RobotConfig::with_service_name("bench")).unwrap();
    robot.enter_mode(Mode::Teleop);
    robot.teleop_periodic(&OperatorInput {
        drive: ArcadeCommand {
            forward: 0.5,
            turn: 0.1,
        },
        elevator: MechanismInput {
            advance: true,
            ..Default::default()
        },
        ..Default::default()
    });
    robot
}

fn bench_robot_ticks(c: &mut Criterion) {
    let period = Duration::from_secs_f64(DT);

    // The simulated plant logs every tick; a fresh robot per batch keeps the log short.
    c.bench_function("robot_100_ticks_sim", |b| {
        b.iter_batched(
            seeking_robot,
            |mut robot| {
                for _ in 0..100 {
                    robot.tick(black_box(period));
                }
                robot
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_pid_only,
    bench_feedback_step,
    bench_mechanism_tick,
    bench_robot_ticks,
);
criterion_main!(benches);
