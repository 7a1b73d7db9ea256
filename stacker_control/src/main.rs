//! # Stacker Control Runner
//!
//! Runs the control core against the simulated robot. `auto` plays the
//! autonomous routine picked by the selectors; `teleop` plays a short
//! scripted operator session. By default the simulation runs as fast as it
//! can; `--realtime` paces it with the wall clock.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use stacker_common::prelude::*;
use stacker_control::auto::AutonomousSequencer;
use stacker_control::config::{AutoOverrides, load_config};
use stacker_control::control::ArcadeCommand;
use stacker_control::hal::{RobotIo, SimRobot};
use stacker_control::mechanism::MechanismInput;
use stacker_control::robot::RobotContext;
use stacker_control::scheduler::{Clock, SimClock, SystemClock};
use stacker_control::telemetry::TracingTelemetry;
use stacker_control::teleop::{IntakeCommand, OperatorInput};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Stacker robot control core, simulated
#[derive(Parser, Debug)]
#[command(name = "stacker_control")]
#[command(version)]
#[command(about = "Closed-loop drive, elevator stepping and autonomous routines on a simulated robot")]
struct Args {
    /// Robot configuration TOML. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Which operating mode to run.
    #[arg(long, value_enum, default_value_t = RunMode::Auto)]
    mode: RunMode,

    /// Starting position selector.
    #[arg(long, value_enum)]
    start: Option<CliStart>,

    /// Objective selector.
    #[arg(long, value_enum)]
    objective: Option<CliObjective>,

    /// Switch approach selector.
    #[arg(long, value_enum)]
    approach: Option<CliApproach>,

    /// Startup delay in seconds.
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Field-state code the simulated field publishes (e.g. "LR").
    #[arg(long, value_name = "CODE", conflicts_with = "no_field_state")]
    field_state: Option<String>,

    /// Simulate a field that never publishes its state.
    #[arg(long)]
    no_field_state: bool,

    /// Pace control ticks with the wall clock.
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    Auto,
    Teleop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliStart {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliObjective {
    Default,
    Switch,
    Scale,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliApproach {
    Front,
    Side,
}

impl Args {
    fn overrides(&self) -> AutoOverrides {
        AutoOverrides {
            start: self.start.map(|s| match s {
                CliStart::Left => StartPosition::Left,
                CliStart::Middle => StartPosition::Middle,
                CliStart::Right => StartPosition::Right,
            }),
            objective: self.objective.map(|o| match o {
                CliObjective::Default => Objective::Default,
                CliObjective::Switch => Objective::Switch,
                CliObjective::Scale => Objective::Scale,
                CliObjective::Baseline => Objective::Baseline,
            }),
            approach: self.approach.map(|a| match a {
                CliApproach::Front => Approach::Front,
                CliApproach::Side => Approach::Side,
            }),
            delay_s: self.delay,
        }
    }
}

fn main() {
    let args = Args::parse();
    let loaded = resolve_config(&args);
    let level = loaded
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Stacker control v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Stacker control shutdown complete");
}

fn resolve_config(args: &Args) -> Result<RobotConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RobotConfig::with_service_name("stacker-sim"),
    };
    args.overrides().apply(&mut config)?;
    if args.no_field_state {
        config.sim.field_state = None;
    } else if let Some(code) = &args.field_state {
        config.sim.field_state = Some(code.clone());
    }
    Ok(config)
}

fn run(args: &Args, config: RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = %config.shared.service_name,
        period = ?config.control_period(),
        field_state = ?config.sim.field_state,
        realtime = args.realtime,
        "config OK"
    );
    let io = SimRobot::new(config.sim.clone());
    if args.realtime {
        let robot = RobotContext::new(config, io, SystemClock::new())?;
        run_mode(args.mode, robot)
    } else {
        let robot = RobotContext::new(config, io, SimClock::new())?;
        run_mode(args.mode, robot)
    }
}

fn run_mode<C: Clock>(
    mode: RunMode,
    robot: RobotContext<SimRobot, C>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut robot = robot.with_telemetry(Box::new(TracingTelemetry));

    // Ctrl-C ends the current mode; blocking waits see the flag and unwind.
    let flag = robot.mode_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.clear();
    })?;

    let result = match mode {
        RunMode::Auto => run_autonomous(&mut robot),
        RunMode::Teleop => run_teleop(&mut robot),
    };
    robot.enter_mode(Mode::Disabled);
    robot.publish();

    let pose = robot.io().pose();
    info!(
        x = pose.x,
        y = pose.y,
        heading = pose.heading,
        elevator = robot.io().carriage(),
        ejections = robot.io().ejections().len(),
        elapsed = ?robot.now(),
        "final robot state"
    );
    for (i, e) in robot.io().ejections().iter().enumerate() {
        info!(
            index = i,
            at = ?e.at,
            height = e.elevator_height,
            x = e.pose.x,
            y = e.pose.y,
            "cube ejected"
        );
    }
    result
}

fn run_autonomous<C: Clock>(
    robot: &mut RobotContext<SimRobot, C>,
) -> Result<(), Box<dyn std::error::Error>> {
    let sequencer = AutonomousSequencer::new(&robot.config().auto);
    robot.enter_mode(Mode::Autonomous);
    match sequencer.run(robot) {
        Ok(report) => {
            info!(
                path = ?report.plan.kind,
                actions = report.completed,
                fell_back = report.fell_back(),
                field_wait = ?report.field_wait,
                "autonomous finished"
            );
            Ok(())
        }
        Err(e) if e.is_abandoned() => {
            warn!(error = %e, "autonomous abandoned");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

// ─── Scripted Teleop ────────────────────────────────────────────────

/// One phase of the scripted operator session. Buttons fire on the
/// first tick of the phase only.
struct Phase {
    duration: Duration,
    input: OperatorInput,
}

fn teleop_script() -> [Phase; 6] {
    let forward = ArcadeCommand {
        forward: 0.6,
        turn: 0.0,
    };
    let button = |advance: bool, lower_to_bottom: bool| MechanismInput {
        advance,
        lower_to_bottom,
        ..Default::default()
    };
    [
        Phase {
            duration: Duration::from_millis(1500),
            input: OperatorInput {
                drive: forward,
                ..Default::default()
            },
        },
        Phase {
            duration: Duration::from_millis(2000),
            input: OperatorInput {
                elevator: button(true, false),
                ..Default::default()
            },
        },
        Phase {
            duration: Duration::from_millis(2000),
            input: OperatorInput {
                elevator: button(true, false),
                ..Default::default()
            },
        },
        Phase {
            duration: Duration::from_millis(500),
            input: OperatorInput {
                intake: IntakeCommand::Eject,
                ..Default::default()
            },
        },
        Phase {
            duration: Duration::from_millis(2500),
            input: OperatorInput {
                elevator: button(false, true),
                ..Default::default()
            },
        },
        Phase {
            duration: Duration::from_millis(1000),
            input: OperatorInput {
                drive: forward.scaled(-1.0),
                ..Default::default()
            },
        },
    ]
}

fn run_teleop<C: Clock>(
    robot: &mut RobotContext<SimRobot, C>,
) -> Result<(), Box<dyn std::error::Error>> {
    robot.enter_mode(Mode::Teleop);
    let flag = robot.mode_flag();
    let period = robot.period();

    for (index, phase) in teleop_script().iter().enumerate() {
        info!(index, duration = ?phase.duration, "teleop phase");
        let held = OperatorInput {
            elevator: MechanismInput {
                advance: false,
                lower_to_bottom: false,
                rezero: false,
                ..phase.input.elevator
            },
            ..phase.input
        };
        let mut elapsed = Duration::ZERO;
        let mut input = &phase.input;
        while elapsed < phase.duration {
            if !flag.is_active() {
                warn!(index, "teleop interrupted");
                return Ok(());
            }
            robot.teleop_periodic(input);
            robot.tick(period);
            robot.publish();
            input = &held;
            elapsed += period;
        }
        info!(
            index,
            state = ?robot.mechanism().state(),
            height = robot.io().elevator_height(),
            "phase complete"
        );
    }
    Ok(())
}

// ─── Logging ────────────────────────────────────────────────────────

fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match configured {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
