//! Configuration structures for the control core.
//!
//! All config types use `serde::Deserialize` for TOML loading. Every section
//! is optional and falls back to the defaults in [`crate::consts`]; only
//! `[shared] service_name` is required.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig, Validate};
use crate::consts::{
    BASELINE_DISTANCE, CONTROL_PERIOD_MS, DRIVE_REDUCTION_HEIGHT, DRIVE_SPEED_REDUCTION,
    EJECT_MS, ELEVATOR_JOG_PER_TICK, ELEVATOR_SPEED_REDUCTION, ELEVATOR_STEPS,
    FIELD_STATE_POLL_MS, FIELD_STATE_TIMEOUT_MS, INTAKE_SPEED, NUM_ELEVATOR_STEPS,
    REZERO_TOLERANCE, SETTLE_SAMPLE_MS, SETTLE_TIMEOUT_MS, SETTLE_VELOCITY_THRESHOLD,
    TRIGGER_DEADBAND,
};

use super::state::{Approach, ElevatorStep, Objective, StartPosition};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete robot configuration.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    pub shared: SharedConfig,

    /// Control tick period [ms].
    #[serde(default = "default_control_period_ms")]
    pub control_period_ms: u64,

    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub settle: SettleConfig,

    #[serde(default)]
    pub elevator: ElevatorConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub auto: AutoConfig,

    #[serde(default)]
    pub sim: SimConfig,
}

fn default_control_period_ms() -> u64 {
    CONTROL_PERIOD_MS
}

impl RobotConfig {
    /// Defaults everywhere, with the given service name.
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: service_name.into(),
            },
            control_period_ms: CONTROL_PERIOD_MS,
            drive: DriveConfig::default(),
            settle: SettleConfig::default(),
            elevator: ElevatorConfig::default(),
            intake: IntakeConfig::default(),
            auto: AutoConfig::default(),
            sim: SimConfig::default(),
        }
    }

    #[inline]
    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }
}

impl Validate for RobotConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.control_period_ms == 0 {
            return Err(invalid("control_period_ms must be > 0"));
        }
        self.drive.distance.validate_named("drive.distance")?;
        self.drive.heading_hold.validate_named("drive.heading_hold")?;
        self.drive.turn.validate_named("drive.turn")?;
        self.settle.validate()?;
        self.elevator.validate()?;
        self.intake.validate()?;
        self.auto.validate()?;
        self.sim.validate()?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(format!("{name} {value} out of range (0, 1]")));
    }
    Ok(())
}

// ─── Feedback Loops ─────────────────────────────────────────────────

/// Gains, tolerance and output range of one feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    /// Absolute on-target tolerance [loop units].
    pub tolerance: f64,
    pub out_min: f64,
    pub out_max: f64,
}

impl LoopConfig {
    fn validate_named(&self, name: &str) -> Result<(), ConfigError> {
        if !(self.tolerance >= 0.0) {
            return Err(invalid(format!("{name}.tolerance must be >= 0")));
        }
        if !(self.out_min < self.out_max) {
            return Err(invalid(format!(
                "{name} output range [{}, {}] is empty",
                self.out_min, self.out_max
            )));
        }
        if self.out_min < -1.0 || self.out_max > 1.0 {
            return Err(invalid(format!("{name} output range exceeds [-1, 1]")));
        }
        Ok(())
    }
}

/// Drive-base loops. Omitted loops keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Straight-line distance [in].
    pub distance: LoopConfig,
    /// Heading correction while driving straight [deg].
    pub heading_hold: LoopConfig,
    /// Rotate-in-place [deg].
    pub turn: LoopConfig,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            distance: LoopConfig {
                kp: 0.03,
                ki: 0.0,
                kd: 0.003,
                tolerance: 3.5,
                out_min: -0.7,
                out_max: 0.7,
            },
            heading_hold: LoopConfig {
                kp: 0.04,
                ki: 0.0,
                kd: 0.0,
                tolerance: 0.5,
                out_min: -1.0,
                out_max: 1.0,
            },
            turn: LoopConfig {
                kp: 0.04,
                ki: 0.0,
                kd: 0.002,
                tolerance: 1.0,
                out_min: -0.3,
                out_max: 0.3,
            },
        }
    }
}

// ─── Settling ───────────────────────────────────────────────────────

/// Settling detection parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Velocity sample interval [ms].
    #[serde(default = "default_settle_sample_ms")]
    pub sample_ms: u64,
    /// Stationary threshold [units/s].
    #[serde(default = "default_settle_velocity")]
    pub velocity_threshold: f64,
    /// Bound on a single settling wait [ms]; 0 waits forever.
    #[serde(default = "default_settle_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_settle_sample_ms() -> u64 {
    SETTLE_SAMPLE_MS
}
fn default_settle_velocity() -> f64 {
    SETTLE_VELOCITY_THRESHOLD
}
fn default_settle_timeout_ms() -> u64 {
    SETTLE_TIMEOUT_MS
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            sample_ms: SETTLE_SAMPLE_MS,
            velocity_threshold: SETTLE_VELOCITY_THRESHOLD,
            timeout_ms: SETTLE_TIMEOUT_MS,
        }
    }
}

impl SettleConfig {
    #[inline]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_ms)
    }

    /// `None` when the wait is unbounded.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_ms == 0 {
            return Err(invalid("settle.sample_ms must be > 0"));
        }
        if !(self.velocity_threshold > 0.0) {
            return Err(invalid("settle.velocity_threshold must be > 0"));
        }
        Ok(())
    }
}

// ─── Elevator ───────────────────────────────────────────────────────

/// Elevator loop, step table and stop protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatorConfig {
    #[serde(default = "default_elevator_loop")]
    pub control: LoopConfig,

    /// Step heights [in]: GROUND, SWITCH, SCALE_LOW, SCALE_HIGH, MAX.
    #[serde(default = "default_steps")]
    pub steps: Vec<f64>,

    /// Slow down near the mechanical stops.
    #[serde(default = "default_true")]
    pub safety_mode: bool,

    /// Output multiplier inside the slow-down bands.
    #[serde(default = "default_elevator_reduction")]
    pub speed_reduction: f64,

    /// Moving down below this step is slowed.
    #[serde(default = "default_slow_below")]
    pub slow_below: ElevatorStep,

    /// Moving up above this step is slowed.
    #[serde(default = "default_slow_above")]
    pub slow_above: ElevatorStep,

    /// Deadband on the raise/lower axes.
    #[serde(default = "default_deadband")]
    pub deadband: f64,

    /// Readings below `-rezero_tolerance` are re-zeroed on override release [in].
    #[serde(default = "default_rezero_tolerance")]
    pub rezero_tolerance: f64,

    /// Jog mode setpoint change per tick at full trigger [in].
    #[serde(default = "default_jog")]
    pub jog_per_tick: f64,

    /// Teleop drive is scaled down above this height [in].
    #[serde(default = "default_drive_reduction_height")]
    pub drive_reduction_height: f64,

    /// Teleop drive multiplier while the elevator is high.
    #[serde(default = "default_drive_speed_reduction")]
    pub drive_speed_reduction: f64,
}

fn default_elevator_loop() -> LoopConfig {
    LoopConfig {
        kp: 0.25,
        ki: 0.0,
        kd: 0.0,
        tolerance: 0.5,
        out_min: -1.0,
        out_max: 1.0,
    }
}
fn default_steps() -> Vec<f64> {
    ELEVATOR_STEPS.to_vec()
}
fn default_true() -> bool {
    true
}
fn default_elevator_reduction() -> f64 {
    ELEVATOR_SPEED_REDUCTION
}
fn default_slow_below() -> ElevatorStep {
    ElevatorStep::ScaleLow
}
fn default_slow_above() -> ElevatorStep {
    ElevatorStep::ScaleHigh
}
fn default_deadband() -> f64 {
    TRIGGER_DEADBAND
}
fn default_rezero_tolerance() -> f64 {
    REZERO_TOLERANCE
}
fn default_jog() -> f64 {
    ELEVATOR_JOG_PER_TICK
}
fn default_drive_reduction_height() -> f64 {
    DRIVE_REDUCTION_HEIGHT
}
fn default_drive_speed_reduction() -> f64 {
    DRIVE_SPEED_REDUCTION
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            control: default_elevator_loop(),
            steps: default_steps(),
            safety_mode: true,
            speed_reduction: ELEVATOR_SPEED_REDUCTION,
            slow_below: default_slow_below(),
            slow_above: default_slow_above(),
            deadband: TRIGGER_DEADBAND,
            rezero_tolerance: REZERO_TOLERANCE,
            jog_per_tick: ELEVATOR_JOG_PER_TICK,
            drive_reduction_height: DRIVE_REDUCTION_HEIGHT,
            drive_speed_reduction: DRIVE_SPEED_REDUCTION,
        }
    }
}

impl ElevatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.control.validate_named("elevator.control")?;
        if self.steps.len() != NUM_ELEVATOR_STEPS {
            return Err(invalid(format!(
                "elevator.steps must have {NUM_ELEVATOR_STEPS} entries, got {}",
                self.steps.len()
            )));
        }
        if self.steps.iter().any(|s| !s.is_finite()) {
            return Err(invalid("elevator.steps must be finite"));
        }
        if let Some(i) = self.steps.windows(2).position(|w| w[0] > w[1]) {
            return Err(invalid(format!(
                "elevator.steps decrease at index {}: {} > {}",
                i + 1,
                self.steps[i],
                self.steps[i + 1]
            )));
        }
        check_fraction("elevator.speed_reduction", self.speed_reduction)?;
        check_fraction("elevator.drive_speed_reduction", self.drive_speed_reduction)?;
        if self.slow_below > self.slow_above {
            return Err(invalid(format!(
                "elevator.slow_below {:?} is above slow_above {:?}",
                self.slow_below, self.slow_above
            )));
        }
        if !(0.0..1.0).contains(&self.deadband) {
            return Err(invalid("elevator.deadband out of range [0, 1)"));
        }
        if self.rezero_tolerance < 0.0 || self.jog_per_tick < 0.0 {
            return Err(invalid("elevator tolerances must be >= 0"));
        }
        Ok(())
    }
}

// ─── Intake ─────────────────────────────────────────────────────────

/// End effector settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Teleop intake/eject speed.
    #[serde(default = "default_intake_speed")]
    pub speed: f64,
    /// Eject duration when placing a cube [ms].
    #[serde(default = "default_eject_ms")]
    pub eject_ms: u64,
}

fn default_intake_speed() -> f64 {
    INTAKE_SPEED
}
fn default_eject_ms() -> u64 {
    EJECT_MS
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            speed: INTAKE_SPEED,
            eject_ms: EJECT_MS,
        }
    }
}

impl IntakeConfig {
    #[inline]
    pub fn eject_duration(&self) -> Duration {
        Duration::from_millis(self.eject_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("intake.speed", self.speed)
    }
}

// ─── Autonomous ─────────────────────────────────────────────────────

/// Operator selectors and field-state wait parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AutoConfig {
    #[serde(default)]
    pub start: StartPosition,
    #[serde(default)]
    pub objective: Objective,
    #[serde(default)]
    pub approach: Approach,
    /// Startup delay before any motion [s].
    #[serde(default)]
    pub delay_s: f64,
    #[serde(default = "default_field_state_timeout_ms")]
    pub field_state_timeout_ms: u64,
    #[serde(default = "default_field_state_poll_ms")]
    pub field_state_poll_ms: u64,
    /// Distance of the baseline fallback drive [in].
    #[serde(default = "default_baseline")]
    pub baseline_distance: f64,
}

fn default_field_state_timeout_ms() -> u64 {
    FIELD_STATE_TIMEOUT_MS
}
fn default_field_state_poll_ms() -> u64 {
    FIELD_STATE_POLL_MS
}
fn default_baseline() -> f64 {
    BASELINE_DISTANCE
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            start: StartPosition::default(),
            objective: Objective::default(),
            approach: Approach::default(),
            delay_s: 0.0,
            field_state_timeout_ms: FIELD_STATE_TIMEOUT_MS,
            field_state_poll_ms: FIELD_STATE_POLL_MS,
            baseline_distance: BASELINE_DISTANCE,
        }
    }
}

impl AutoConfig {
    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_s.max(0.0))
    }

    #[inline]
    pub fn field_state_timeout(&self) -> Duration {
        Duration::from_millis(self.field_state_timeout_ms)
    }

    #[inline]
    pub fn field_state_poll(&self) -> Duration {
        Duration::from_millis(self.field_state_poll_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.delay_s >= 0.0 && self.delay_s <= 15.0) {
            return Err(invalid(format!(
                "auto.delay_s {} out of range [0, 15]",
                self.delay_s
            )));
        }
        if self.field_state_poll_ms == 0 || self.field_state_poll_ms > self.field_state_timeout_ms
        {
            return Err(invalid(format!(
                "auto.field_state_poll_ms {} must be in (0, {}]",
                self.field_state_poll_ms, self.field_state_timeout_ms
            )));
        }
        Ok(())
    }
}

// ─── Simulation ─────────────────────────────────────────────────────

/// Plant parameters for the simulated robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Drive speed at full forward command [in/s].
    #[serde(default = "default_max_drive_speed")]
    pub max_drive_speed: f64,
    /// Yaw rate at full turn command [deg/s].
    #[serde(default = "default_max_turn_rate")]
    pub max_turn_rate: f64,
    /// Elevator speed at full command [in/s].
    #[serde(default = "default_max_elevator_speed")]
    pub max_elevator_speed: f64,
    /// Velocity lag time constant [s].
    #[serde(default = "default_tau")]
    pub tau_s: f64,
    /// Elevator hard stops [in].
    #[serde(default)]
    pub elevator_floor: f64,
    #[serde(default = "default_ceiling")]
    pub elevator_ceiling: f64,
    /// Field-state code the simulated transport delivers, if any.
    #[serde(default = "default_sim_field_state")]
    pub field_state: Option<String>,
    /// Delay before the code becomes available [ms].
    #[serde(default = "default_sim_field_delay")]
    pub field_state_delay_ms: u64,
}

fn default_max_drive_speed() -> f64 {
    100.0
}
fn default_max_turn_rate() -> f64 {
    120.0
}
fn default_max_elevator_speed() -> f64 {
    40.0
}
fn default_tau() -> f64 {
    0.05
}
fn default_ceiling() -> f64 {
    70.0
}
fn default_sim_field_state() -> Option<String> {
    Some("LRL".to_string())
}
fn default_sim_field_delay() -> u64 {
    200
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_drive_speed: default_max_drive_speed(),
            max_turn_rate: default_max_turn_rate(),
            max_elevator_speed: default_max_elevator_speed(),
            tau_s: default_tau(),
            elevator_floor: 0.0,
            elevator_ceiling: default_ceiling(),
            field_state: default_sim_field_state(),
            field_state_delay_ms: default_sim_field_delay(),
        }
    }
}

impl SimConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_drive_speed > 0.0
            && self.max_turn_rate > 0.0
            && self.max_elevator_speed > 0.0)
        {
            return Err(invalid("sim speeds must be > 0"));
        }
        if !(self.tau_s > 0.0) {
            return Err(invalid("sim.tau_s must be > 0"));
        }
        if !(self.elevator_floor < self.elevator_ceiling) {
            return Err(invalid("sim.elevator_floor must be below elevator_ceiling"));
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
