//! System-wide constants for the stacker workspace.
//!
//! Single source of truth for defaults and numeric limits. Config fields fall
//! back to these values when omitted from TOML.

use static_assertions::const_assert;

// ─── Timing ─────────────────────────────────────────────────────────

/// Control tick period in milliseconds (100 Hz).
pub const CONTROL_PERIOD_MS: u64 = 10;

/// Settling velocity sample interval in milliseconds.
pub const SETTLE_SAMPLE_MS: u64 = 10;

/// Velocity magnitude below which a loop counts as stationary [units/s].
pub const SETTLE_VELOCITY_THRESHOLD: f64 = 0.1;

/// Upper bound on one settling wait [ms]. Zero disables the bound.
pub const SETTLE_TIMEOUT_MS: u64 = 10_000;

/// Field-state poll interval in milliseconds.
pub const FIELD_STATE_POLL_MS: u64 = 50;

/// Give up waiting for field-state data after this long [ms].
pub const FIELD_STATE_TIMEOUT_MS: u64 = 2_500;

// ─── Drive ──────────────────────────────────────────────────────────

/// Distance driven by the baseline fallback routine [in].
pub const BASELINE_DISTANCE: f64 = 85.0;

/// Default open-loop speed for timed drives.
pub const DRIVE_FOR_SPEED: f64 = 0.5;

// ─── Elevator ───────────────────────────────────────────────────────

/// Number of entries in the elevator step table.
pub const NUM_ELEVATOR_STEPS: usize = 5;

/// Default step heights [in]: GROUND, SWITCH, SCALE_LOW, SCALE_HIGH, MAX.
pub const ELEVATOR_STEPS: [f64; NUM_ELEVATOR_STEPS] = [1.0, 22.0, 50.0, 62.0, 68.0];

/// Output multiplier applied while approaching a mechanical stop.
pub const ELEVATOR_SPEED_REDUCTION: f64 = 0.5;

/// Trigger deadband for the manual raise/lower axes.
pub const TRIGGER_DEADBAND: f64 = 0.1;

/// Above this height, teleop drive commands are scaled down [in].
pub const DRIVE_REDUCTION_HEIGHT: f64 = 12.5;

/// Teleop drive multiplier while the elevator is high.
pub const DRIVE_SPEED_REDUCTION: f64 = 0.5;

/// Setpoint change per tick at full trigger in jog mode [in].
pub const ELEVATOR_JOG_PER_TICK: f64 = 0.5;

/// Readings below `-REZERO_TOLERANCE` count as past the expected zero [in].
pub const REZERO_TOLERANCE: f64 = 0.25;

// ─── Intake ─────────────────────────────────────────────────────────

/// Effector speed for teleop intake/eject.
pub const INTAKE_SPEED: f64 = 0.8;

/// Duration the effector runs outward when placing a cube [ms].
pub const EJECT_MS: u64 = 400;

// ─── Autonomous ─────────────────────────────────────────────────────

/// Capacity of a single autonomous path plan.
pub const MAX_PATH_ACTIONS: usize = 16;

/// Capacity of the field-state code buffer.
pub const FIELD_STATE_CAPACITY: usize = 8;

const_assert!(CONTROL_PERIOD_MS > 0);
const_assert!(FIELD_STATE_POLL_MS <= FIELD_STATE_TIMEOUT_MS);
const_assert!(NUM_ELEVATOR_STEPS == 5);
// The longest built-in path (opposite scale) has 11 actions.
const_assert!(MAX_PATH_ACTIONS >= 11);
