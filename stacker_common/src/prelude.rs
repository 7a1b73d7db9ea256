//! Prelude module for common re-exports.
//!
//! ```rust
//! use stacker_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};
pub use crate::control::config::{
    AutoConfig, DriveConfig, ElevatorConfig, IntakeConfig, LoopConfig, RobotConfig,
    SettleConfig, SimConfig,
};

// ─── State & Errors ─────────────────────────────────────────────────
pub use crate::control::error::{MechanismFlags, MotionError};
pub use crate::control::field::{FieldCode, FieldState, FieldStateError};
pub use crate::control::state::{
    Approach, Axis, ElevatorStep, MechanismState, Mode, Objective, Side, StartPosition,
};
