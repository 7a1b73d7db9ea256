//! Robot configuration loading with cross-checks.
//!
//! Parses a single TOML document into [`RobotConfig`], runs its field
//! validation, then builds the elevator step table as a final check.

use std::path::Path;

use stacker_common::prelude::*;
use tracing::{debug, info, warn};

use crate::mechanism::SetpointTable;

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the robot configuration file.
pub fn load_config(path: &Path) -> Result<RobotConfig, ConfigError> {
    let config = RobotConfig::load(path)?;
    info!(path = %path.display(), service = %config.shared.service_name, "config loaded");
    check(config)
}

/// Parse and validate an in-memory TOML document.
pub fn load_config_from_str(content: &str) -> Result<RobotConfig, ConfigError> {
    check(RobotConfig::load_str(content)?)
}

fn check(config: RobotConfig) -> Result<RobotConfig, ConfigError> {
    config.validate()?;
    let table = SetpointTable::new(&config.elevator.steps)?;
    let top = table.height(ElevatorStep::Max);
    if config.elevator.drive_reduction_height >= top {
        warn!(
            threshold = config.elevator.drive_reduction_height,
            top, "drive speed reduction can never engage"
        );
    }
    debug!(
        steps = ?table.heights(),
        period_ms = config.control_period_ms,
        settle_timeout = ?config.settle.timeout(),
        "config validated"
    );
    Ok(config)
}

// ─── Overrides ──────────────────────────────────────────────────────

/// Operator selector overrides, e.g. from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoOverrides {
    pub start: Option<StartPosition>,
    pub objective: Option<Objective>,
    pub approach: Option<Approach>,
    pub delay_s: Option<f64>,
}

impl AutoOverrides {
    /// Apply the set fields to `config` and re-validate it.
    pub fn apply(&self, config: &mut RobotConfig) -> Result<(), ConfigError> {
        let auto = &mut config.auto;
        if let Some(start) = self.start {
            auto.start = start;
        }
        if let Some(objective) = self.objective {
            auto.objective = objective;
        }
        if let Some(approach) = self.approach {
            auto.approach = approach;
        }
        if let Some(delay_s) = self.delay_s {
            auto.delay_s = delay_s;
        }
        config.validate()
    }
}
