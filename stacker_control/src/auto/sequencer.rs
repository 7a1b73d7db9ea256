//! Autonomous sequencer.
//!
//! Waits for field-state data, applies the startup delay, plans a path
//! from the operator selectors and runs it action by action. Missing or
//! malformed field data falls back to the baseline drive.

use std::time::Duration;

use stacker_common::prelude::*;
use thiserror::Error;
use tracing::{error, info, warn};

use super::path::{self, Action, PathKind, PathPlan, Selection};
use crate::hal::RobotIo;
use crate::robot::RobotContext;
use crate::scheduler::{Clock, Wait, WaitOutcome};

/// An autonomous routine stopped early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutoError {
    /// The mode ended before any motion started.
    #[error("{stage} interrupted: operating mode ended")]
    Interrupted { stage: &'static str },

    /// A motion primitive failed.
    #[error("{path:?} action {index} ({action}) failed: {source}")]
    Action {
        path: PathKind,
        index: usize,
        action: Action,
        #[source]
        source: MotionError,
    },
}

impl AutoError {
    /// True when the routine ended because the mode did.
    pub fn is_abandoned(&self) -> bool {
        match self {
            Self::Interrupted { .. } => true,
            Self::Action { source, .. } => source.is_abandoned(),
        }
    }
}

/// What a completed routine did.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoReport {
    /// Decoded field state, `None` when the fallback ran.
    pub field_state: Option<FieldState>,
    /// Time spent waiting for field-state data.
    pub field_wait: Duration,
    pub plan: PathPlan,
    /// Number of actions run.
    pub completed: usize,
}

impl AutoReport {
    #[inline]
    pub fn fell_back(&self) -> bool {
        self.field_state.is_none()
    }
}

/// Selector-driven autonomous routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutonomousSequencer {
    selection: Selection,
    delay: Duration,
    field_poll: Duration,
    field_timeout: Duration,
    baseline_distance: f64,
}

impl AutonomousSequencer {
    pub fn new(config: &AutoConfig) -> Self {
        Self {
            selection: Selection::from(config),
            delay: config.delay(),
            field_poll: config.field_state_poll(),
            field_timeout: config.field_state_timeout(),
            baseline_distance: config.baseline_distance,
        }
    }

    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Run the whole routine on `robot`.
    pub fn run<Io: RobotIo, C: Clock>(
        &self,
        robot: &mut RobotContext<Io, C>,
    ) -> Result<AutoReport, AutoError> {
        info!(
            start = ?self.selection.start,
            objective = ?self.selection.objective,
            approach = ?self.selection.approach,
            delay = ?self.delay,
            "autonomous start"
        );

        let (field_state, field_wait) = self.wait_for_field(robot)?;

        if !self.delay.is_zero() {
            info!(delay = ?self.delay, "startup delay");
            let outcome = robot.wait(&Wait::elapsed(self.delay, robot.period()));
            if outcome == WaitOutcome::Abandoned {
                robot.stop_all();
                return Err(AutoError::Interrupted {
                    stage: "startup delay",
                });
            }
        }

        let plan = match &field_state {
            Some(fs) => path::plan(&self.selection, fs, self.baseline_distance),
            None => path::baseline(self.baseline_distance),
        };
        info!(path = ?plan.kind, actions = plan.actions.len(), "path selected");

        let completed = execute(robot, &plan)?;
        info!(path = ?plan.kind, at = ?robot.now(), "autonomous complete");

        Ok(AutoReport {
            field_state,
            field_wait,
            plan,
            completed,
        })
    }

    fn wait_for_field<Io: RobotIo, C: Clock>(
        &self,
        robot: &mut RobotContext<Io, C>,
    ) -> Result<(Option<FieldState>, Duration), AutoError> {
        let started = robot.now();
        let outcome = robot.wait(&Wait::field_state(self.field_poll, self.field_timeout));
        let waited = robot.now().saturating_sub(started);

        let field_state = match outcome {
            WaitOutcome::Satisfied => {
                let code = robot.take_field_code().unwrap_or_default();
                match FieldState::parse(&code) {
                    Ok(fs) => {
                        info!(field = %fs, ?waited, "field state");
                        Some(fs)
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed field state, driving to baseline");
                        None
                    }
                }
            }
            WaitOutcome::TimedOut => {
                warn!(?waited, "no field state, driving to baseline");
                None
            }
            WaitOutcome::Abandoned => {
                robot.stop_all();
                return Err(AutoError::Interrupted {
                    stage: "field-state wait",
                });
            }
        };
        Ok((field_state, waited))
    }
}

/// Run `plan` in order, stopping at the first failure.
///
/// Returns the number of actions completed.
pub fn execute<Io: RobotIo, C: Clock>(
    robot: &mut RobotContext<Io, C>,
    plan: &PathPlan,
) -> Result<usize, AutoError> {
    for (index, action) in plan.actions.iter().enumerate() {
        let result = match *action {
            Action::Drive(distance) => robot.drive_distance(distance),
            Action::Turn(angle) => robot.turn_angle(angle),
            Action::DropCube { distance, step } => robot.drop_cube(distance, step),
        };
        if let Err(source) = result {
            if !source.is_abandoned() {
                error!(path = ?plan.kind, index, %action, error = %source, "abandoning routine");
            }
            return Err(AutoError::Action {
                path: plan.kind,
                index,
                action: *action,
                source,
            });
        }
    }
    Ok(plan.actions.len())
}
