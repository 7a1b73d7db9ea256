//! Autonomous path planning.
//!
//! Planning is pure: selectors and field state in, an action list out.
//! Distances are inches, angles degrees with clockwise positive. Side
//! paths are written for a left start and mirrored by the start
//! position's turn sign.

use heapless::Vec;
use stacker_common::consts::MAX_PATH_ACTIONS;
use stacker_common::prelude::*;

/// One step of an autonomous routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Drive(f64),
    Turn(f64),
    DropCube { distance: f64, step: ElevatorStep },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drive(d) => write!(f, "drive {d}"),
            Self::Turn(a) => write!(f, "turn {a}"),
            Self::DropCube { distance, step } => write!(f, "drop cube {distance} at {step:?}"),
        }
    }
}

/// Which routine was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Baseline,
    /// Side start, nearest of switch then scale.
    SidePath,
    NearSwitch,
    OppositeSwitch,
    NearScale,
    OppositeScale,
    MiddlePath,
}

pub type Actions = Vec<Action, MAX_PATH_ACTIONS>;

/// A planned routine.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    pub kind: PathKind,
    pub actions: Actions,
}

/// Operator selectors read at the start of autonomous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub start: StartPosition,
    pub objective: Objective,
    pub approach: Approach,
}

impl From<&AutoConfig> for Selection {
    fn from(config: &AutoConfig) -> Self {
        Self {
            start: config.start,
            objective: config.objective,
            approach: config.approach,
        }
    }
}

// ─── Path Constants ─────────────────────────────────────────────────

/// Start line to the switch's side wall.
const TO_SWITCH: f64 = 148.0;
/// Switch side wall to the scale's side.
const SWITCH_TO_SCALE: f64 = 100.0;
/// Start line to the alley between switch and scale.
const TO_ALLEY: f64 = 211.0;
/// Across the field along the alley.
const ACROSS_ALLEY: f64 = 200.0;
/// Clear the wall before turning off a middle or front start.
const CLEAR_WALL: f64 = 42.5;
const SCALE_JOG: f64 = 14.0;
const SCALE_APPROACH: f64 = 56.0;
const SIDE_PLACE: f64 = 5.0;
const FRONT_PLACE: f64 = 59.0;
const MIDDLE_FRONT_PLACE: f64 = 78.0;

// ─── Dispatch ───────────────────────────────────────────────────────

/// Pick and plan the routine for `selection` under `field`.
pub fn plan(selection: &Selection, field: &FieldState, baseline_distance: f64) -> PathPlan {
    let Some(side) = selection.start.side() else {
        return middle_path(selection.approach, field.scale);
    };
    let a = 90.0 * selection.start.turn_sign();
    match selection.objective {
        Objective::Default => side_path(a, side, field),
        Objective::Switch if field.switch == side => near_switch(a),
        Objective::Switch => opposite_switch(a, selection.approach),
        Objective::Scale if field.scale == side => near_scale(a),
        Objective::Scale => opposite_scale(a),
        Objective::Baseline => baseline(baseline_distance),
    }
}

/// Drive across the baseline.
pub fn baseline(distance: f64) -> PathPlan {
    build(PathKind::Baseline, &[Action::Drive(distance)])
}

/// Side start: switch if ours, else on to the scale if ours, else stop.
pub fn side_path(a: f64, side: Side, field: &FieldState) -> PathPlan {
    if field.switch == side {
        return build(
            PathKind::SidePath,
            &[
                Action::Drive(TO_SWITCH),
                Action::Turn(a),
                place(SIDE_PLACE, ElevatorStep::Switch),
            ],
        );
    }
    if field.scale == side {
        return build(
            PathKind::SidePath,
            &[
                Action::Drive(TO_SWITCH),
                Action::Drive(SWITCH_TO_SCALE),
                Action::Turn(-a),
                Action::Drive(SCALE_JOG),
                Action::Turn(a),
                Action::Drive(SCALE_APPROACH),
                Action::Turn(a),
                place(SIDE_PLACE, ElevatorStep::ScaleHigh),
            ],
        );
    }
    build(
        PathKind::SidePath,
        &[Action::Drive(TO_SWITCH), Action::Drive(SWITCH_TO_SCALE)],
    )
}

pub fn near_switch(a: f64) -> PathPlan {
    build(
        PathKind::NearSwitch,
        &[
            Action::Drive(TO_SWITCH),
            Action::Turn(a),
            place(SIDE_PLACE, ElevatorStep::Switch),
        ],
    )
}

/// Cross to the far side of the switch.
pub fn opposite_switch(a: f64, approach: Approach) -> PathPlan {
    match approach {
        Approach::Front => build(
            PathKind::OppositeSwitch,
            &[
                Action::Drive(CLEAR_WALL),
                Action::Turn(a),
                Action::Drive(155.0),
                Action::Turn(-a),
                Action::Turn(a),
                place(FRONT_PLACE, ElevatorStep::Switch),
            ],
        ),
        Approach::Side => build(
            PathKind::OppositeSwitch,
            &[
                Action::Drive(TO_ALLEY),
                Action::Turn(a),
                Action::Drive(ACROSS_ALLEY),
                Action::Turn(a),
                Action::Drive(62.5),
                Action::Turn(a),
                place(SIDE_PLACE, ElevatorStep::Switch),
            ],
        ),
    }
}

pub fn near_scale(a: f64) -> PathPlan {
    build(
        PathKind::NearScale,
        &[
            Action::Drive(TO_SWITCH),
            Action::Drive(SWITCH_TO_SCALE),
            Action::Turn(-a),
            Action::Drive(SCALE_JOG),
            Action::Turn(a),
            Action::Drive(SCALE_APPROACH),
            Action::Turn(a),
            place(SIDE_PLACE, ElevatorStep::ScaleHigh),
        ],
    )
}

/// Cross the alley to the far scale plate.
pub fn opposite_scale(a: f64) -> PathPlan {
    build(
        PathKind::OppositeScale,
        &[
            Action::Drive(TO_ALLEY),
            Action::Turn(a),
            Action::Drive(ACROSS_ALLEY),
            Action::Turn(-a),
            Action::Drive(37.5),
            Action::Turn(a),
            Action::Drive(SCALE_JOG),
            Action::Turn(-a),
            Action::Drive(SCALE_APPROACH),
            Action::Turn(a),
            place(SIDE_PLACE, ElevatorStep::ScaleHigh),
        ],
    )
}

/// Middle start toward the side named by the second field-state character.
pub fn middle_path(approach: Approach, side: Side) -> PathPlan {
    let kind = PathKind::MiddlePath;
    let head = Action::Drive(CLEAR_WALL);
    match (approach, side) {
        (Approach::Front, Side::Left) => build(
            kind,
            &[
                head,
                Action::Turn(-90.0),
                Action::Drive(80.0),
                Action::Turn(90.0),
                place(MIDDLE_FRONT_PLACE, ElevatorStep::Switch),
            ],
        ),
        (Approach::Front, Side::Right) => build(
            kind,
            &[
                head,
                Action::Turn(90.0),
                Action::Drive(29.0),
                Action::Turn(-90.0),
                place(MIDDLE_FRONT_PLACE, ElevatorStep::Switch),
            ],
        ),
        (Approach::Side, Side::Left) => build(
            kind,
            &[
                head,
                Action::Turn(-90.0),
                Action::Drive(126.0),
                Action::Turn(90.0),
                Action::Drive(106.0),
                Action::Turn(90.0),
                place(SIDE_PLACE, ElevatorStep::Switch),
            ],
        ),
        (Approach::Side, Side::Right) => build(
            kind,
            &[
                head,
                Action::Turn(90.0),
                Action::Drive(74.0),
                Action::Turn(-90.0),
                Action::Drive(106.0),
                Action::Turn(90.0),
                place(SIDE_PLACE, ElevatorStep::Switch),
            ],
        ),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

#[inline]
const fn place(distance: f64, step: ElevatorStep) -> Action {
    Action::DropCube { distance, step }
}

fn build(kind: PathKind, actions: &[Action]) -> PathPlan {
    debug_assert!(actions.len() <= MAX_PATH_ACTIONS);
    let list = actions.iter().copied().take(MAX_PATH_ACTIONS).collect();
    PathPlan {
        kind,
        actions: list,
    }
}
