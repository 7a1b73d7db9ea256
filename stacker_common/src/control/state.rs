//! State and selector enums shared by the control core.
//!
//! Operator selectors ([`StartPosition`], [`Objective`], [`Approach`]) are
//! consumed once at the start of autonomous. [`MechanismState`] and
//! [`ElevatorStep`] describe the staged mechanism.

use serde::{Deserialize, Serialize};

// ─── Operator Selectors ─────────────────────────────────────────────

/// Where the robot starts along the alliance wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPosition {
    Left,
    #[default]
    Middle,
    Right,
}

impl StartPosition {
    /// Side of the field this start position is on, `None` for the middle.
    #[inline]
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Left => Some(Side::Left),
            Self::Middle => None,
            Self::Right => Some(Side::Right),
        }
    }

    /// Sign applied to every hard-coded turn so right-side paths mirror left ones.
    #[inline]
    pub const fn turn_sign(self) -> f64 {
        match self {
            Self::Right => -1.0,
            Self::Left | Self::Middle => 1.0,
        }
    }
}

/// Scoring objective picked by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Nearest reachable structure: switch first, then scale.
    #[default]
    Default,
    Switch,
    Scale,
    Baseline,
}

/// How the switch is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Angle shot straight at the switch face.
    #[default]
    Front,
    /// Drive around and place from the switch's side wall.
    Side,
}

/// Left or right half of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Decode one field-state character.
    #[inline]
    pub const fn from_code(c: char) -> Option<Self> {
        match c {
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            _ => None,
        }
    }

    #[inline]
    pub const fn code(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

// ─── Elevator Steps ─────────────────────────────────────────────────

/// Named entries of the elevator step table, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ElevatorStep {
    Ground = 0,
    Switch = 1,
    ScaleLow = 2,
    ScaleHigh = 3,
    Max = 4,
}

impl ElevatorStep {
    /// All steps in ascending table order.
    pub const ALL: [Self; 5] = [
        Self::Ground,
        Self::Switch,
        Self::ScaleLow,
        Self::ScaleHigh,
        Self::Max,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert from a table index. Returns `None` past the last entry.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Ground),
            1 => Some(Self::Switch),
            2 => Some(Self::ScaleLow),
            3 => Some(Self::ScaleHigh),
            4 => Some(Self::Max),
            _ => None,
        }
    }
}

// ─── Mechanism State ────────────────────────────────────────────────

/// Mechanism controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MechanismState {
    /// Loop disabled, output zero.
    #[default]
    Idle = 0,
    /// Operator drives the analog axes directly.
    Manual = 1,
    /// Loop enabled, moving toward a step.
    AutoSeeking = 2,
    /// Loop enabled, holding a settled step.
    AutoHolding = 3,
    /// Loop enabled, returning to GROUND.
    Lowering = 4,
}

impl MechanismState {
    /// True for states where the elevator loop owns the output.
    #[inline]
    pub const fn is_automatic(self) -> bool {
        matches!(self, Self::AutoSeeking | Self::AutoHolding | Self::Lowering)
    }
}

// ─── Control Axes ───────────────────────────────────────────────────

/// Feedback loops owned by the robot context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Straight-line distance (primary while driving).
    Distance,
    /// Keeps heading at zero while driving straight.
    HeadingHold,
    /// Rotate-in-place to a relative angle.
    Turn,
    /// Elevator height.
    Elevator,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Distance => "distance",
            Self::HeadingHold => "heading-hold",
            Self::Turn => "turn",
            Self::Elevator => "elevator",
        };
        f.write_str(name)
    }
}

// ─── Operating Modes ────────────────────────────────────────────────

/// Operating period of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
    Test,
}
