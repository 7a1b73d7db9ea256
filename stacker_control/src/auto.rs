//! Autonomous routines: path planning and the sequencer that runs them.

pub mod path;
pub mod sequencer;

pub use path::{Action, PathKind, PathPlan, Selection};
pub use sequencer::{AutoError, AutoReport, AutonomousSequencer};
