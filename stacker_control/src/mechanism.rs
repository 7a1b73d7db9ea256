//! Staged elevator: step table, stop protection and the mechanism state
//! machine.

pub mod capping;
pub mod controller;
pub mod table;

pub use capping::StopGuard;
pub use controller::{MechanismController, MechanismEvent, MechanismInput, TransitionResult};
pub use table::SetpointTable;
