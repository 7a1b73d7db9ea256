//! # Stacker Control
//!
//! Control core of a cube-stacking robot: closed-loop drive and turn
//! primitives, a stepped elevator with travel capping and an operator
//! override, and an autonomous sequencer that picks a path from the
//! field-state code and the operator selectors.
//!
//! ## Timing Model
//!
//! Every loop is stepped by one fixed-period control tick
//! ([`robot::RobotContext::tick`]). Blocking operations such as settling
//! waits are [`scheduler::Wait`] values the context ticks through, so a
//! simulated clock runs a whole routine deterministically and a wall clock
//! runs it in real time.
//!
//! ## Modules
//!
//! - [`control`] - PID, feedback loops, the drive output link, settling
//! - [`mechanism`] - Elevator step table, capping, state machine
//! - [`motion`] - Drive base and blocking motion primitives
//! - [`auto`] - Path planning and the autonomous sequencer
//! - [`teleop`] - Operator and test periods
//! - [`hal`] - Hardware boundary and the simulated robot
//! - [`scheduler`] - Clocks, waits and the mode flag
//! - [`robot`] - The context that owns all of the above

pub mod auto;
pub mod config;
pub mod control;
pub mod hal;
pub mod mechanism;
pub mod motion;
pub mod robot;
pub mod scheduler;
pub mod teleop;
pub mod telemetry;
