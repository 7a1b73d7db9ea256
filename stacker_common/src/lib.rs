//! Stacker Common Library
//!
//! Shared constants, configuration loading and state types for the stacker
//! robot workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Defaults and numeric limits
//! - [`config`] - Configuration loading traits and types
//! - [`control`] - Control-core config, state enums, errors and field state
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod control;
pub mod prelude;
