//! Types shared by the control core and its runners.

pub mod config;
pub mod error;
pub mod field;
pub mod state;
