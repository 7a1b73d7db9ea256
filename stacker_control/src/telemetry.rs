//! Published robot values.
//!
//! The core only ever writes through [`Telemetry`]; it never reads back.

use tracing::debug;

/// Named key/value sink.
pub trait Telemetry {
    fn put_number(&self, key: &'static str, value: f64);
    fn put_bool(&self, key: &'static str, value: bool);
}

impl<T: Telemetry + ?Sized> Telemetry for std::sync::Arc<T> {
    fn put_number(&self, key: &'static str, value: f64) {
        (**self).put_number(key, value);
    }

    fn put_bool(&self, key: &'static str, value: bool) {
        (**self).put_bool(key, value);
    }
}

/// Emits every value as a `debug!` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn put_number(&self, key: &'static str, value: f64) {
        debug!(target: "telemetry", key, value);
    }

    fn put_bool(&self, key: &'static str, value: bool) {
        debug!(target: "telemetry", key, value);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {
    fn put_number(&self, _key: &'static str, _value: f64) {}
    fn put_bool(&self, _key: &'static str, _value: bool) {}
}

// ─── Keys ───────────────────────────────────────────────────────────

pub const DISTANCE: &str = "Distance";
pub const ANGLE: &str = "Angle";
pub const ELEVATOR_HEIGHT: &str = "Elevator Height";
pub const ELEVATOR_SETPOINT: &str = "Elevator Setpoint";
pub const ELEVATOR_OUTPUT: &str = "Elevator Output";
pub const LOWERING: &str = "Lowering";
pub const AUTOMATIC: &str = "Automatic";
pub const OVERRIDE: &str = "Override";
pub const TARGET_DISTANCE: &str = "Target Distance";
pub const TARGET_ANGLE: &str = "Target Angle";
