//! PID step with backward Euler integration and conditional integration
//! anti-windup.
//!
//! Zero Ki disables integral; zero Kd disables derivative. The derivative
//! term is suppressed on the first sample after a reset so a fresh setpoint
//! does not produce a kick.

/// Internal state of the PID controller.
///
/// Must be reset (via [`PidState::reset`]) whenever the loop is disabled or
/// given a new setpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidState {
    /// Integral accumulator (already multiplied by Ki).
    integral: f64,
    /// Previous error (for derivative).
    prev_error: f64,
    /// False until the first sample after a reset.
    primed: bool,
}

impl PidState {
    /// Reset all internal state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current integral contribution.
    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }
}

/// PID gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    /// Integral gain (0 = disabled).
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    pub kd: f64,
}

/// Compute one PID step.
///
/// # Arguments
/// - `state`: mutable PID internal state.
/// - `gains`: gains for this loop.
/// - `error`: setpoint − measured.
/// - `dt`: tick period [s].
/// - `limits`: output range; the integral only grows while its own
///   contribution stays inside it.
///
/// # Returns
/// Raw PID output (clamping is done by the caller).
#[inline]
pub fn pid_compute(
    state: &mut PidState,
    gains: &PidGains,
    error: f64,
    dt: f64,
    limits: (f64, f64),
) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }

    // ── P term ──────────────────────────────────────────────
    let p_term = gains.kp * error;

    // ── I term (backward Euler, conditional integration) ────
    let i_term = if gains.ki != 0.0 {
        let candidate = state.integral + gains.ki * error * dt;
        if candidate >= limits.0 && candidate <= limits.1 {
            state.integral = candidate;
        }
        state.integral
    } else {
        state.integral = 0.0;
        0.0
    };

    // ── D term ──────────────────────────────────────────────
    let d_term = if gains.kd != 0.0 && state.primed {
        gains.kd * (error - state.prev_error) / dt
    } else {
        0.0
    };

    state.prev_error = error;
    state.primed = true;

    p_term + i_term + d_term
}

// ─── Tests ──────────────────────────────────────────────────────────
