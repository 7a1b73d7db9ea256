//! Staged elevator state machine.
//!
//! Idle → Manual (analog input) → Idle
//! Idle/Manual → AutoSeeking (advance) → AutoHolding (settled)
//! AutoSeeking/AutoHolding → AutoSeeking (advance, next step)
//! any → Lowering (lower-to-bottom) → AutoHolding (settled at GROUND)
//! Lowering → Idle (advance cancels)
//! any → Idle (stop: manual release, re-zero)

use std::time::Duration;

use stacker_common::prelude::*;
use tracing::debug;

use super::capping::StopGuard;
use super::table::SetpointTable;
use crate::control::{FeedbackLoop, SettleCriteria, SettleTracker, Sink, Source};

/// Result of a mechanism transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new state.
    Ok(MechanismState),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

/// Discrete mechanism event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MechanismEvent {
    /// Step-advance input (rising edge).
    Advance,
    /// Lower-to-bottom input (rising edge).
    LowerToBottom,
    /// The elevator loop settled.
    Settled,
    /// Disable the loop and go idle.
    Stop,
}

/// Operator input for one teleop period, already decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MechanismInput {
    /// Raise axis, 0..1.
    pub raise: f64,
    /// Lower axis, 0..1.
    pub lower: f64,
    /// Rising edge of the step-advance button.
    pub advance: bool,
    /// Rising edge of the lower-to-bottom button.
    pub lower_to_bottom: bool,
    /// Override button held.
    pub override_held: bool,
    /// Explicit re-zero request.
    pub rezero: bool,
}

/// Elevator controller: step table, loop, capping and state.
#[derive(Debug, Clone)]
pub struct MechanismController {
    table: SetpointTable,
    guard: StopGuard,
    pid: FeedbackLoop,
    settle: SettleTracker,

    state: MechanismState,
    flags: MechanismFlags,
    target: usize,
    /// Raw manual differential, capped each tick.
    manual: f64,
    jogging: bool,
    output: f64,

    deadband: f64,
    rezero_tolerance: f64,
    jog_per_tick: f64,
}

impl MechanismController {
    pub fn new(config: &ElevatorConfig, settle: SettleCriteria) -> Result<Self, ConfigError> {
        let table = SetpointTable::new(&config.steps)?;
        let guard = StopGuard::new(&table, config);
        let mut ctrl = Self {
            table,
            guard,
            pid: FeedbackLoop::new(
                Axis::Elevator,
                Source::ElevatorHeight,
                Sink::Elevator,
                &config.control,
            ),
            settle: SettleTracker::new(settle),
            state: MechanismState::Idle,
            flags: MechanismFlags::empty(),
            target: 0,
            manual: 0.0,
            jogging: false,
            output: 0.0,
            deadband: config.deadband,
            rezero_tolerance: config.rezero_tolerance,
            jog_per_tick: config.jog_per_tick,
        };
        ctrl.reset();
        Ok(ctrl)
    }

    /// Back to Idle with the loop disabled. Called on every mode change.
    pub fn reset(&mut self) {
        self.pid.disable();
        self.settle.reset();
        self.state = MechanismState::Idle;
        self.flags = MechanismFlags::empty();
        self.flags.set(MechanismFlags::SAFETY_MODE, self.guard.safety_mode());
        self.target = 0;
        self.manual = 0.0;
        self.jogging = false;
        self.output = 0.0;
    }

    // ─── Events ─────────────────────────────────────────────────────

    /// Attempt a transition given an event and the current height.
    pub fn handle_event(&mut self, event: MechanismEvent, height: f64) -> TransitionResult {
        use MechanismEvent::*;
        use MechanismState::*;

        if self.flags.contains(MechanismFlags::OVERRIDE) && matches!(event, Advance | LowerToBottom)
        {
            return TransitionResult::Rejected("override held");
        }

        match (self.state, event) {
            (_, Stop) | (Lowering, Advance) => {
                self.stop();
            }
            (state, Advance) => {
                // A jogged setpoint is off the table; step from the measured height
                self.target = if state.is_automatic() && !self.jogging {
                    (self.target + 1).min(self.table.last_index())
                } else {
                    self.table.next_step_above(height)
                };
                self.start_seek(AutoSeeking);
            }
            (_, LowerToBottom) => {
                self.target = ElevatorStep::Ground.index();
                self.start_seek(Lowering);
            }
            (AutoSeeking | Lowering, Settled) => {
                self.state = AutoHolding;
                self.sync_flags();
            }
            (_, Settled) => return TransitionResult::Rejected("not seeking"),
        }

        debug!(?event, state = ?self.state, target = self.target, "elevator transition");
        TransitionResult::Ok(self.state)
    }

    /// Apply one teleop period of operator input.
    ///
    /// Returns true when the elevator encoder should be re-zeroed.
    pub fn update(&mut self, input: &MechanismInput, height: f64) -> bool {
        if input.rezero {
            let _ = self.handle_event(MechanismEvent::Stop, height);
            return true;
        }

        let was_override = self.flags.contains(MechanismFlags::OVERRIDE);
        self.flags.set(MechanismFlags::OVERRIDE, input.override_held);
        let rezero = was_override && !input.override_held && height < -self.rezero_tolerance;

        let raise = self.apply_deadband(input.raise);
        let lower = self.apply_deadband(input.lower);
        if raise != 0.0 || lower != 0.0 {
            self.enter_manual(raise.abs() - lower.abs());
            return rezero;
        }
        if self.state == MechanismState::Manual {
            let _ = self.handle_event(MechanismEvent::Stop, height);
        }

        if input.advance {
            let _ = self.handle_event(MechanismEvent::Advance, height);
        }
        if input.lower_to_bottom {
            let _ = self.handle_event(MechanismEvent::LowerToBottom, height);
        }
        rezero
    }

    /// Nudge the setpoint with the analog axes.
    ///
    /// The first nudge starts from the measured height, later ones from the
    /// previous setpoint. The result is bounded by the step table.
    pub fn jog(&mut self, raise: f64, lower: f64, height: f64) {
        let raise = self.apply_deadband(raise);
        let lower = self.apply_deadband(lower);
        if raise == 0.0 && lower == 0.0 {
            return;
        }
        let nudge = self.guard.cap(raise.abs() - lower.abs(), height);
        let base = if self.jogging {
            self.pid.setpoint()
        } else {
            height
        };
        let setpoint = self.table.clamp(base + self.jog_per_tick * nudge);

        self.jogging = true;
        self.pid.set_setpoint(setpoint);
        self.pid.enable();
        self.settle.reset();
        self.state = MechanismState::AutoSeeking;
        self.sync_flags();
    }

    /// Drive to `step` under loop control.
    pub fn seek(&mut self, step: ElevatorStep) {
        self.target = step.index();
        self.start_seek(MechanismState::AutoSeeking);
    }

    /// Disable the loop after a blocking settle completed.
    pub fn release(&mut self) {
        self.stop();
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// Compute the elevator output for one control tick.
    pub fn tick(&mut self, height: f64, dt: Duration) -> f64 {
        let dt_s = dt.as_secs_f64();
        let raw = match self.state {
            MechanismState::Idle => self.pid.step(height, dt_s),
            MechanismState::Manual => self.manual,
            MechanismState::AutoSeeking | MechanismState::Lowering => {
                let out = self.pid.step(height, dt_s);
                let on_target = self.pid.on_target(height);
                if self.settle.observe(height, on_target, dt) {
                    let _ = self.handle_event(MechanismEvent::Settled, height);
                }
                out
            }
            MechanismState::AutoHolding => self.pid.step(height, dt_s),
        };

        self.output = if self.flags.contains(MechanismFlags::OVERRIDE) {
            raw
        } else {
            self.guard.cap(raw, height)
        };
        self.output
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> MechanismState {
        self.state
    }

    #[inline]
    pub fn flags(&self) -> MechanismFlags {
        self.flags
    }

    /// Current target step index.
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.pid.setpoint()
    }

    /// Output of the last tick.
    #[inline]
    pub fn output(&self) -> f64 {
        self.output
    }

    #[inline]
    pub fn table(&self) -> &SetpointTable {
        &self.table
    }

    #[inline]
    pub fn guard(&self) -> &StopGuard {
        &self.guard
    }

    #[inline]
    pub fn pid(&self) -> &FeedbackLoop {
        &self.pid
    }

    // ─── Internals ──────────────────────────────────────────────────

    #[inline]
    fn apply_deadband(&self, value: f64) -> f64 {
        if value.abs() < self.deadband { 0.0 } else { value }
    }

    fn start_seek(&mut self, state: MechanismState) {
        self.pid.set_setpoint(self.table.height_at(self.target));
        self.pid.enable();
        self.settle.reset();
        self.jogging = false;
        self.state = state;
        self.sync_flags();
    }

    fn enter_manual(&mut self, differential: f64) {
        if self.state != MechanismState::Manual {
            self.pid.disable();
            self.jogging = false;
            self.state = MechanismState::Manual;
            self.sync_flags();
        }
        self.manual = differential;
    }

    fn stop(&mut self) {
        self.pid.disable();
        self.settle.reset();
        self.manual = 0.0;
        self.jogging = false;
        self.state = MechanismState::Idle;
        self.sync_flags();
    }

    fn sync_flags(&mut self) {
        self.flags
            .set(MechanismFlags::AUTO, self.state.is_automatic());
        self.flags
            .set(MechanismFlags::LOWERING, self.state == MechanismState::Lowering);
    }
}
