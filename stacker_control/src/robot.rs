//! Robot context: owns every loop, the mechanism, the I/O and the clock.
//!
//! One context lives for the whole program. Operating-mode changes go
//! through [`RobotContext::enter_mode`], which stops whatever the previous
//! mode left running.
//!
//! ## Control Tick
//!
//! 1. Sample sensors into a [`SensorFrame`]
//! 2. Step the drive loops and combine them through the link
//! 3. Step the mechanism (loop or manual output, capped)
//! 4. Write actuators
//! 5. Let the plant and the clock advance by one period

use std::time::Duration;

use stacker_common::prelude::*;
use tracing::{info, trace};

use crate::control::{FeedbackLoop, SettleCriteria};
use crate::hal::{RobotIo, SensorFrame, SimRobot};
use crate::mechanism::MechanismController;
use crate::motion::DriveBase;
use crate::scheduler::{Clock, ModeFlag, SimClock, Wait, WaitCondition, WaitOutcome};
use crate::telemetry::{self, NullTelemetry, Telemetry};

/// Context type used by the simulator and the tests.
pub type SimContext = RobotContext<SimRobot, SimClock>;

/// The robot's control state and its connection to the hardware.
pub struct RobotContext<Io: RobotIo, C: Clock> {
    pub(crate) config: RobotConfig,
    pub(crate) io: Io,
    pub(crate) clock: C,
    pub(crate) period: Duration,
    pub(crate) criteria: SettleCriteria,
    pub(crate) drive: DriveBase,
    pub(crate) mechanism: MechanismController,
    /// Effector command, written every tick.
    pub(crate) intake: f64,
    pub(crate) telemetry: Box<dyn Telemetry>,
    mode: Mode,
    active: ModeFlag,
    field_code: Option<FieldCode>,
}

impl SimContext {
    /// Simulated robot built from the `[sim]` section.
    pub fn simulated(config: RobotConfig) -> Result<Self, ConfigError> {
        let io = SimRobot::new(config.sim.clone());
        Self::new(config, io, SimClock::new())
    }
}

impl<Io: RobotIo, C: Clock> RobotContext<Io, C> {
    /// Validate `config` and build a disabled context.
    pub fn new(config: RobotConfig, io: Io, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let criteria = SettleCriteria::from(&config.settle);
        let mechanism = MechanismController::new(&config.elevator, criteria)?;
        Ok(Self {
            period: config.control_period(),
            criteria,
            drive: DriveBase::new(&config.drive),
            mechanism,
            intake: 0.0,
            telemetry: Box::new(NullTelemetry),
            mode: Mode::Disabled,
            active: ModeFlag::new(false),
            field_code: None,
            config,
            io,
            clock,
        })
    }

    /// Replace the telemetry sink.
    pub fn with_telemetry(mut self, telemetry: Box<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    // ─── Modes ──────────────────────────────────────────────────────

    /// Stop everything and switch to `mode`.
    ///
    /// Pending waits of the previous mode were already abandoned through
    /// the mode flag; here loops are disabled, actuators zeroed and the
    /// mechanism state machine reset.
    pub fn enter_mode(&mut self, mode: Mode) {
        self.stop_all();
        self.mechanism.reset();
        self.field_code = None;
        self.mode = mode;
        self.active.set(mode != Mode::Disabled);
        info!(?mode, at = ?self.clock.now(), "entering mode");
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Handle that ends the current mode when cleared.
    pub fn mode_flag(&self) -> ModeFlag {
        self.active.clone()
    }

    /// Disable all loops and zero all actuators.
    pub fn stop_all(&mut self) {
        self.drive.stop();
        self.mechanism.release();
        self.intake = 0.0;
        self.io.arcade_drive(0.0, 0.0);
        self.io.set_elevator(0.0);
        self.io.set_intake(0.0);
    }

    // ─── Ticking ────────────────────────────────────────────────────

    /// Run one control tick of length `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let frame = SensorFrame::sample(&self.io);
        let dt_s = dt.as_secs_f64();

        let drive = self.drive.step(&frame, dt_s);
        let elevator = self.mechanism.tick(frame.elevator_height, dt);

        self.io.arcade_drive(drive.forward, drive.turn);
        self.io.set_elevator(elevator);
        self.io.set_intake(self.intake);

        self.io.advance(dt);
        self.clock.sleep(dt);
    }

    /// Keep ticking for `duration`. The last tick is shortened if needed.
    pub fn advance(&mut self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() {
            let dt = remaining.min(self.period);
            self.tick(dt);
            remaining -= dt;
        }
    }

    /// Tick until `wait` is satisfied, times out or the mode ends.
    pub fn wait(&mut self, wait: &Wait) -> WaitOutcome {
        let poll = if wait.poll.is_zero() {
            self.period
        } else {
            wait.poll
        };
        let start = self.clock.now();

        loop {
            if !self.active.is_active() {
                return WaitOutcome::Abandoned;
            }
            let elapsed = self.clock.now().saturating_sub(start);

            let before = match wait.condition {
                WaitCondition::Elapsed(duration) => {
                    if elapsed >= duration {
                        return WaitOutcome::Satisfied;
                    }
                    None
                }
                WaitCondition::FieldState => {
                    if let Some(code) = self.io.field_state() {
                        trace!(code = code.as_str(), ?elapsed, "field state received");
                        self.field_code = Some(code);
                        return WaitOutcome::Satisfied;
                    }
                    None
                }
                WaitCondition::Settled(axis) => Some(self.measure(axis)),
            };

            if wait.timeout.is_some_and(|t| elapsed >= t) {
                return WaitOutcome::TimedOut;
            }

            let step = match wait.condition {
                WaitCondition::Elapsed(duration) => poll.min(duration - elapsed),
                _ => poll,
            };
            self.advance(step);

            if let (WaitCondition::Settled(axis), Some(before)) = (wait.condition, before) {
                let after = self.measure(axis);
                let on_target = self.loop_for(axis).on_target(after);
                if self.criteria.is_settled(on_target, before, after, step) {
                    return WaitOutcome::Satisfied;
                }
            }
        }
    }

    // ─── State Access ───────────────────────────────────────────────

    /// Current reading of the sensor feeding `axis`.
    pub fn measure(&self, axis: Axis) -> f64 {
        let frame = SensorFrame::sample(&self.io);
        self.loop_for(axis).source().read(&frame)
    }

    /// Feedback loop for `axis`.
    pub fn loop_for(&self, axis: Axis) -> &FeedbackLoop {
        match self.drive.loop_for(axis) {
            Some(fl) => fl,
            None => self.mechanism.pid(),
        }
    }

    /// Field-state code received by the last field-state wait.
    pub fn take_field_code(&mut self) -> Option<FieldCode> {
        self.field_code.take()
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[inline]
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn io(&self) -> &Io {
        &self.io
    }

    #[inline]
    pub fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    #[inline]
    pub fn drive(&self) -> &DriveBase {
        &self.drive
    }

    #[inline]
    pub fn mechanism(&self) -> &MechanismController {
        &self.mechanism
    }

    #[inline]
    pub fn intake(&self) -> f64 {
        self.intake
    }

    // ─── Telemetry ──────────────────────────────────────────────────

    /// Publish the current state. Reads only.
    pub fn publish(&self) {
        let t = &self.telemetry;
        let flags = self.mechanism.flags();
        t.put_number(telemetry::DISTANCE, self.io.distance());
        t.put_number(telemetry::ANGLE, self.io.heading());
        t.put_number(telemetry::ELEVATOR_HEIGHT, self.io.elevator_height());
        t.put_number(telemetry::ELEVATOR_SETPOINT, self.mechanism.setpoint());
        t.put_number(telemetry::ELEVATOR_OUTPUT, self.mechanism.output());
        t.put_bool(telemetry::LOWERING, flags.contains(MechanismFlags::LOWERING));
        t.put_bool(telemetry::AUTOMATIC, flags.contains(MechanismFlags::AUTO));
        t.put_bool(telemetry::OVERRIDE, flags.contains(MechanismFlags::OVERRIDE));
    }
}
