//! Motor speed calibration.
//!
//! Drives both wheels at full setpoint, first backward then forward, for a
//! fixed duration each and records the highest speed every wheel reached in
//! every direction. The slowest of these is the largest speed both wheels can
//! follow in both directions and becomes the robot's max motor speed.

use std::sync::Arc;

use rover_traits::clock::Clock;

use crate::config::CalibrationCfg;
use crate::error::RoverError;
use crate::relative_encoder::RelativeEncoder;
use crate::speedometer::Speedometer;
use crate::state_machine::{Context, State, StateId};
use crate::timer::Timer;

/// Progress of a calibration run. Strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationPhase {
    #[default]
    Wait,
    DriveBackwardFull,
    DriveForwardFull,
    Finished,
}

/// Highest absolute speed per wheel in steps/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeedBounds {
    pub left: i16,
    pub right: i16,
}

impl SpeedBounds {
    pub fn min(&self) -> i16 {
        self.left.min(self.right)
    }
}

/// Result of a completed calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorSpeedCalibration {
    pub backward: SpeedBounds,
    pub forward: SpeedBounds,
}

impl MotorSpeedCalibration {
    /// Conservative max motor speed in steps/s.
    pub fn max_motor_speed(&self) -> i16 {
        self.backward.min().min(self.forward.min())
    }
}

#[derive(Debug, Default)]
struct PeakTracker {
    left: i16,
    right: i16,
}

impl PeakTracker {
    fn observe(&mut self, speedometer: &Speedometer) {
        self.left = self.left.max(speedometer.speed_left().saturating_abs());
        self.right = self.right.max(speedometer.speed_right().saturating_abs());
    }

    fn take(&mut self) -> SpeedBounds {
        let bounds = SpeedBounds {
            left: self.left,
            right: self.right,
        };
        *self = Self::default();
        bounds
    }
}

/// Calibration state of the robot state machine.
#[derive(Debug)]
pub struct MotorSpeedCalibrationState {
    cfg: CalibrationCfg,
    timer: Timer,
    phase: CalibrationPhase,
    peaks: PeakTracker,
    backward: SpeedBounds,
    forward: SpeedBounds,
    travel_left: RelativeEncoder,
    travel_right: RelativeEncoder,
    failed: bool,
}

impl MotorSpeedCalibrationState {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>, cfg: CalibrationCfg) -> Self {
        Self {
            cfg,
            timer: Timer::new(clock),
            phase: CalibrationPhase::Wait,
            peaks: PeakTracker::default(),
            backward: SpeedBounds::default(),
            forward: SpeedBounds::default(),
            travel_left: RelativeEncoder::default(),
            travel_right: RelativeEncoder::default(),
            failed: false,
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Bounds measured so far in the current run.
    pub fn backward(&self) -> SpeedBounds {
        self.backward
    }

    pub fn forward(&self) -> SpeedBounds {
        self.forward
    }

    fn rebase(&mut self, ctx: &Context<'_>) {
        self.travel_left.set_reference(ctx.encoders.counts_left());
        self.travel_right.set_reference(ctx.encoders.counts_right());
    }

    fn command(&mut self, ctx: &mut Context<'_>, left: i16, right: i16) {
        if let Err(e) = ctx.set_speeds(left, right) {
            tracing::error!(error = %e, left, right, phase = ?self.phase, "calibration motor command failed");
            ctx.record_fault(e);
            self.failed = true;
        }
    }

    fn log_travel(&self, ctx: &Context<'_>) {
        tracing::debug!(
            phase = ?self.phase,
            left_steps = self.travel_left.calculate(ctx.encoders.counts_left()),
            right_steps = self.travel_right.calculate(ctx.encoders.counts_right()),
            "calibration drive done"
        );
    }

    fn begin_drive(&mut self, ctx: &mut Context<'_>, speed: i16, phase: CalibrationPhase) {
        self.command(ctx, speed, speed);
        self.peaks = PeakTracker::default();
        self.rebase(ctx);
        self.timer.start(self.cfg.drive_ms);
        self.phase = phase;
        tracing::debug!(phase = ?phase, speed, "calibration drive started");
    }

    fn finish(&mut self, ctx: &mut Context<'_>) -> StateId {
        self.command(ctx, 0, 0);
        self.timer.stop();
        self.phase = CalibrationPhase::Finished;

        let result = MotorSpeedCalibration {
            backward: self.backward,
            forward: self.forward,
        };
        *ctx.calibration = Some(result);

        if self.failed {
            return StateId::Error;
        }

        let max_motor_speed = result.max_motor_speed();
        tracing::info!(
            backward_left = result.backward.left,
            backward_right = result.backward.right,
            forward_left = result.forward.left,
            forward_right = result.forward.right,
            max_motor_speed,
            "motor speed calibration finished"
        );
        if max_motor_speed == 0 {
            ctx.record_fault(RoverError::Calibration("max motor speed is 0".into()));
            StateId::Error
        } else {
            StateId::Ready
        }
    }
}

impl State for MotorSpeedCalibrationState {
    fn entry(&mut self, ctx: &mut Context<'_>) {
        self.phase = CalibrationPhase::Wait;
        self.peaks = PeakTracker::default();
        self.backward = SpeedBounds::default();
        self.forward = SpeedBounds::default();
        self.failed = false;
        *ctx.calibration = None;
        *ctx.fault = None;

        self.rebase(ctx);
        self.command(ctx, 0, 0);
        self.timer.start(self.cfg.wait_ms);
        tracing::info!(
            wait_ms = self.cfg.wait_ms,
            drive_ms = self.cfg.drive_ms,
            "motor speed calibration started"
        );
    }

    fn process(&mut self, ctx: &mut Context<'_>) -> Option<StateId> {
        if self.failed {
            return Some(StateId::Error);
        }

        let full = ctx.motors.max_speed();
        match self.phase {
            CalibrationPhase::Wait => {
                if self.timer.is_timeout() {
                    self.begin_drive(ctx, full.saturating_neg(), CalibrationPhase::DriveBackwardFull);
                }
            }
            CalibrationPhase::DriveBackwardFull => {
                self.peaks.observe(ctx.speedometer);
                if self.timer.is_timeout() {
                    self.backward = self.peaks.take();
                    self.log_travel(ctx);
                    self.begin_drive(ctx, full, CalibrationPhase::DriveForwardFull);
                }
            }
            CalibrationPhase::DriveForwardFull => {
                self.peaks.observe(ctx.speedometer);
                if self.timer.is_timeout() {
                    self.forward = self.peaks.take();
                    self.log_travel(ctx);
                    return Some(self.finish(ctx));
                }
            }
            CalibrationPhase::Finished => {}
        }

        self.failed.then_some(StateId::Error)
    }

    fn exit(&mut self, _ctx: &mut Context<'_>) {
        self.timer.stop();
    }
}
