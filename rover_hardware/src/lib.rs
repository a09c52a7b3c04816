//! Simulated differential drive implementing the `rover_traits` HAL.
//!
//! One `SimulatedDrive` models both wheels. It hands out `SimulatedEncoders`
//! and `SimulatedMotors` handles that share the model, so the core can own the
//! two trait objects separately while the simulation stays consistent.
//! Wheel positions are integrated lazily from the injected clock on every
//! read or command.
pub mod error;

use error::{HwError, Result};
use rover_traits::clock::Clock;
use rover_traits::{Encoders, Motors};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// One millionth of a step per (step/s * us).
const MICRO_STEPS_PER_STEP: i64 = 1_000_000;

/// Simulation parameters.
#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    /// Largest accepted motor setpoint (full speed), in setpoint digits.
    pub max_motor_speed: i16,
    /// Left wheel speed at full setpoint, in encoder steps per second.
    pub left_steps_per_sec: i32,
    /// Right wheel speed at full setpoint, in encoder steps per second.
    pub right_steps_per_sec: i32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_motor_speed: 400,
            left_steps_per_sec: 3000,
            right_steps_per_sec: 3000,
        }
    }
}

#[derive(Debug)]
struct Wheel {
    command: i16,
    steps_per_sec_at_max: i32,
    counts: i16,
    // Fractional steps not yet visible on the counter, in micro-steps.
    residual: i64,
}

impl Wheel {
    fn new(steps_per_sec_at_max: i32) -> Self {
        Self {
            command: 0,
            steps_per_sec_at_max,
            counts: 0,
            residual: 0,
        }
    }

    fn advance(&mut self, dt_us: i64, max_motor_speed: i16) {
        let sps = i64::from(self.command) * i64::from(self.steps_per_sec_at_max)
            / i64::from(max_motor_speed);
        self.residual += sps * dt_us;
        let whole = self.residual / MICRO_STEPS_PER_STEP;
        self.residual -= whole * MICRO_STEPS_PER_STEP;
        // Truncating cast keeps the counter's modulo-2^16 behavior.
        self.counts = self.counts.wrapping_add(whole as i16);
    }
}

#[derive(Debug)]
struct DriveModel {
    max_motor_speed: i16,
    left: Wheel,
    right: Wheel,
    last: Instant,
    fail_commands: Option<String>,
    commands_issued: u32,
}

impl DriveModel {
    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last);
        let dt_us = i64::try_from(dt.as_micros()).unwrap_or(i64::MAX);
        if dt_us == 0 {
            return;
        }
        self.left.advance(dt_us, self.max_motor_speed);
        self.right.advance(dt_us, self.max_motor_speed);
        self.last = now;
    }
}

/// Shared two-wheel simulation.
#[derive(Clone)]
pub struct SimulatedDrive {
    model: Rc<RefCell<DriveModel>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for SimulatedDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedDrive")
            .field("model", &self.model.borrow())
            .finish()
    }
}

impl SimulatedDrive {
    pub fn new(params: SimParams, clock: Arc<dyn Clock + Send + Sync>) -> Result<Self> {
        if params.max_motor_speed <= 0 {
            return Err(HwError::InvalidParameter("max_motor_speed must be > 0"));
        }
        if params.left_steps_per_sec < 0 || params.right_steps_per_sec < 0 {
            return Err(HwError::InvalidParameter("steps_per_sec must be >= 0"));
        }
        let max_sps = i32::from(i16::MAX);
        if params.left_steps_per_sec > max_sps || params.right_steps_per_sec > max_sps {
            return Err(HwError::InvalidParameter("steps_per_sec must be <= 32767"));
        }
        let model = DriveModel {
            max_motor_speed: params.max_motor_speed,
            left: Wheel::new(params.left_steps_per_sec),
            right: Wheel::new(params.right_steps_per_sec),
            last: clock.now(),
            fail_commands: None,
            commands_issued: 0,
        };
        Ok(Self {
            model: Rc::new(RefCell::new(model)),
            clock,
        })
    }

    /// Encoder handle sharing this simulation.
    pub fn encoders(&self) -> SimulatedEncoders {
        SimulatedEncoders {
            drive: self.clone(),
        }
    }

    /// Motor handle sharing this simulation.
    pub fn motors(&self) -> SimulatedMotors {
        SimulatedMotors {
            drive: self.clone(),
        }
    }

    /// Force absolute counter values, e.g. to start close to a wraparound.
    pub fn set_counts(&self, left: i16, right: i16) {
        let mut m = self.sync();
        m.left.counts = left;
        m.right.counts = right;
        m.left.residual = 0;
        m.right.residual = 0;
    }

    /// Make every subsequent motor command fail with the given message.
    pub fn fail_commands(&self, reason: impl Into<String>) {
        self.model.borrow_mut().fail_commands = Some(reason.into());
    }

    /// Accept motor commands again after `fail_commands`.
    pub fn heal(&self) {
        self.model.borrow_mut().fail_commands = None;
    }

    /// Number of accepted motor commands since construction.
    pub fn commands_issued(&self) -> u32 {
        self.model.borrow().commands_issued
    }

    fn sync(&self) -> std::cell::RefMut<'_, DriveModel> {
        let mut m = self.model.borrow_mut();
        m.advance(self.clock.now());
        m
    }
}

/// Encoder half of a `SimulatedDrive`.
#[derive(Debug, Clone)]
pub struct SimulatedEncoders {
    drive: SimulatedDrive,
}

impl Encoders for SimulatedEncoders {
    fn counts_left(&self) -> i16 {
        self.drive.sync().left.counts
    }

    fn counts_right(&self) -> i16 {
        self.drive.sync().right.counts
    }
}

/// Motor half of a `SimulatedDrive`.
#[derive(Debug, Clone)]
pub struct SimulatedMotors {
    drive: SimulatedDrive,
}

impl Motors for SimulatedMotors {
    fn left_speed(&self) -> i16 {
        self.drive.model.borrow().left.command
    }

    fn right_speed(&self) -> i16 {
        self.drive.model.borrow().right.command
    }

    fn max_speed(&self) -> i16 {
        self.drive.model.borrow().max_motor_speed
    }

    fn set_speeds(
        &mut self,
        left: i16,
        right: i16,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut m = self.drive.sync();
        if let Some(reason) = &m.fail_commands {
            tracing::error!(left, right, reason = %reason, "simulated motor command failed");
            return Err(Box::new(HwError::CommandRejected(reason.clone())));
        }
        let max = m.max_motor_speed;
        // i16::MIN has no positive counterpart, so compare on the negated side.
        if left < -max || left > max || right < -max || right > max {
            return Err(Box::new(HwError::SpeedOutOfRange { left, right, max }));
        }
        tracing::trace!(left, right, "simulated motor setpoints");
        m.left.command = left;
        m.right.command = right;
        m.commands_issued = m.commands_issued.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_traits::clock::ManualClock;

    fn drive(params: SimParams) -> (SimulatedDrive, ManualClock) {
        let clock = ManualClock::new();
        let drive = SimulatedDrive::new(params, Arc::new(clock.clone())).unwrap();
        (drive, clock)
    }

    #[test]
    fn full_speed_integrates_steps() {
        let (drive, clock) = drive(SimParams::default());
        let mut motors = drive.motors();
        let encoders = drive.encoders();
        motors.set_speeds(400, -400).unwrap();
        clock.advance_ms(10);
        assert_eq!(encoders.counts_left(), 30);
        assert_eq!(encoders.counts_right(), -30);
    }

    #[test]
    fn fractional_steps_carry_over() {
        let (drive, clock) = drive(SimParams {
            max_motor_speed: 400,
            left_steps_per_sec: 500,
            right_steps_per_sec: 500,
        });
        let mut motors = drive.motors();
        let encoders = drive.encoders();
        motors.set_speeds(400, 400).unwrap();
        for _ in 0..4 {
            clock.advance_ms(1);
            let _ = encoders.counts_left();
        }
        // 0.5 steps per ms.
        assert_eq!(encoders.counts_left(), 2);
        assert_eq!(encoders.counts_right(), 2);
    }

    #[test]
    fn counters_wrap() {
        let (drive, clock) = drive(SimParams::default());
        drive.set_counts(i16::MAX - 1, i16::MIN + 1);
        let mut motors = drive.motors();
        motors.set_speeds(400, -400).unwrap();
        clock.advance_ms(1);
        let encoders = drive.encoders();
        assert_eq!(encoders.counts_left(), i16::MIN + 1);
        assert_eq!(encoders.counts_right(), i16::MAX - 1);
    }

    #[test]
    fn rejects_out_of_range_and_injected_faults() {
        let (drive, _clock) = drive(SimParams::default());
        let mut motors = drive.motors();
        assert!(motors.set_speeds(401, 0).is_err());
        assert!(motors.set_speeds(0, i16::MIN).is_err());
        drive.fail_commands("driver offline");
        let err = motors.set_speeds(0, 0).unwrap_err();
        assert!(err.to_string().contains("driver offline"));
        drive.heal();
        motors.set_speeds(0, 0).unwrap();
        assert_eq!(drive.commands_issued(), 1);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let clock = ManualClock::new();
        let err = SimulatedDrive::new(
            SimParams {
                max_motor_speed: 0,
                ..SimParams::default()
            },
            Arc::new(clock),
        )
        .unwrap_err();
        assert!(matches!(err, HwError::InvalidParameter(_)));

        let err = SimulatedDrive::new(
            SimParams {
                right_steps_per_sec: 40_000,
                ..SimParams::default()
            },
            Arc::new(ManualClock::new()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HwError::InvalidParameter("steps_per_sec must be <= 32767")
        ));

        SimulatedDrive::new(
            SimParams {
                left_steps_per_sec: i32::from(i16::MAX),
                right_steps_per_sec: i32::from(i16::MAX),
                ..SimParams::default()
            },
            Arc::new(ManualClock::new()),
        )
        .expect("i16::MAX steps/s is representable");
    }
}
