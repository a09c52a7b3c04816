//! Type-state builder for `Robot`.
//!
//! Encoders and motors must be provided before `build()` is available;
//! `try_build()` is always available and reports what is missing.

use std::marker::PhantomData;
use std::sync::Arc;

use rover_traits::clock::{Clock, MonotonicClock};
use rover_traits::{Encoders, Motors};

use crate::calibration::MotorSpeedCalibrationState;
use crate::config::{CalibrationCfg, MileageCfg, RobotCfg};
use crate::error::{BuildError, Result};
use crate::mileage::Mileage;
use crate::moving_average::MovingAverage;
use crate::robot::Robot;
use crate::speedometer::Speedometer;
use crate::state_machine::{StateId, StateMachine};

pub struct Missing;
pub struct Set;

/// Builder for `Robot`. Configuration is validated on build.
pub struct RobotBuilder<E, M> {
    encoders: Option<Box<dyn Encoders>>,
    motors: Option<Box<dyn Motors>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    robot: Option<RobotCfg>,
    calibration: Option<CalibrationCfg>,
    mileage: Option<MileageCfg>,
    _e: PhantomData<E>,
    _m: PhantomData<M>,
}

impl Default for RobotBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            encoders: None,
            motors: None,
            clock: None,
            robot: None,
            calibration: None,
            mileage: None,
            _e: PhantomData,
            _m: PhantomData,
        }
    }
}

fn validate(robot: &RobotCfg, calibration: &CalibrationCfg, mileage: &MileageCfg) -> Result<()> {
    if robot.encoder_resolution < 2 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "encoder_resolution must be >= 2",
        )));
    }
    if robot.steps_per_mm == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "steps_per_mm must be >= 1",
        )));
    }
    if mileage.period_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "mileage period_ms must be >= 1",
        )));
    }
    if calibration.drive_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "calibration drive_ms must be >= 1",
        )));
    }
    Ok(())
}

impl<E, M> RobotBuilder<E, M> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<Robot> {
        let encoders = self
            .encoders
            .ok_or_else(|| eyre::Report::new(BuildError::MissingEncoders))?;
        let motors = self
            .motors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotors))?;

        let robot_cfg = self.robot.unwrap_or_default();
        let calibration_cfg = self.calibration.unwrap_or_default();
        let mileage_cfg = self.mileage.unwrap_or_default();
        validate(&robot_cfg, &calibration_cfg, &mileage_cfg)?;

        let clock: Arc<dyn Clock + Send + Sync> = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        let speedometer = Speedometer::new(clock.clone(), &robot_cfg, encoders.as_ref());
        let mileage = Mileage::new(clock.clone(), &robot_cfg, &mileage_cfg, encoders.as_ref());
        let mut sm = StateMachine::new(MotorSpeedCalibrationState::new(
            clock.clone(),
            calibration_cfg,
        ));
        sm.set_state(StateId::MotorSpeedCalibration);

        tracing::debug!(
            encoder_resolution = robot_cfg.encoder_resolution,
            steps_per_mm = robot_cfg.steps_per_mm,
            min_speed_count = speedometer.min_count(),
            mileage_period_ms = mileage_cfg.period_ms,
            "robot built"
        );

        Ok(Robot {
            encoders,
            motors,
            epoch: clock.now(),
            clock,
            speedometer,
            mileage,
            smoothed: MovingAverage::new(),
            sm,
            calibration: None,
            fault: None,
        })
    }

    pub fn with_robot_cfg(mut self, robot: RobotCfg) -> Self {
        self.robot = Some(robot);
        self
    }

    pub fn with_calibration_cfg(mut self, calibration: CalibrationCfg) -> Self {
        self.calibration = Some(calibration);
        self
    }

    pub fn with_mileage_cfg(mut self, mileage: MileageCfg) -> Self {
        self.mileage = Some(mileage);
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl<M> RobotBuilder<Missing, M> {
    pub fn with_encoders(self, encoders: impl Encoders + 'static) -> RobotBuilder<Set, M> {
        RobotBuilder {
            encoders: Some(Box::new(encoders)),
            motors: self.motors,
            clock: self.clock,
            robot: self.robot,
            calibration: self.calibration,
            mileage: self.mileage,
            _e: PhantomData,
            _m: PhantomData,
        }
    }
}

impl<E> RobotBuilder<E, Missing> {
    pub fn with_motors(self, motors: impl Motors + 'static) -> RobotBuilder<E, Set> {
        RobotBuilder {
            encoders: self.encoders,
            motors: Some(Box::new(motors)),
            clock: self.clock,
            robot: self.robot,
            calibration: self.calibration,
            mileage: self.mileage,
            _e: PhantomData,
            _m: PhantomData,
        }
    }
}

impl RobotBuilder<Set, Set> {
    /// Validate and build. Only available once encoders and motors are set.
    pub fn build(self) -> Result<Robot> {
        self.try_build()
    }
}
