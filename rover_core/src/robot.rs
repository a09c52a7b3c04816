//! The robot aggregate: sensors, estimators and state machine behind one
//! cooperative `tick()`.

use std::sync::Arc;
use std::time::Instant;

use rover_traits::clock::Clock;
use rover_traits::{Encoders, Motors};

use crate::builder::{Missing, RobotBuilder};
use crate::calibration::{CalibrationPhase, MotorSpeedCalibration};
use crate::error::{Result, RoverError};
use crate::hw_error::map_hw_error;
use crate::mileage::Mileage;
use crate::moving_average::MovingAverage;
use crate::payload::{CmdId, Command, CommandResponse, SpeedData};
use crate::speedometer::Speedometer;
use crate::state_machine::{Context, StateId, StateMachine};

/// Number of center speed samples in the smoothed speed.
pub const SMOOTHING_WINDOW: usize = 8;

pub struct Robot {
    pub(crate) encoders: Box<dyn Encoders>,
    pub(crate) motors: Box<dyn Motors>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) speedometer: Speedometer,
    pub(crate) mileage: Mileage,
    pub(crate) smoothed: MovingAverage<i32, SMOOTHING_WINDOW>,
    pub(crate) sm: StateMachine,
    pub(crate) calibration: Option<MotorSpeedCalibration>,
    pub(crate) fault: Option<RoverError>,
}

impl core::fmt::Debug for Robot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Robot")
            .field("state", &self.sm.state())
            .field("speedometer", &self.speedometer)
            .field("mileage", &self.mileage)
            .field("calibration", &self.calibration)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl Robot {
    /// Start building a Robot.
    pub fn builder() -> RobotBuilder<Missing, Missing> {
        RobotBuilder::default()
    }

    /// One scheduler iteration: speedometer, mileage, smoothing, state machine.
    pub fn tick(&mut self) {
        self.speedometer
            .process(self.encoders.as_ref(), self.motors.as_ref());
        self.mileage.process(self.encoders.as_ref());
        self.smoothed
            .write(i32::from(self.speedometer.speed_center()));

        let mut ctx = Context {
            encoders: self.encoders.as_ref(),
            motors: self.motors.as_mut(),
            speedometer: &self.speedometer,
            calibration: &mut self.calibration,
            fault: &mut self.fault,
        };
        self.sm.process(&mut ctx);
    }

    /// Milliseconds since the robot was built.
    pub fn uptime_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    pub fn speed_left(&self) -> i16 {
        self.speedometer.speed_left()
    }

    pub fn speed_right(&self) -> i16 {
        self.speedometer.speed_right()
    }

    pub fn speed_center(&self) -> i16 {
        self.speedometer.speed_center()
    }

    /// Center speed averaged over the last `SMOOTHING_WINDOW` ticks.
    pub fn smoothed_speed_center(&self) -> i16 {
        // An average of i16 samples always fits i16.
        i16::try_from(self.smoothed.result()).unwrap_or_default()
    }

    pub fn mileage(&self) -> &Mileage {
        &self.mileage
    }

    /// Travelled distance in mm.
    pub fn mileage_center(&self) -> u32 {
        self.mileage.mileage_center()
    }

    /// Active state; `None` until the first `tick()`.
    pub fn state(&self) -> Option<StateId> {
        self.sm.state()
    }

    /// Phase of the running (or last) calibration.
    pub fn calibration_phase(&self) -> CalibrationPhase {
        self.sm.calibration_state().phase()
    }

    /// Result of the last finished calibration.
    pub fn calibration(&self) -> Option<&MotorSpeedCalibration> {
        self.calibration.as_ref()
    }

    pub fn fault(&self) -> Option<&RoverError> {
        self.fault.as_ref()
    }

    /// Start a new calibration run on the next tick.
    pub fn request_recalibration(&mut self) {
        tracing::info!("recalibration requested");
        self.sm.set_state(StateId::MotorSpeedCalibration);
    }

    pub fn clear_mileage(&mut self) {
        self.mileage.clear(self.encoders.as_ref());
    }

    /// Command the motors. Only allowed once the robot is ready.
    pub fn set_motor_speeds(&mut self, left: i16, right: i16) -> Result<()> {
        match self.effective_state() {
            Some(StateId::Ready) => {}
            Some(StateId::MotorSpeedCalibration) | None => {
                return Err(eyre::Report::new(RoverError::State(
                    "motors are in use by calibration".into(),
                )));
            }
            Some(StateId::Error) => {
                return Err(eyre::Report::new(RoverError::State(
                    "robot is in error state".into(),
                )));
            }
        }
        self.motors
            .set_speeds(left, right)
            .map_err(|e| eyre::Report::new(map_hw_error(e.as_ref())))
    }

    pub fn speed_telemetry(&self) -> SpeedData {
        SpeedData {
            left: self.speed_left(),
            right: self.speed_right(),
        }
    }

    /// Answer a host command.
    pub fn handle_command(&mut self, cmd: Command) -> CommandResponse {
        tracing::debug!(cmd = ?cmd.id, "host command");
        match cmd.id {
            CmdId::Idle => CommandResponse::ok(),
            CmdId::ReinitBoard => {
                self.clear_mileage();
                self.request_recalibration();
                CommandResponse::ok()
            }
            CmdId::GetMaxSpeed => match (self.effective_state(), self.calibration) {
                (Some(StateId::Error), _) => CommandResponse::error(),
                (Some(StateId::Ready), Some(cal)) => CommandResponse {
                    max_motor_speed: cal.max_motor_speed(),
                    ..CommandResponse::ok()
                },
                _ => CommandResponse::pending(),
            },
        }
    }

    // A requested transition wins over the state it is about to leave.
    fn effective_state(&self) -> Option<StateId> {
        self.sm.pending().or_else(|| self.sm.state())
    }
}
