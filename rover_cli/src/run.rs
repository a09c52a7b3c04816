//! Simulated robot assembly and the command runners.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use rover_core::error::Result as CoreResult;
use rover_core::{MotorSpeedCalibration, Robot, RoverError, StateId};
use rover_hardware::{SimParams, SimulatedDrive};
use rover_traits::ManualClock;

/// Simulated robot with its own virtual clock.
///
/// Every tick advances the clock by the configured scheduler period, so runs
/// are deterministic and finish as fast as the CPU allows.
pub struct SimRig {
    pub robot: Robot,
    clock: ManualClock,
    tick_ms: u64,
    elapsed_ms: u64,
}

impl SimRig {
    pub fn from_config(cfg: &rover_config::Config) -> CoreResult<Self> {
        let clock = ManualClock::new();
        let shared = Arc::new(clock.clone());
        let params = SimParams {
            max_motor_speed: cfg.simulation.max_motor_speed,
            left_steps_per_sec: cfg.simulation.left_steps_per_sec,
            right_steps_per_sec: cfg.simulation.right_steps_per_sec,
        };
        let drive = SimulatedDrive::new(params, shared.clone())
            .map_err(eyre::Report::new)
            .wrap_err("init simulated drive")?;

        let robot = Robot::builder()
            .with_encoders(drive.encoders())
            .with_motors(drive.motors())
            .with_clock(shared)
            .with_robot_cfg((&cfg.robot).into())
            .with_calibration_cfg((&cfg.calibration).into())
            .with_mileage_cfg((&cfg.mileage).into())
            .build()?;

        Ok(Self {
            robot,
            clock,
            tick_ms: cfg.scheduler.tick_ms,
            elapsed_ms: 0,
        })
    }

    pub fn tick(&mut self) {
        self.clock.advance_ms(self.tick_ms);
        self.elapsed_ms += self.tick_ms;
        self.robot.tick();
    }

    /// Virtual time since the rig was built.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// Outcome of `run_calibration`.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationReport {
    pub calibration: MotorSpeedCalibration,
    pub duration_ms: u64,
}

fn interrupted() -> eyre::Report {
    eyre::eyre!("interrupted")
}

/// Tick until calibration leaves its state.
pub fn run_calibration(
    rig: &mut SimRig,
    cfg: &rover_config::Config,
    shutdown: &AtomicBool,
) -> CoreResult<CalibrationReport> {
    let started = rig.elapsed_ms();
    // Wait plus two drives, with slack for the state transitions.
    let budget_ms = u64::from(cfg.calibration.wait_ms)
        + 2 * u64::from(cfg.calibration.drive_ms)
        + 10 * cfg.scheduler.tick_ms;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Err(interrupted());
        }
        rig.tick();
        match rig.robot.state() {
            Some(StateId::Ready) => break,
            Some(StateId::Error) => {
                let fault = rig
                    .robot
                    .fault()
                    .cloned()
                    .unwrap_or_else(|| RoverError::State("error state without fault".into()));
                return Err(eyre::Report::new(fault));
            }
            _ => {}
        }
        if rig.elapsed_ms() - started > budget_ms {
            eyre::bail!("calibration did not finish within {budget_ms} ms");
        }
    }

    let calibration = rig
        .robot
        .calibration()
        .copied()
        .ok_or_else(|| eyre::Report::new(RoverError::State("ready without calibration".into())))?;
    let duration_ms = rig.elapsed_ms() - started;
    tracing::info!(
        max_motor_speed = calibration.max_motor_speed(),
        duration_ms,
        "calibration done"
    );
    Ok(CalibrationReport {
        calibration,
        duration_ms,
    })
}

/// One telemetry row of a drive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryRow {
    pub t_ms: u64,
    pub speed_left: i16,
    pub speed_right: i16,
    pub speed_center_avg: i16,
    pub mileage_mm: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DriveParams {
    pub left: i16,
    pub right: i16,
    pub duration_ms: u64,
    pub every_ms: u64,
}

/// Drive with fixed setpoints, calling `emit` every `every_ms`.
///
/// The robot must be ready; mileage is cleared at the start.
pub fn run_drive(
    rig: &mut SimRig,
    params: DriveParams,
    shutdown: &AtomicBool,
    mut emit: impl FnMut(&TelemetryRow),
) -> CoreResult<()> {
    rig.robot.clear_mileage();
    rig.robot
        .set_motor_speeds(params.left, params.right)
        .wrap_err("command motors")?;
    tracing::info!(
        left = params.left,
        right = params.right,
        duration_ms = params.duration_ms,
        "drive started"
    );

    let started = rig.elapsed_ms();
    let mut next_emit = params.every_ms;
    let mut result = Ok(());
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!("drive interrupted");
            result = Err(interrupted());
            break;
        }
        rig.tick();
        let t_ms = rig.elapsed_ms() - started;
        if t_ms >= next_emit {
            emit(&TelemetryRow {
                t_ms,
                speed_left: rig.robot.speed_left(),
                speed_right: rig.robot.speed_right(),
                speed_center_avg: rig.robot.smoothed_speed_center(),
                mileage_mm: rig.robot.mileage_center(),
            });
            next_emit = next_emit.saturating_add(params.every_ms);
        }
        if t_ms >= params.duration_ms {
            break;
        }
    }

    // Always leave the motors stopped.
    rig.robot.set_motor_speeds(0, 0).wrap_err("stop motors")?;
    result
}

/// Install the Ctrl-C handler; the returned flag turns true on interrupt.
pub fn shutdown_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
    }
    flag
}
