#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the rover estimation stack.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; missing sections fall back to the constants of
//!   the reference robot (12 counts per motor revolution, 8 steps per mm).
use serde::Deserialize;

/// Physical constants of the robot.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Robot {
    /// Encoder counts per revolution of the motor shaft.
    pub encoder_resolution: u32,
    /// Encoder steps per millimeter of wheel travel.
    pub steps_per_mm: u32,
}

impl Default for Robot {
    fn default() -> Self {
        Self {
            encoder_resolution: 12,
            steps_per_mm: 8,
        }
    }
}

/// Timing of the startup motor-speed calibration drive.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Idle time before the calibration drive starts (ms).
    pub wait_ms: u32,
    /// Duration of each full-speed drive, backward and forward (ms).
    pub drive_ms: u32,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            wait_ms: 1000,
            drive_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MileageCfg {
    /// Minimum sampling period of the mileage accumulators (ms).
    pub period_ms: u32,
}

impl Default for MileageCfg {
    fn default() -> Self {
        Self { period_ms: 5 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Scheduler {
    /// Period of the cooperative scheduler loop (ms).
    pub tick_ms: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self { tick_ms: 1 }
    }
}

/// Parameters of the simulated drive used when no robot is attached.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Simulation {
    /// Full-speed motor setpoint in digits.
    pub max_motor_speed: i16,
    /// Left wheel speed at full setpoint (steps/s).
    pub left_steps_per_sec: i32,
    /// Right wheel speed at full setpoint (steps/s).
    pub right_steps_per_sec: i32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            max_motor_speed: 400,
            left_steps_per_sec: 3000,
            right_steps_per_sec: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub robot: Robot,
    pub calibration: CalibrationCfg,
    pub mileage: MileageCfg,
    pub scheduler: Scheduler,
    pub simulation: Simulation,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Robot
        if self.robot.encoder_resolution < 2 {
            eyre::bail!("robot.encoder_resolution must be >= 2");
        }
        if self.robot.steps_per_mm == 0 {
            eyre::bail!("robot.steps_per_mm must be >= 1");
        }

        // Calibration
        if self.calibration.drive_ms == 0 {
            eyre::bail!("calibration.drive_ms must be >= 1");
        }
        if self.calibration.wait_ms > 60 * 1000 {
            eyre::bail!("calibration.wait_ms is unreasonably large (>1min)");
        }
        if self.calibration.drive_ms > 60 * 1000 {
            eyre::bail!("calibration.drive_ms is unreasonably large (>1min)");
        }

        // Mileage
        if self.mileage.period_ms == 0 {
            eyre::bail!("mileage.period_ms must be >= 1");
        }

        // Scheduler
        if self.scheduler.tick_ms == 0 {
            eyre::bail!("scheduler.tick_ms must be >= 1");
        }
        if self.scheduler.tick_ms > 1000 {
            eyre::bail!("scheduler.tick_ms is unreasonably large (>1s)");
        }

        // Simulation
        if self.simulation.max_motor_speed <= 0 {
            eyre::bail!("simulation.max_motor_speed must be > 0");
        }
        if self.simulation.left_steps_per_sec < 0 || self.simulation.right_steps_per_sec < 0 {
            eyre::bail!("simulation.*_steps_per_sec must be >= 0");
        }
        let max_sps = i32::from(i16::MAX);
        if self.simulation.left_steps_per_sec > max_sps
            || self.simulation.right_steps_per_sec > max_sps
        {
            eyre::bail!("simulation.*_steps_per_sec must be <= 32767");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref() {
            if !matches!(rotation, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of never|daily|hourly");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_reference_robot() {
        let cfg = load_toml("").expect("parse");
        assert_eq!(cfg.robot.encoder_resolution, 12);
        assert_eq!(cfg.robot.steps_per_mm, 8);
        assert_eq!(cfg.calibration.wait_ms, 1000);
        assert_eq!(cfg.calibration.drive_ms, 1000);
        assert_eq!(cfg.mileage.period_ms, 5);
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = load_toml("[calibration]\ndrive_ms = 250\n").expect("parse");
        assert_eq!(cfg.calibration.drive_ms, 250);
        assert_eq!(cfg.calibration.wait_ms, 1000);
    }
}
