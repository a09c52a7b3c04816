//! Runtime configuration used by the estimators and the calibration state.
//!
//! These are separate from the TOML-deserialized config in `rover_config`;
//! see `conversions` for the mapping.

/// Physical constants of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotCfg {
    /// Encoder counts per motor shaft revolution.
    pub encoder_resolution: u32,
    /// Encoder steps per millimeter of wheel travel.
    pub steps_per_mm: u32,
}

impl RobotCfg {
    /// Minimum accumulated step count before a new speed sample is taken:
    /// half a motor shaft revolution.
    pub fn min_speed_count(&self) -> u16 {
        u16::try_from(self.encoder_resolution / 2).unwrap_or(u16::MAX)
    }
}

impl Default for RobotCfg {
    fn default() -> Self {
        Self {
            encoder_resolution: 12,
            steps_per_mm: 8,
        }
    }
}

/// Timing of the motor-speed calibration drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCfg {
    /// Standstill before the drive starts (ms).
    pub wait_ms: u32,
    /// Length of each full-speed drive (ms).
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

/// Mileage sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MileageCfg {
    /// Minimum period between two accumulation steps (ms).
    pub period_ms: u32,
}

impl Default for MileageCfg {
    fn default() -> Self {
        Self { period_ms: 5 }
    }
}
