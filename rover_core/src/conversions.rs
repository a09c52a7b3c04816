//! `From` implementations bridging `rover_config` types to `rover_core` types.

use crate::config::{CalibrationCfg, MileageCfg, RobotCfg};

// ── RobotCfg ─────────────────────────────────────────────────────────────────

impl From<&rover_config::Robot> for RobotCfg {
    fn from(c: &rover_config::Robot) -> Self {
        Self {
            encoder_resolution: c.encoder_resolution,
            steps_per_mm: c.steps_per_mm,
        }
    }
}

// ── CalibrationCfg ───────────────────────────────────────────────────────────

impl From<&rover_config::CalibrationCfg> for CalibrationCfg {
    fn from(c: &rover_config::CalibrationCfg) -> Self {
        Self {
            wait_ms: c.wait_ms,
            drive_ms: c.drive_ms,
        }
    }
}

// ── MileageCfg ───────────────────────────────────────────────────────────────

impl From<&rover_config::MileageCfg> for MileageCfg {
    fn from(c: &rover_config::MileageCfg) -> Self {
        Self {
            period_ms: c.period_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_with_config_defaults() {
        let cfg = rover_config::Config::default();
        assert_eq!(RobotCfg::from(&cfg.robot), RobotCfg::default());
        assert_eq!(
            CalibrationCfg::from(&cfg.calibration),
            CalibrationCfg::default()
        );
        assert_eq!(MileageCfg::from(&cfg.mileage), MileageCfg::default());
    }

    #[test]
    fn min_speed_count_is_half_a_revolution() {
        let robot = RobotCfg::from(&rover_config::Robot {
            encoder_resolution: 48,
            steps_per_mm: 30,
        });
        assert_eq!(robot.min_speed_count(), 24);
    }
}
