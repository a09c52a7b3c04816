//! Human-readable error descriptions and structured JSON error formatting.

use rover_core::error::{BuildError, RoverError};
use rover_hardware::error::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingEncoders => {
                "What happened: No encoders were provided to the robot.\nLikely causes: The drive failed to initialize or was not wired into the builder.\nHow to fix: Pass the encoder handle via with_encoders(...).".to_string()
            }
            BuildError::MissingMotors => {
                "What happened: No motors were provided to the robot.\nLikely causes: The drive failed to initialize or was not wired into the builder.\nHow to fix: Pass the motor handle via with_motors(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RoverError>() {
        return match re {
            RoverError::Calibration(msg) => format!(
                "What happened: Motor speed calibration failed ({msg}).\nLikely causes: A wheel is blocked, a motor is disconnected, or the robot is lifted unevenly.\nHow to fix: Check that both wheels turn freely, then recalibrate."
            ),
            RoverError::HardwareFault(msg) => format!(
                "What happened: The motor driver reported a fault ({msg}).\nLikely causes: Driver overcurrent, undervoltage, or a loose motor cable.\nHow to fix: Power-cycle the drive, check the wiring, then recalibrate."
            ),
            RoverError::Hardware(msg) => format!(
                "What happened: A motor command was rejected ({msg}).\nLikely causes: Setpoint outside the motor range.\nHow to fix: Use setpoints within simulation.max_motor_speed."
            ),
            RoverError::State(msg) => format!(
                "What happened: The robot is not ready for this request ({msg}).\nLikely causes: Calibration is still running or the robot is halted.\nHow to fix: Wait for calibration to finish or recalibrate."
            ),
        };
    }

    if let Some(HwError::InvalidParameter(msg)) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: Invalid simulation parameters ({msg}).\nLikely causes: Out-of-range values in the [simulation] section.\nHow to fix: Edit the config file, then rerun."
        );
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read ({msg}).\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the --config path."
        );
    }

    if lower.contains("parse config")
        || lower.contains("must be")
        || lower.contains("unreasonably")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: A typo, a wrong value type, or an out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("did not finish") {
        return format!(
            "What happened: {msg}.\nLikely causes: Scheduler tick too large for the calibration durations.\nHow to fix: Lower scheduler.tick_ms or raise calibration.drive_ms."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: calibration failure 3, hardware fault 4, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<RoverError>() {
        Some(RoverError::Calibration(_)) => 3,
        Some(RoverError::HardwareFault(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<RoverError>() {
        Some(RoverError::Calibration(_)) => "Calibration",
        Some(RoverError::HardwareFault(_)) => "HardwareFault",
        Some(RoverError::Hardware(_)) => "Hardware",
        Some(RoverError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_errors_have_hints_and_exit_code() {
        let err = eyre::Report::new(RoverError::Calibration("max motor speed is 0".into()));
        assert!(humanize(&err).contains("wheels turn freely"));
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(format_error_json(&err).contains("\"reason\":\"Calibration\""));
    }

    #[test]
    fn wrapped_errors_are_still_recognized() {
        use eyre::WrapErr;
        let err: eyre::Result<()> = Err(eyre::Report::new(RoverError::HardwareFault(
            "driver offline".into(),
        )));
        let err = err.wrap_err("command motors").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn out_of_range_config_is_reported_as_invalid() {
        let err = eyre::eyre!("simulation.*_steps_per_sec must be <= 32767");
        assert!(humanize(&err).starts_with("What happened: Configuration is invalid"));
        assert_eq!(exit_code_for_error(&err), 1);
    }

    #[test]
    fn unknown_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert!(humanize(&err).starts_with("Something went wrong."));
        assert_eq!(exit_code_for_error(&err), 1);
    }
}
