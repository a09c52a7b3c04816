//! Maps `Box<dyn Error>` from trait boundaries to typed `RoverError`.
//!
//! The HAL traits in `rover_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `rover_hardware::HwError` downcasting.

use crate::error::RoverError;

/// Map a trait-boundary error to a typed `RoverError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> RoverError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<rover_hardware::error::HwError>() {
            return match hw {
                rover_hardware::error::HwError::CommandRejected(_) => {
                    RoverError::HardwareFault(hw.to_string())
                }
                other => RoverError::Hardware(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("fault") {
        RoverError::HardwareFault(s)
    } else {
        RoverError::Hardware(s)
    }
}
