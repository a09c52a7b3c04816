//! Minimal hardware abstraction consumed by the estimation core.
//!
//! Implementations may be simulated or physical; the core only reads counters
//! and commanded setpoints and, during calibration, issues new setpoints.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Incremental wheel encoders with free-running 16-bit counters.
///
/// Counters wrap modulo 2^16 as the wheels keep turning.
pub trait Encoders {
    fn counts_left(&self) -> i16;
    fn counts_right(&self) -> i16;
}

/// Left and right drive motors.
///
/// The speed getters report the last *commanded* setpoint, not a measurement.
pub trait Motors {
    fn left_speed(&self) -> i16;
    fn right_speed(&self) -> i16;
    /// Largest setpoint magnitude accepted by `set_speeds`.
    fn max_speed(&self) -> i16;
    fn set_speeds(
        &mut self,
        left: i16,
        right: i16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Encoders + ?Sized> Encoders for Box<T> {
    fn counts_left(&self) -> i16 {
        (**self).counts_left()
    }
    fn counts_right(&self) -> i16 {
        (**self).counts_right()
    }
}

impl<T: Motors + ?Sized> Motors for Box<T> {
    fn left_speed(&self) -> i16 {
        (**self).left_speed()
    }
    fn right_speed(&self) -> i16 {
        (**self).right_speed()
    }
    fn max_speed(&self) -> i16 {
        (**self).max_speed()
    }
    fn set_speeds(
        &mut self,
        left: i16,
        right: i16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_speeds(left, right)
    }
}
