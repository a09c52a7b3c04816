#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensing, estimation and motor-speed calibration for a two-wheeled robot
//! (hardware-agnostic).
//!
//! All hardware access goes through `rover_traits::Encoders` and
//! `rover_traits::Motors`; time comes from an injected `rover_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Encoders**: wraparound-safe deltas on 16-bit counters (`relative_encoder`)
//! - **Estimation**: wheel speeds (`speedometer`), distance (`mileage`) and
//!   smoothing (`moving_average`)
//! - **Behavior**: closed state machine (`state_machine`) with the motor speed
//!   calibration (`calibration`) and the Ready/Error states (`states`)
//! - **Aggregate**: `Robot`, built via `Robot::builder()`, ticked cooperatively
//! - **Wire format**: fixed-layout host records (`payload`)
//!
//! Everything runs on one thread: a scheduler calls `Robot::tick()` and no
//! call blocks.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mileage;
pub mod mocks;
pub mod moving_average;
pub mod payload;
pub mod relative_encoder;
pub mod robot;
pub mod speedometer;
pub mod state_machine;
pub mod states;
pub mod timer;
pub mod util;

pub use builder::{Missing, RobotBuilder, Set};
pub use calibration::{
    CalibrationPhase, MotorSpeedCalibration, MotorSpeedCalibrationState, SpeedBounds,
};
pub use config::{CalibrationCfg, MileageCfg, RobotCfg};
pub use error::{BuildError, PayloadError, Report, Result, RoverError};
pub use mileage::Mileage;
pub use moving_average::MovingAverage;
pub use relative_encoder::RelativeEncoder;
pub use robot::Robot;
pub use speedometer::{Direction, Speedometer};
pub use state_machine::{Context, State, StateId, StateMachine};
pub use timer::Timer;
