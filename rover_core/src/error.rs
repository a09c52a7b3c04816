use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoverError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("calibration failed: {0}")]
    Calibration(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing encoders")]
    MissingEncoders,
    #[error("missing motors")]
    MissingMotors,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u8 },
    #[error("line sensor value {value} exceeds {max}")]
    OutOfRange { value: u16, max: u16 },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
