use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("motor setpoint out of range: left={left} right={right} (max {max})")]
    SpeedOutOfRange { left: i16, right: i16, max: i16 },
    #[error("motor driver rejected command: {0}")]
    CommandRejected(String),
    #[error("invalid simulation parameter: {0}")]
    InvalidParameter(&'static str),
}

pub type Result<T> = std::result::Result<T, HwError>;
