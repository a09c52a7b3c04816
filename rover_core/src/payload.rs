//! Fixed-layout records exchanged with a host over a serial channel.
//!
//! All records are packed and little-endian, fields in declaration order.

use crate::error::PayloadError;

/// Upper bound of a normalized line sensor value.
pub const LINE_SENSOR_MAX: u16 = 1000;
/// Number of line sensors.
pub const LINE_SENSOR_COUNT: usize = 5;

fn check_len(bytes: &[u8], expected: usize) -> Result<(), PayloadError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(PayloadError::Length {
            expected,
            actual: bytes.len(),
        })
    }
}

/// Left and right wheel speed in steps/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeedData {
    pub left: i16,
    pub right: i16,
}

impl SpeedData {
    pub const SIZE: usize = 4;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&self.left.to_le_bytes());
        out[2..4].copy_from_slice(&self.right.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len(bytes, Self::SIZE)?;
        Ok(Self {
            left: i16::from_le_bytes([bytes[0], bytes[1]]),
            right: i16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// Normalized line sensor readings, each in `0..=LINE_SENSOR_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSensorData {
    values: [u16; LINE_SENSOR_COUNT],
}

impl LineSensorData {
    pub const SIZE: usize = 2 * LINE_SENSOR_COUNT;

    /// Values above `LINE_SENSOR_MAX` are clamped.
    pub fn new(values: [u16; LINE_SENSOR_COUNT]) -> Self {
        Self {
            values: values.map(|v| v.min(LINE_SENSOR_MAX)),
        }
    }

    pub fn values(&self) -> &[u16; LINE_SENSOR_COUNT] {
        &self.values
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        for (chunk, v) in out.chunks_exact_mut(2).zip(self.values) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len(bytes, Self::SIZE)?;
        let mut values = [0u16; LINE_SENSOR_COUNT];
        for (v, chunk) in values.iter_mut().zip(bytes.chunks_exact(2)) {
            let raw = u16::from_le_bytes([chunk[0], chunk[1]]);
            if raw > LINE_SENSOR_MAX {
                return Err(PayloadError::OutOfRange {
                    value: raw,
                    max: LINE_SENSOR_MAX,
                });
            }
            *v = raw;
        }
        Ok(Self { values })
    }
}

/// Host request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CmdId {
    #[default]
    Idle = 0,
    ReinitBoard = 1,
    GetMaxSpeed = 2,
}

impl TryFrom<u8> for CmdId {
    type Error = PayloadError;

    fn try_from(id: u8) -> Result<Self, PayloadError> {
        match id {
            0 => Ok(CmdId::Idle),
            1 => Ok(CmdId::ReinitBoard),
            2 => Ok(CmdId::GetMaxSpeed),
            _ => Err(PayloadError::UnknownId { kind: "command", id }),
        }
    }
}

/// Outcome reported back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RspId {
    #[default]
    Ok = 0,
    Pending = 1,
    Error = 2,
}

impl TryFrom<u8> for RspId {
    type Error = PayloadError;

    fn try_from(id: u8) -> Result<Self, PayloadError> {
        match id {
            0 => Ok(RspId::Ok),
            1 => Ok(RspId::Pending),
            2 => Ok(RspId::Error),
            _ => Err(PayloadError::UnknownId {
                kind: "response",
                id,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Command {
    pub id: CmdId,
}

impl Command {
    pub const SIZE: usize = 1;

    pub fn new(id: CmdId) -> Self {
        Self { id }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [self.id as u8]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len(bytes, Self::SIZE)?;
        Ok(Self {
            id: CmdId::try_from(bytes[0])?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandResponse {
    pub id: RspId,
    /// Calibrated max motor speed in steps/s; only meaningful with `RspId::Ok`
    /// in answer to `CmdId::GetMaxSpeed`.
    pub max_motor_speed: i16,
}

impl CommandResponse {
    pub const SIZE: usize = 3;

    pub fn ok() -> Self {
        Self {
            id: RspId::Ok,
            max_motor_speed: 0,
        }
    }

    pub fn pending() -> Self {
        Self {
            id: RspId::Pending,
            max_motor_speed: 0,
        }
    }

    pub fn error() -> Self {
        Self {
            id: RspId::Error,
            max_motor_speed: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let speed = self.max_motor_speed.to_le_bytes();
        [self.id as u8, speed[0], speed[1]]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len(bytes, Self::SIZE)?;
        Ok(Self {
            id: RspId::try_from(bytes[0])?,
            max_motor_speed: i16::from_le_bytes([bytes[1], bytes[2]]),
        })
    }
}
