//! Per-wheel speed estimation from encoder deltas.
//!
//! A new speed sample is taken only once the wheel moved at least
//! `min_count` steps since the last sample, so that quantization noise of
//! slow wheels does not show up as speed jitter. Between samples the last
//! speed is held. A stop command or a change of the commanded direction
//! discards the in-flight delta and reports zero.
//!
//! Sample times are whole milliseconds since the speedometer was created.

use std::sync::Arc;
use std::time::Instant;

use rover_traits::clock::Clock;
use rover_traits::{Encoders, Motors};

use crate::config::RobotCfg;
use crate::relative_encoder::RelativeEncoder;
use crate::util::{avg2_trunc_i16, steps_per_sec};

/// Sign of a commanded motor speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Stopped,
    Positive,
    Negative,
}

impl Direction {
    pub fn from_speed(speed: i16) -> Self {
        match speed.signum() {
            1 => Direction::Positive,
            -1 => Direction::Negative,
            _ => Direction::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WheelEstimator {
    encoder: RelativeEncoder,
    sampled_ms: u64,
    speed: i16,
    direction: Direction,
}

impl WheelEstimator {
    fn new(counts: i16, now_ms: u64) -> Self {
        Self {
            encoder: RelativeEncoder::new(counts),
            sampled_ms: now_ms,
            speed: 0,
            direction: Direction::Stopped,
        }
    }

    fn rebase(&mut self, counts: i16, now_ms: u64) {
        self.encoder.set_reference(counts);
        self.sampled_ms = now_ms;
    }

    fn update(&mut self, now_ms: u64, command: i16, counts: i16, min_count: u16) {
        let direction = Direction::from_speed(command);

        if command == 0 || direction != self.direction {
            self.speed = 0;
            self.rebase(counts, now_ms);
        } else {
            let delta = self.encoder.calculate(counts);
            if delta.unsigned_abs() >= min_count {
                let elapsed_ms = now_ms.saturating_sub(self.sampled_ms);
                // Within the same millisecond there is nothing to divide by; keep
                // accumulating until time has passed.
                if let Some(speed) = steps_per_sec(delta, elapsed_ms) {
                    self.speed = speed;
                    self.rebase(counts, now_ms);
                }
            }
        }

        self.direction = direction;
    }
}

/// Left/right/center wheel speed in encoder steps per second.
pub struct Speedometer {
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    min_count: u16,
    left: WheelEstimator,
    right: WheelEstimator,
}

impl core::fmt::Debug for Speedometer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Speedometer")
            .field("min_count", &self.min_count)
            .field("left", &self.left.speed)
            .field("right", &self.right.speed)
            .finish_non_exhaustive()
    }
}

impl Speedometer {
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        robot: &RobotCfg,
        encoders: &dyn Encoders,
    ) -> Self {
        let epoch = clock.now();
        Self {
            min_count: robot.min_speed_count(),
            left: WheelEstimator::new(encoders.counts_left(), 0),
            right: WheelEstimator::new(encoders.counts_right(), 0),
            clock,
            epoch,
        }
    }

    /// Update both wheel speeds. Call once per scheduler tick.
    pub fn process(&mut self, encoders: &dyn Encoders, motors: &dyn Motors) {
        let now = self.now_ms();
        self.left.update(
            now,
            motors.left_speed(),
            encoders.counts_left(),
            self.min_count,
        );
        self.right.update(
            now,
            motors.right_speed(),
            encoders.counts_right(),
            self.min_count,
        );
    }

    /// Forget all speeds and rebase on the current counters.
    pub fn clear(&mut self, encoders: &dyn Encoders) {
        let now = self.now_ms();
        self.left = WheelEstimator::new(encoders.counts_left(), now);
        self.right = WheelEstimator::new(encoders.counts_right(), now);
    }

    pub fn speed_left(&self) -> i16 {
        self.left.speed
    }

    pub fn speed_right(&self) -> i16 {
        self.right.speed
    }

    /// Mean of left and right, truncated toward zero.
    pub fn speed_center(&self) -> i16 {
        avg2_trunc_i16(self.left.speed, self.right.speed)
    }

    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Steps a wheel must travel before a new speed sample is taken.
    pub fn min_count(&self) -> u16 {
        self.min_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_sign() {
        assert_eq!(Direction::from_speed(0), Direction::Stopped);
        assert_eq!(Direction::from_speed(5), Direction::Positive);
        assert_eq!(Direction::from_speed(-1), Direction::Negative);
        assert_eq!(Direction::from_speed(i16::MIN), Direction::Negative);
    }

    #[test]
    fn wheel_holds_below_threshold() {
        let mut w = WheelEstimator::new(0, 0);
        // First tick with a command only establishes the direction.
        w.update(0, 100, 0, 6);
        assert_eq!(w.speed, 0);

        w.update(1, 100, 3, 6);
        assert_eq!(w.speed, 0);
        assert_eq!(w.encoder.reference(), 0);

        w.update(2, 100, 6, 6);
        assert_eq!(w.speed, 3000);
        assert_eq!(w.encoder.reference(), 6);

        // Below threshold again: previous speed is held.
        w.update(3, 100, 8, 6);
        assert_eq!(w.speed, 3000);
    }

    #[test]
    fn wheel_holds_when_no_time_elapsed() {
        let mut w = WheelEstimator::new(0, 0);
        w.update(0, 50, 0, 6);
        w.update(0, 50, 20, 6);
        assert_eq!(w.speed, 0);
        assert_eq!(w.encoder.reference(), 0);
    }
}
