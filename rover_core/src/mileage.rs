//! Distance travelled, accumulated from absolute encoder deltas.
//!
//! Mileage counts every step regardless of direction; driving forward and
//! back again adds up. Accumulation happens at most once per configured
//! period so that a fast tick rate does not hammer the counters.

use std::sync::Arc;

use rover_traits::Encoders;
use rover_traits::clock::Clock;

use crate::config::{MileageCfg, RobotCfg};
use crate::relative_encoder::RelativeEncoder;
use crate::timer::Timer;

#[derive(Debug)]
pub struct Mileage {
    timer: Timer,
    period_ms: u32,
    steps_per_mm: u32,
    left: RelativeEncoder,
    right: RelativeEncoder,
    steps_left: u32,
    steps_right: u32,
}

impl Mileage {
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        robot: &RobotCfg,
        cfg: &MileageCfg,
        encoders: &dyn Encoders,
    ) -> Self {
        Self {
            timer: Timer::new(clock),
            period_ms: cfg.period_ms,
            steps_per_mm: robot.steps_per_mm.max(1),
            left: RelativeEncoder::new(encoders.counts_left()),
            right: RelativeEncoder::new(encoders.counts_right()),
            steps_left: 0,
            steps_right: 0,
        }
    }

    /// Zero the accumulators and rebase on the current counters.
    pub fn clear(&mut self, encoders: &dyn Encoders) {
        self.steps_left = 0;
        self.steps_right = 0;
        self.left.set_reference(encoders.counts_left());
        self.right.set_reference(encoders.counts_right());
        self.timer.stop();
    }

    /// Accumulate travelled steps once per period. Call once per tick.
    pub fn process(&mut self, encoders: &dyn Encoders) {
        if !self.timer.is_running() {
            self.timer.start(self.period_ms);
        } else if self.timer.is_timeout() {
            let counts_left = encoders.counts_left();
            let counts_right = encoders.counts_right();

            let delta_left = self.left.calculate(counts_left).unsigned_abs();
            let delta_right = self.right.calculate(counts_right).unsigned_abs();

            self.steps_left = self.steps_left.saturating_add(u32::from(delta_left));
            self.steps_right = self.steps_right.saturating_add(u32::from(delta_right));

            self.left.set_reference(counts_left);
            self.right.set_reference(counts_right);
            self.timer.restart();
        }
    }

    /// Mean travelled distance of both wheels in mm.
    pub fn mileage_center(&self) -> u32 {
        let sum = u64::from(self.steps_left) + u64::from(self.steps_right);
        // Mean of two u32 fits u32.
        u32::try_from(sum / 2).unwrap_or(u32::MAX) / self.steps_per_mm
    }

    pub fn mileage_left(&self) -> u32 {
        self.steps_left / self.steps_per_mm
    }

    pub fn mileage_right(&self) -> u32 {
        self.steps_right / self.steps_per_mm
    }

    pub fn steps_left(&self) -> u32 {
        self.steps_left
    }

    pub fn steps_right(&self) -> u32 {
        self.steps_right
    }
}
