//! Cooperative state machine driving the robot's top-level behavior.
//!
//! The set of states is closed and known at compile time; `StateMachine`
//! owns one instance of each and dispatches to the current one. Transitions
//! requested during a tick (by a state's `process` or by `set_state`) are
//! performed at the start of the next `process` call: `exit` of the old
//! state, then `entry` of the new one.

use rover_traits::{Encoders, Motors};

use crate::calibration::{MotorSpeedCalibration, MotorSpeedCalibrationState};
use crate::error::RoverError;
use crate::hw_error::map_hw_error;
use crate::speedometer::Speedometer;
use crate::states::{ErrorState, ReadyState};

/// Identifies one of the robot states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    MotorSpeedCalibration,
    Ready,
    Error,
}

/// Everything a state may touch during one tick.
pub struct Context<'a> {
    pub encoders: &'a dyn Encoders,
    pub motors: &'a mut dyn Motors,
    pub speedometer: &'a Speedometer,
    /// Result of the last completed calibration, if any.
    pub calibration: &'a mut Option<MotorSpeedCalibration>,
    /// Fault that put the robot into the Error state.
    pub fault: &'a mut Option<RoverError>,
}

impl Context<'_> {
    /// Command both motors, mapping HAL failures to `RoverError`.
    pub fn set_speeds(&mut self, left: i16, right: i16) -> Result<(), RoverError> {
        self.motors
            .set_speeds(left, right)
            .map_err(|e| map_hw_error(e.as_ref()))
    }

    /// Stop both motors.
    pub fn stop_motors(&mut self) -> Result<(), RoverError> {
        self.set_speeds(0, 0)
    }

    /// Record `fault` unless an earlier one is already pending.
    pub fn record_fault(&mut self, fault: RoverError) {
        if self.fault.is_none() {
            *self.fault = Some(fault);
        }
    }
}

/// Lifecycle hooks of a single state.
pub trait State {
    fn entry(&mut self, ctx: &mut Context<'_>);
    /// Runs once per tick while the state is current; may request a transition.
    fn process(&mut self, ctx: &mut Context<'_>) -> Option<StateId>;
    fn exit(&mut self, ctx: &mut Context<'_>);
}

#[derive(Debug)]
pub struct StateMachine {
    current: Option<StateId>,
    next: Option<StateId>,
    calibration: MotorSpeedCalibrationState,
    ready: ReadyState,
    error: ErrorState,
}

impl StateMachine {
    pub fn new(calibration: MotorSpeedCalibrationState) -> Self {
        Self {
            current: None,
            next: None,
            calibration,
            ready: ReadyState::default(),
            error: ErrorState::default(),
        }
    }

    /// Request a transition; it takes effect on the next `process`.
    ///
    /// Requesting the current state re-enters it.
    pub fn set_state(&mut self, id: StateId) {
        self.next = Some(id);
    }

    /// Active state, `None` before the first transition.
    pub fn state(&self) -> Option<StateId> {
        self.current
    }

    /// Transition requested but not yet performed.
    pub fn pending(&self) -> Option<StateId> {
        self.next
    }

    pub fn calibration_state(&self) -> &MotorSpeedCalibrationState {
        &self.calibration
    }

    pub fn process(&mut self, ctx: &mut Context<'_>) {
        if let Some(next) = self.next.take() {
            if let Some(current) = self.current {
                self.state_mut(current).exit(ctx);
            }
            tracing::info!(from = ?self.current, to = ?next, "state transition");
            self.current = Some(next);
            self.state_mut(next).entry(ctx);
        }

        if let Some(current) = self.current {
            if let Some(next) = self.state_mut(current).process(ctx) {
                self.next = Some(next);
            }
        }
    }

    fn state_mut(&mut self, id: StateId) -> &mut dyn State {
        match id {
            StateId::MotorSpeedCalibration => &mut self.calibration,
            StateId::Ready => &mut self.ready,
            StateId::Error => &mut self.error,
        }
    }
}
