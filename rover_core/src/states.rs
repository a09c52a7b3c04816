//! Terminal states reached after calibration.

use crate::state_machine::{Context, State, StateId};

/// Calibrated and idle; motor commands come from the outside.
#[derive(Debug, Default)]
pub struct ReadyState {
    failed: bool,
}

impl State for ReadyState {
    fn entry(&mut self, ctx: &mut Context<'_>) {
        self.failed = false;
        if let Err(e) = ctx.stop_motors() {
            tracing::error!(error = %e, "failed to stop motors");
            ctx.record_fault(e);
            self.failed = true;
            return;
        }
        let max_motor_speed = ctx.calibration.map_or(0, |c| c.max_motor_speed());
        tracing::info!(max_motor_speed, "robot ready");
    }

    fn process(&mut self, _ctx: &mut Context<'_>) -> Option<StateId> {
        self.failed.then_some(StateId::Error)
    }

    fn exit(&mut self, _ctx: &mut Context<'_>) {}
}

/// Something went wrong; motors are held stopped until recalibration.
#[derive(Debug, Default)]
pub struct ErrorState;

impl State for ErrorState {
    fn entry(&mut self, ctx: &mut Context<'_>) {
        // Best effort: the fault may be the motor driver itself.
        if let Err(e) = ctx.stop_motors() {
            tracing::warn!(error = %e, "could not stop motors in error state");
        }
        match &*ctx.fault {
            Some(fault) => tracing::error!(fault = %fault, "robot halted"),
            None => tracing::error!("robot halted without recorded fault"),
        }
    }

    fn process(&mut self, _ctx: &mut Context<'_>) -> Option<StateId> {
        None
    }

    fn exit(&mut self, _ctx: &mut Context<'_>) {}
}
