//! Scriptable HAL doubles for tests and benches.
//!
//! Handles are cheap clones sharing their state, so a test can keep one copy
//! while the `Robot` owns another.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rover_traits::{Encoders, Motors};

/// Encoders whose counters are set by hand.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEncoders {
    left: Rc<Cell<i16>>,
    right: Rc<Cell<i16>>,
}

impl ScriptedEncoders {
    pub fn new(left: i16, right: i16) -> Self {
        let e = Self::default();
        e.set(left, right);
        e
    }

    pub fn set(&self, left: i16, right: i16) {
        self.left.set(left);
        self.right.set(right);
    }

    /// Move both counters by the given deltas, wrapping like real hardware.
    pub fn advance(&self, left: i16, right: i16) {
        self.left.set(self.left.get().wrapping_add(left));
        self.right.set(self.right.get().wrapping_add(right));
    }
}

impl Encoders for ScriptedEncoders {
    fn counts_left(&self) -> i16 {
        self.left.get()
    }

    fn counts_right(&self) -> i16 {
        self.right.get()
    }
}

#[derive(Debug, Default)]
struct SpyState {
    left: i16,
    right: i16,
    commands: Vec<(i16, i16)>,
    fail_with: Option<String>,
}

/// Motors that record every accepted command.
#[derive(Debug, Clone)]
pub struct SpyMotors {
    max_speed: i16,
    state: Rc<RefCell<SpyState>>,
}

impl SpyMotors {
    pub fn new(max_speed: i16) -> Self {
        Self {
            max_speed,
            state: Rc::default(),
        }
    }

    /// Setpoint pairs accepted so far, oldest first.
    pub fn commands(&self) -> Vec<(i16, i16)> {
        self.state.borrow().commands.clone()
    }

    /// Fail every following command with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.state.borrow_mut().fail_with = Some(reason.into());
    }

    /// Set the reported setpoints without recording a command.
    pub fn force_speeds(&self, left: i16, right: i16) {
        let mut s = self.state.borrow_mut();
        s.left = left;
        s.right = right;
    }
}

impl Motors for SpyMotors {
    fn left_speed(&self) -> i16 {
        self.state.borrow().left
    }

    fn right_speed(&self) -> i16 {
        self.state.borrow().right
    }

    fn max_speed(&self) -> i16 {
        self.max_speed
    }

    fn set_speeds(
        &mut self,
        left: i16,
        right: i16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self.state.borrow_mut();
        if let Some(reason) = &s.fail_with {
            return Err(Box::new(std::io::Error::other(reason.clone())));
        }
        s.left = left;
        s.right = right;
        s.commands.push((left, right));
        Ok(())
    }
}
