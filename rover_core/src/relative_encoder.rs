//! Wraparound-safe delta between a stored reference and a fresh counter read.

/// Relative view on a free-running 16-bit encoder counter.
///
/// The delta is `current - reference` in two's-complement 16-bit arithmetic,
/// so it is exact as long as the wheel moved less than half the counter range
/// (16384 steps) since the last rebase. Larger movements alias; that is
/// inherent to the counter width and not detected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelativeEncoder {
    reference: i16,
}

impl RelativeEncoder {
    pub fn new(reference: i16) -> Self {
        Self { reference }
    }

    /// Use `steps` (absolute counter value) as the new reference point.
    pub fn set_reference(&mut self, steps: i16) {
        self.reference = steps;
    }

    pub fn reference(&self) -> i16 {
        self.reference
    }

    /// Steps moved from the reference to `steps`. Does not rebase.
    #[inline]
    pub fn calculate(&self, steps: i16) -> i16 {
        steps.wrapping_sub(self.reference)
    }
}
