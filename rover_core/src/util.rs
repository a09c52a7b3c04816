//! Fixed-width arithmetic helpers shared by the estimators.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: i32 = 1_000;

/// Average of two i16 values with integer division truncating toward zero.
///
/// `avg2_trunc_i16(-3, 0) == -1` and `avg2_trunc_i16(3, 0) == 1`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn avg2_trunc_i16(a: i16, b: i16) -> i16 {
    // The sum of two i16 always fits i32 and its half always fits i16.
    ((i32::from(a) + i32::from(b)) / 2) as i16
}

/// Speed in steps/s from a step delta over `elapsed_ms`.
///
/// Computed in i32 and truncated into i16 like the counters it is derived
/// from. Returns `None` when no time has elapsed.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn steps_per_sec(delta: i16, elapsed_ms: u64) -> Option<i16> {
    let elapsed = i32::try_from(elapsed_ms).unwrap_or(i32::MAX);
    (i32::from(delta) * MILLIS_PER_SEC)
        .checked_div(elapsed)
        .map(|v| v as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avg2_truncates_toward_zero() {
        assert_eq!(avg2_trunc_i16(3, 0), 1);
        assert_eq!(avg2_trunc_i16(-3, 0), -1);
        assert_eq!(avg2_trunc_i16(-1, 0), 0);
        assert_eq!(avg2_trunc_i16(i16::MAX, i16::MAX), i16::MAX);
        assert_eq!(avg2_trunc_i16(i16::MIN, i16::MIN), i16::MIN);
        assert_eq!(avg2_trunc_i16(i16::MIN, i16::MAX), 0);
    }

    #[test]
    fn speed_from_delta() {
        assert_eq!(steps_per_sec(6, 2), Some(3000));
        assert_eq!(steps_per_sec(-6, 4), Some(-1500));
        assert_eq!(steps_per_sec(7, 3), Some(2333));
        assert_eq!(steps_per_sec(5, 0), None);
    }

    #[test]
    fn speed_truncates_into_i16() {
        // 100 steps in 1 ms is 100_000 steps/s, which does not fit i16.
        assert_eq!(steps_per_sec(100, 1), Some(100_000_i32 as i16));
    }
}
