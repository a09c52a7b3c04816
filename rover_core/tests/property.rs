use proptest::prelude::*;
use rover_core::{MovingAverage, RelativeEncoder};

proptest! {
    #[test]
    fn delta_is_twos_complement_difference(reference in any::<i16>(), current in any::<i16>()) {
        let enc = RelativeEncoder::new(reference);
        prop_assert_eq!(enc.calculate(current), current.wrapping_sub(reference));
    }

    #[test]
    fn rebased_delta_recovers_small_moves(reference in any::<i16>(), moved in -16384i16..=16383) {
        let current = reference.wrapping_add(moved);
        prop_assert_eq!(RelativeEncoder::new(reference).calculate(current), moved);
    }

    #[test]
    fn moving_average_matches_window_mean(samples in prop::collection::vec(-10_000i64..10_000, 1..64)) {
        const N: usize = 5;
        let mut avg = MovingAverage::<i64, N>::new();
        for (i, &s) in samples.iter().enumerate() {
            let got = avg.write(s);
            let start = (i + 1).saturating_sub(N);
            let window = &samples[start..=i];
            let expected = window.iter().sum::<i64>() / i64::try_from(window.len()).unwrap();
            prop_assert_eq!(got, expected);
        }
    }
}
