//! Fixed-capacity running average.

/// Arithmetic needed by `MovingAverage`.
///
/// Integer implementations use wrapping arithmetic so that the running sum
/// behaves like a fixed-width accumulator of the sample type.
pub trait Sample: Copy + Default {
    fn acc_add(self, rhs: Self) -> Self;
    fn acc_sub(self, rhs: Self) -> Self;
    /// Divide by a sample count (1..=N).
    fn div_count(self, count: usize) -> Self;
}

macro_rules! int_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline]
            fn acc_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            #[inline]
            fn acc_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            #[inline]
            fn div_count(self, count: usize) -> Self {
                // A window longer than the sample type can count averages to 0.
                <$t>::try_from(count).map_or(0, |n| self / n)
            }
        }
    )*};
}

macro_rules! float_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline]
            fn acc_add(self, rhs: Self) -> Self {
                self + rhs
            }
            #[inline]
            fn acc_sub(self, rhs: Self) -> Self {
                self - rhs
            }
            #[inline]
            #[allow(clippy::cast_precision_loss)]
            fn div_count(self, count: usize) -> Self {
                self / count as $t
            }
        }
    )*};
}

int_sample!(i8, i16, i32, i64, u8, u16, u32, u64);
float_sample!(f32, f64);

/// Running average over the last `N` samples.
///
/// Until `N` samples were written the average is taken over the samples seen
/// so far.
#[derive(Debug, Clone)]
pub struct MovingAverage<T: Sample, const N: usize> {
    values: [T; N],
    wr_idx: usize,
    written: usize,
    sum: T,
}

impl<T: Sample, const N: usize> MovingAverage<T, N> {
    const NON_EMPTY: () = assert!(N > 0, "moving average window must hold at least one sample");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            values: [T::default(); N],
            wr_idx: 0,
            written: 0,
            sum: T::default(),
        }
    }

    pub fn clear(&mut self) {
        self.values = [T::default(); N];
        self.wr_idx = 0;
        self.written = 0;
        self.sum = T::default();
    }

    /// Replace the oldest sample with `value` and return the new average.
    pub fn write(&mut self, value: T) -> T {
        let old = self.values[self.wr_idx];
        self.values[self.wr_idx] = value;
        self.wr_idx = (self.wr_idx + 1) % N;

        self.sum = self.sum.acc_sub(old).acc_add(value);
        if self.written < N {
            self.written += 1;
        }

        self.sum.div_count(self.written)
    }

    /// Current average; zero before the first write.
    pub fn result(&self) -> T {
        if self.written == 0 {
            T::default()
        } else {
            self.sum.div_count(self.written)
        }
    }

    /// Number of samples contributing to the average (saturates at `N`).
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }
}

impl<T: Sample, const N: usize> Default for MovingAverage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
