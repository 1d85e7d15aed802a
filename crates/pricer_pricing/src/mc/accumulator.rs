//! Lossless payoff accumulation for parallel Monte Carlo.
//!
//! Each rayon worker folds payoffs into its own [`PayoffAccumulator`]; the
//! partial accumulators are then merged with an associative reduce. Sums use
//! Neumaier compensation so the result does not depend on how paths were
//! split across workers beyond the last few ulps.
//!
//! # Example
//!
//! ```rust
//! use pricer_pricing::mc::PayoffAccumulator;
//! use rayon::prelude::*;
//!
//! let total = (0..10_000usize)
//!     .into_par_iter()
//!     .fold(PayoffAccumulator::new, |mut acc, i| {
//!         acc.add((i % 7) as f64);
//!         acc
//!     })
//!     .reduce(PayoffAccumulator::new, PayoffAccumulator::merged);
//!
//! assert_eq!(total.count(), 10_000);
//! ```

/// Compensated running sum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    #[inline]
    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    #[inline]
    fn merge(&mut self, other: &Self) {
        self.add(other.sum);
        self.compensation += other.compensation;
    }

    #[inline]
    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Per-worker payoff accumulator.
///
/// Tracks the compensated sum of payoffs, the compensated sum of squares
/// (for the standard error) and the number of paths.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::PayoffAccumulator;
///
/// let mut acc = PayoffAccumulator::new();
/// acc.add(1.0);
/// acc.add(3.0);
///
/// assert_eq!(acc.count(), 2);
/// assert_eq!(acc.sum(), 4.0);
/// assert_eq!(acc.mean(), 2.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PayoffAccumulator {
    sum: NeumaierSum,
    sum_sq: NeumaierSum,
    count: usize,
}

impl PayoffAccumulator {
    /// Creates an empty accumulator.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one path payoff.
    #[inline]
    pub fn add(&mut self, value: f64) {
        self.sum.add(value);
        self.sum_sq.add(value * value);
        self.count += 1;
    }

    /// Adds another accumulator into this one.
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        self.sum.merge(&other.sum);
        self.sum_sq.merge(&other.sum_sq);
        self.count += other.count;
    }

    /// By-value merge, shaped for `rayon`'s `reduce`.
    #[inline]
    pub fn merged(mut self, other: Self) -> Self {
        self.merge(&other);
        self
    }

    /// Number of paths accumulated.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Compensated sum of payoffs.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum.value()
    }

    /// Compensated sum of squared payoffs.
    #[inline]
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_sq.value()
    }

    /// Sample mean; 0 when empty.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum() / self.count as f64
        }
    }

    /// Unbiased sample variance; 0 with fewer than two paths.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.mean();
        ((self.sum_of_squares() - n * mean * mean) / (n - 1.0)).max(0.0)
    }

    /// Standard error of the mean.
    #[inline]
    pub fn std_error(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.variance() / self.count as f64).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    // ========================================
    // Basic Accumulation
    // ========================================

    #[test]
    fn test_empty() {
        let acc = PayoffAccumulator::new();
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.sum(), 0.0);
        assert_eq!(acc.mean(), 0.0);
        assert_eq!(acc.std_error(), 0.0);
    }

    #[test]
    fn test_statistics() {
        let mut acc = PayoffAccumulator::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.add(v);
        }
        assert_eq!(acc.mean(), 5.0);
        assert_relative_eq!(acc.variance(), 32.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(acc.std_error(), (32.0 / 7.0 / 8.0_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_compensation_recovers_small_terms() {
        let mut acc = PayoffAccumulator::new();
        acc.add(1e16);
        for _ in 0..1000 {
            acc.add(1.0);
        }
        acc.add(-1e16);
        assert_eq!(acc.sum(), 1000.0);
    }

    // ========================================
    // Merging
    // ========================================

    #[test]
    fn test_merge_equals_sequential() {
        let values: Vec<f64> = (0..1000).map(|i| ((i * 37) % 101) as f64 * 0.173).collect();

        let mut whole = PayoffAccumulator::new();
        values.iter().for_each(|&v| whole.add(v));

        let mut left = PayoffAccumulator::new();
        let mut right = PayoffAccumulator::new();
        values[..313].iter().for_each(|&v| left.add(v));
        values[313..].iter().for_each(|&v| right.add(v));

        let merged = left.merged(right);
        assert_eq!(merged.count(), whole.count());
        assert_relative_eq!(merged.sum(), whole.sum(), max_relative = 1e-15);
        assert_relative_eq!(
            merged.sum_of_squares(),
            whole.sum_of_squares(),
            max_relative = 1e-15
        );
    }

    proptest! {
        #[test]
        fn prop_split_invariant(
            values in prop::collection::vec(0.0f64..1e4, 1..500),
            split in 0usize..500,
        ) {
            let split = split.min(values.len());
            let mut whole = PayoffAccumulator::new();
            values.iter().for_each(|&v| whole.add(v));

            let mut a = PayoffAccumulator::new();
            let mut b = PayoffAccumulator::new();
            values[..split].iter().for_each(|&v| a.add(v));
            values[split..].iter().for_each(|&v| b.add(v));

            let merged = b.merged(a);
            prop_assert_eq!(merged.count(), values.len());
            let scale = whole.sum().abs().max(1.0);
            prop_assert!((merged.sum() - whole.sum()).abs() <= 1e-13 * scale);
        }
    }
}
