//! Running mean and variance of chi-square samples.

/// Online mean/variance accumulator using Welford's algorithm.
///
/// Partial accumulators combine with Chan's parallel update, so chunks of
/// trials can be summarised independently and merged in order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    n: usize,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate every value of a slice.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut acc = Self::new();
        for &v in values {
            acc.update(v);
        }
        acc
    }

    /// Add one observation.
    ///
    /// ```text
    /// δ = x − μₙ₋₁
    /// μₙ = μₙ₋₁ + δ/n
    /// M2ₙ = M2ₙ₋₁ + δ·(x − μₙ)
    /// ```
    pub fn update(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Fold another accumulator into this one.
    ///
    /// ```text
    /// δ = μ_B − μ_A
    /// μ_AB = μ_A + δ·n_B/n_AB
    /// M2_AB = M2_A + M2_B + δ²·n_A·n_B/n_AB
    /// ```
    pub fn merge(&mut self, other: &Self) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = *other;
            return;
        }
        let n_a = self.n as f64;
        let n_b = other.n as f64;
        let n_ab = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n_ab;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n_ab;
        self.n += other.n;
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.n
    }

    /// Sample mean (NaN when empty).
    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Unbiased sample variance (NaN for fewer than two observations).
    pub fn variance(&self) -> f64 {
        if self.n < 2 {
            f64::NAN
        } else {
            self.m2 / (self.n - 1) as f64
        }
    }

    /// Standard error of the mean.
    pub fn std_error(&self) -> f64 {
        (self.variance() / self.n as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_batch_formulas() {
        let values: Vec<f64> = (0..100).map(|i| ((i * 7 + 3) % 17) as f64 * 0.5).collect();
        let acc = RunningMoments::from_slice(&values);

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        assert_eq!(acc.count(), 100);
        assert!((acc.mean() - mean).abs() < 1e-12);
        assert!((acc.variance() - var).abs() < 1e-10);
    }

    #[test]
    fn test_merge_equals_combined() {
        let a: Vec<f64> = (0..37).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..63).map(|i| 100.0 - i as f64 * 1.5).collect();

        let mut merged = RunningMoments::from_slice(&a);
        merged.merge(&RunningMoments::from_slice(&b));

        let all: Vec<f64> = a.iter().chain(&b).copied().collect();
        let combined = RunningMoments::from_slice(&all);

        assert_eq!(merged.count(), combined.count());
        assert!((merged.mean() - combined.mean()).abs() < 1e-10);
        assert!((merged.variance() - combined.variance()).abs() < 1e-8);
    }

    #[test]
    fn test_edge_cases() {
        let empty = RunningMoments::new();
        assert!(empty.mean().is_nan());
        assert!(empty.variance().is_nan());

        let mut one = RunningMoments::new();
        one.update(4.0);
        assert_eq!(one.mean(), 4.0);
        assert!(one.variance().is_nan());

        let mut merged = RunningMoments::new();
        merged.merge(&one);
        assert_eq!(merged, one);
        merged.merge(&RunningMoments::new());
        assert_eq!(merged, one);
    }
}
