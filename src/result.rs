//! Validation result types.

use serde::{Deserialize, Serialize};

use crate::inversion::InversionStrategy;

/// Summary statistics of a chi-square validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareSummary {
    /// Number of realizations.
    pub trials: usize,

    /// Number of pixels; the expected mean of χ².
    pub degrees_of_freedom: usize,

    /// Sample mean of `Tᵗ·C⁻¹·T`.
    pub mean: f64,

    /// Unbiased sample variance (expected `2·N` for a correct inverse).
    pub variance: f64,

    /// Standard error of the mean.
    pub std_error: f64,

    /// `(mean − N) / std_error`.
    pub z_score: f64,

    /// Base seed of the run.
    pub seed: u64,
}

impl ChiSquareSummary {
    /// Whether the mean lies within `sigmas` standard errors of N.
    ///
    /// Always false when the z-score is undefined (fewer than two trials).
    pub fn is_consistent(&self, sigmas: f64) -> bool {
        self.z_score.is_finite() && self.z_score.abs() <= sigmas
    }

    /// Coarse classification of the z-score.
    pub fn verdict(&self) -> Verdict {
        Verdict::from_z_score(self.z_score)
    }
}

/// How well the chi-square mean matches the pixel count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    /// Within 3 standard errors.
    Consistent,
    /// Between 3 and 5 standard errors; rerun with more trials.
    Marginal,
    /// Beyond 5 standard errors; the inverse is likely wrong.
    Inconsistent,
    /// Too few trials to tell.
    Undetermined,
}

impl Verdict {
    /// Classify a z-score.
    pub fn from_z_score(z: f64) -> Self {
        if !z.is_finite() {
            return Verdict::Undetermined;
        }
        let z = z.abs();
        if z <= 3.0 {
            Verdict::Consistent
        } else if z <= 5.0 {
            Verdict::Marginal
        } else {
            Verdict::Inconsistent
        }
    }
}

/// Validation outcome for one catalog case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareReport {
    /// Case identifier.
    pub case: String,

    /// Strategy that produced the inverse; `None` when it was loaded.
    pub strategy: Option<InversionStrategy>,

    /// Chi-square statistics.
    pub summary: ChiSquareSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(z_score: f64) -> ChiSquareSummary {
        ChiSquareSummary {
            trials: 100,
            degrees_of_freedom: 10,
            mean: 10.0 + z_score * 0.5,
            variance: 20.0,
            std_error: 0.5,
            z_score,
            seed: 1,
        }
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(summary(0.5).verdict(), Verdict::Consistent);
        assert_eq!(summary(-3.0).verdict(), Verdict::Consistent);
        assert_eq!(summary(4.0).verdict(), Verdict::Marginal);
        assert_eq!(summary(-7.5).verdict(), Verdict::Inconsistent);
        assert_eq!(summary(f64::NAN).verdict(), Verdict::Undetermined);
    }

    #[test]
    fn test_is_consistent() {
        assert!(summary(2.0).is_consistent(3.0));
        assert!(!summary(3.5).is_consistent(3.0));
        assert!(!summary(f64::NAN).is_consistent(100.0));
    }
}
