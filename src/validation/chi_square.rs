//! Monte Carlo chi-square check of an inverse covariance.
//!
//! For a field `T ~ N(0, C)` over N pixels, `Tᵗ·C⁻¹·T` is χ²-distributed with
//! N degrees of freedom. Averaging it over many realizations therefore
//! recovers N when the inverse is right and drifts away when it is not.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{ensure_dimension, ensure_ordering, CovarianceError, Result};
use crate::inversion::InverseCovarianceMatrix;
use crate::result::ChiSquareSummary;
use crate::sky::PixelSet;
use crate::thread_pool;
use crate::types::{UnitScale, Vector};

use super::generator::FieldGenerator;
use super::moments::RunningMoments;
use super::seed::trial_rng;

/// Trials per partial accumulator when summarising samples.
const MOMENT_CHUNK: usize = 1024;

/// Means further than this many standard errors from N are logged as suspect.
const SUSPECT_Z: f64 = 5.0;

/// Chi-square values from one validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareSamples {
    values: Vec<f64>,
    degrees_of_freedom: usize,
    seed: u64,
}

impl ChiSquareSamples {
    /// One value per trial, in trial order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of pixels in the validated covariance.
    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    /// Base seed the per-trial RNGs were derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample mean of the chi-square values.
    pub fn mean(&self) -> f64 {
        self.moments().mean()
    }

    /// Mean, spread and z-score against the expected N.
    pub fn summary(&self) -> ChiSquareSummary {
        let moments = self.moments();
        let std_error = moments.std_error();
        let z_score = (moments.mean() - self.degrees_of_freedom as f64) / std_error;
        ChiSquareSummary {
            trials: moments.count(),
            degrees_of_freedom: self.degrees_of_freedom,
            mean: moments.mean(),
            variance: moments.variance(),
            std_error,
            z_score,
            seed: self.seed,
        }
    }

    fn moments(&self) -> RunningMoments {
        self.values
            .chunks(MOMENT_CHUNK)
            .map(RunningMoments::from_slice)
            .fold(RunningMoments::new(), |mut acc, chunk| {
                acc.merge(&chunk);
                acc
            })
    }
}

/// Configurable chi-square validator.
///
/// ```ignore
/// let samples = ChiSquareValidator::new(2000)
///     .seed(42)
///     .unit_scale(UnitScale::MicroKelvin)
///     .validate(&inverse, &pixels, &generator)?;
/// println!("mean chi2 = {:.2} (expect {})", samples.mean(), pixels.len());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChiSquareValidator {
    trials: usize,
    seed: Option<u64>,
    unit_scale: UnitScale,
}

impl ChiSquareValidator {
    /// Validator running `trials` realizations in Kelvin units.
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            seed: None,
            unit_scale: UnitScale::Kelvin,
        }
    }

    /// Fix the base seed. Without one a random seed is drawn per run.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Like [`seed`](Self::seed), but accepts an optional value.
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Units the inverse was built in.
    pub fn unit_scale(mut self, unit_scale: UnitScale) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    /// Run the trials.
    ///
    /// # Errors
    ///
    /// - `Validation` if `trials` is zero.
    /// - `DimensionMismatch` if the inverse does not match the pixel set, or
    ///   the generator's universe or realizations have the wrong size.
    /// - `OrderingMismatch` if inverse, pixels and generator disagree on the
    ///   pixel numbering scheme.
    pub fn validate<G>(
        &self,
        inverse: &InverseCovarianceMatrix,
        pixels: &PixelSet,
        generator: &G,
    ) -> Result<ChiSquareSamples>
    where
        G: FieldGenerator + ?Sized,
    {
        if self.trials == 0 {
            return Err(CovarianceError::validation("chi-square validation needs at least one trial"));
        }
        ensure_dimension("chi-square inverse", pixels.len(), inverse.dim())?;
        ensure_ordering("chi-square inverse", pixels.ordering(), inverse.ordering())?;
        ensure_ordering("chi-square generator", pixels.ordering(), generator.ordering())?;
        ensure_dimension("chi-square generator universe", pixels.universe_size(), generator.universe_size())?;

        let seed = self.seed.unwrap_or_else(rand::random);
        let factor = self.unit_scale.field_factor();
        let inv = inverse.as_matrix();

        tracing::debug!(
            trials = self.trials,
            pixels = pixels.len(),
            seed,
            "running chi-square validation"
        );

        let run_trial = |trial: usize| -> Result<f64> {
            let mut rng = trial_rng(seed, trial);
            let map = generator.realize(&mut rng);
            ensure_dimension("chi-square realization", pixels.universe_size(), map.len())?;
            let t = Vector::from_vec(pixels.restrict(&map)?) * factor;
            Ok(t.dot(&(inv * &t)))
        };

        #[cfg(feature = "parallel")]
        let values = thread_pool::install(|| {
            (0..self.trials)
                .into_par_iter()
                .map(run_trial)
                .collect::<Result<Vec<f64>>>()
        })?;

        #[cfg(not(feature = "parallel"))]
        let values = thread_pool::install(|| (0..self.trials).map(run_trial).collect::<Result<Vec<f64>>>())?;

        let samples = ChiSquareSamples {
            values,
            degrees_of_freedom: pixels.len(),
            seed,
        };

        let summary = samples.summary();
        tracing::debug!(
            mean = summary.mean,
            expected = summary.degrees_of_freedom,
            z = summary.z_score,
            "chi-square validation complete"
        );
        if summary.z_score.abs() > SUSPECT_Z {
            tracing::warn!(
                mean = summary.mean,
                expected = summary.degrees_of_freedom,
                z = summary.z_score,
                "chi-square mean is far from the pixel count; the inverse may be wrong"
            );
        }

        Ok(samples)
    }
}

/// Run `trials` chi-square realizations with a random seed.
///
/// See [`ChiSquareValidator::validate`] for the error conditions.
pub fn validate<G>(
    inverse: &InverseCovarianceMatrix,
    pixels: &PixelSet,
    generator: &G,
    trials: usize,
    unit_scale: UnitScale,
) -> Result<ChiSquareSamples>
where
    G: FieldGenerator + ?Sized,
{
    ChiSquareValidator::new(trials)
        .unit_scale(unit_scale)
        .validate(inverse, pixels, generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::CovarianceMatrix;
    use crate::inversion::{invert, InversionStrategy};
    use crate::types::{Matrix, PixelOrdering};
    use crate::validation::generator::{CorrelatedFieldGenerator, WhiteNoiseGenerator};

    fn identity_inverse(n: usize) -> InverseCovarianceMatrix {
        InverseCovarianceMatrix::from_matrix(Matrix::identity(n, n), PixelOrdering::Ring).unwrap()
    }

    fn all_pixels(n: usize) -> PixelSet {
        PixelSet::from_indices((0..n).collect(), n, PixelOrdering::Ring).unwrap()
    }

    #[test]
    fn test_identity_white_noise_mean() {
        let samples = ChiSquareValidator::new(5000)
            .seed(2024)
            .validate(
                &identity_inverse(3),
                &all_pixels(3),
                &WhiteNoiseGenerator::new(3, PixelOrdering::Ring),
            )
            .unwrap();
        assert_eq!(samples.values().len(), 5000);
        assert_eq!(samples.degrees_of_freedom(), 3);
        assert!((samples.mean() - 3.0).abs() < 0.15, "mean {}", samples.mean());
    }

    #[test]
    fn test_seed_reproducible() {
        let generator = WhiteNoiseGenerator::new(4, PixelOrdering::Ring);
        let run = || {
            ChiSquareValidator::new(50)
                .seed(9)
                .validate(&identity_inverse(4), &all_pixels(4), &generator)
                .unwrap()
        };
        assert_eq!(run(), run());
        assert_eq!(run().seed(), 9);
    }

    #[test]
    fn test_subset_of_universe() {
        // Two of five pixels, unit variance: chi-square over 2 dof.
        let pixels = PixelSet::from_indices(vec![1, 4], 5, PixelOrdering::Ring).unwrap();
        let samples = ChiSquareValidator::new(4000)
            .seed(5)
            .validate(
                &identity_inverse(2),
                &pixels,
                &WhiteNoiseGenerator::new(5, PixelOrdering::Ring),
            )
            .unwrap();
        let summary = samples.summary();
        assert!(summary.z_score.abs() < 5.0, "{summary:?}");
    }

    #[test]
    fn test_correlated_field_round_trip() {
        let n = 6;
        let pixels = PixelSet::from_indices(vec![0, 2, 3, 5, 7, 8], 10, PixelOrdering::Nested).unwrap();
        let data = Matrix::from_fn(n, n, |i, j| 0.6_f64.powi((i as i32 - j as i32).abs()));
        let cov = CovarianceMatrix::from_symmetric(data, PixelOrdering::Nested).unwrap();
        let generator = CorrelatedFieldGenerator::new(&cov, &pixels).unwrap();
        let inverse = invert(&cov, InversionStrategy::Cholesky).unwrap();

        let summary = ChiSquareValidator::new(3000)
            .seed(77)
            .validate(&inverse, &pixels, &generator)
            .unwrap()
            .summary();
        assert_eq!(summary.degrees_of_freedom, n);
        assert!(summary.is_consistent(5.0), "{summary:?}");
    }

    #[test]
    fn test_wrong_inverse_is_detected() {
        let n = 4;
        let pixels = all_pixels(n);
        let generator = WhiteNoiseGenerator::new(n, PixelOrdering::Ring).sigma(2.0);
        // Identity is the inverse of unit variance, not of variance 4.
        let summary = ChiSquareValidator::new(2000)
            .seed(3)
            .validate(&identity_inverse(n), &pixels, &generator)
            .unwrap()
            .summary();
        assert!(!summary.is_consistent(5.0));
        assert!((summary.mean - 16.0).abs() < 1.0);
    }

    #[test]
    fn test_micro_kelvin_rescale() {
        let pixels = all_pixels(3);
        // Covariance in µK², realizations in K.
        let inverse = InverseCovarianceMatrix::from_matrix(Matrix::identity(3, 3) * 1e-12, PixelOrdering::Ring).unwrap();
        let samples = ChiSquareValidator::new(3000)
            .seed(1)
            .unit_scale(UnitScale::MicroKelvin)
            .validate(&inverse, &pixels, &WhiteNoiseGenerator::new(3, PixelOrdering::Ring))
            .unwrap();
        assert!((samples.mean() - 3.0).abs() < 0.2, "mean {}", samples.mean());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let generator = WhiteNoiseGenerator::new(3, PixelOrdering::Ring);

        let err = ChiSquareValidator::new(0)
            .validate(&identity_inverse(3), &all_pixels(3), &generator)
            .unwrap_err();
        assert!(err.is_validation());

        assert!(matches!(
            validate(&identity_inverse(2), &all_pixels(3), &generator, 10, UnitScale::Kelvin),
            Err(CovarianceError::DimensionMismatch { .. })
        ));

        let nested = WhiteNoiseGenerator::new(3, PixelOrdering::Nested);
        let err = validate(&identity_inverse(3), &all_pixels(3), &nested, 10, UnitScale::Kelvin).unwrap_err();
        assert!(err.is_validation());

        let small = WhiteNoiseGenerator::new(2, PixelOrdering::Ring);
        assert!(matches!(
            validate(&identity_inverse(3), &all_pixels(3), &small, 10, UnitScale::Kelvin),
            Err(CovarianceError::DimensionMismatch { .. })
        ));
    }
}
