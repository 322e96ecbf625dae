//! Random field generators.
//!
//! Synthesising skies from a power spectrum belongs to the caller; the
//! validator only needs something implementing [`FieldGenerator`]. Two
//! reference generators are provided for testing an inversion without an
//! external sky simulator.

use nalgebra::Cholesky;
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::covariance::CovarianceMatrix;
use crate::error::{ensure_dimension, ensure_ordering, CovarianceError, Result};
use crate::sky::PixelSet;
use crate::types::{Matrix, PixelOrdering, Vector};

/// Source of random field realizations over a pixel universe.
pub trait FieldGenerator: Sync {
    /// Number of pixels in each realization.
    fn universe_size(&self) -> usize;

    /// Pixel numbering scheme of the realizations.
    fn ordering(&self) -> PixelOrdering;

    /// Draw one full-universe realization.
    fn realize(&self, rng: &mut dyn RngCore) -> Vec<f64>;
}

/// Independent `N(0, σ²)` value at every pixel.
#[derive(Debug, Clone, Copy)]
pub struct WhiteNoiseGenerator {
    universe_size: usize,
    ordering: PixelOrdering,
    sigma: f64,
}

impl WhiteNoiseGenerator {
    /// Unit-variance white noise.
    pub fn new(universe_size: usize, ordering: PixelOrdering) -> Self {
        Self {
            universe_size,
            ordering,
            sigma: 1.0,
        }
    }

    /// Set the per-pixel standard deviation.
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }
}

impl FieldGenerator for WhiteNoiseGenerator {
    fn universe_size(&self) -> usize {
        self.universe_size
    }

    fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    fn realize(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        (0..self.universe_size)
            .map(|_| {
                let z: f64 = StandardNormal.sample(&mut *rng);
                self.sigma * z
            })
            .collect()
    }
}

/// Gaussian field with a given covariance on a pixel set, zero elsewhere.
///
/// Draws `T = L·z` with `C = L·Lᵗ` and `z ~ N(0, I)`.
#[derive(Debug, Clone)]
pub struct CorrelatedFieldGenerator {
    factor: Matrix,
    pixels: PixelSet,
}

impl CorrelatedFieldGenerator {
    /// Prepare a generator for `covariance` over `pixels`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` or `OrderingMismatch` if the matrix and pixel set
    /// disagree; `Decomposition` if the covariance is not positive definite.
    pub fn new(covariance: &CovarianceMatrix, pixels: &PixelSet) -> Result<Self> {
        ensure_dimension("generator covariance", pixels.len(), covariance.dim())?;
        ensure_ordering("generator covariance", pixels.ordering(), covariance.ordering())?;
        let chol = Cholesky::new(covariance.as_matrix().clone()).ok_or(CovarianceError::Decomposition)?;
        Ok(Self {
            factor: chol.l(),
            pixels: pixels.clone(),
        })
    }
}

impl FieldGenerator for CorrelatedFieldGenerator {
    fn universe_size(&self) -> usize {
        self.pixels.universe_size()
    }

    fn ordering(&self) -> PixelOrdering {
        self.pixels.ordering()
    }

    fn realize(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        let z = Vector::from_fn(self.pixels.len(), |_, _| StandardNormal.sample(&mut *rng));
        let t = &self.factor * z;
        let mut map = vec![0.0; self.pixels.universe_size()];
        for (&pixel, &value) in self.pixels.indices().iter().zip(t.iter()) {
            map[pixel] = value;
        }
        map
    }
}
