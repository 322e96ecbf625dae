//! Covariance matrix construction from an angular power spectrum.
//!
//! For an isotropic random field the covariance of two pixels depends only on
//! their angular separation θ:
//!
//! ```text
//! C(θ) = Σ_l (2l+1)/(4π) · B_l² · W_l² · C_l · P_l(cos θ)
//! ```
//!
//! The builder evaluates this truncated Legendre series for every pixel pair.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::matrix::CovarianceMatrix;
use crate::constants::{FOUR_PI, SMOOTHED_LMAX};
use crate::error::{CovarianceError, Result};
use crate::sky::UnitVectorArray;
use crate::spectrum::{legendre_series, FilterKernel, PowerSpectrum};
use crate::thread_pool;
use crate::types::{Matrix, UnitScale};

/// Builds pixel-space covariance matrices.
///
/// # Example
///
/// ```ignore
/// use sky_covariance::{CovarianceBuilder, FilterKernel, UnitScale};
///
/// let cov = CovarianceBuilder::new(250)
///     .highpass(12)
///     .unit_scale(UnitScale::MicroKelvin)
///     .build(&unit_vectors, &spectrum, &FilterKernel::identity())?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CovarianceBuilder {
    highpass: usize,
    lmax: usize,
    unit_scale: UnitScale,
}

impl CovarianceBuilder {
    /// Builder truncating the series at `lmax`, with no highpass and Kelvin units.
    pub fn new(lmax: usize) -> Self {
        Self {
            highpass: 0,
            lmax,
            unit_scale: UnitScale::Kelvin,
        }
    }

    /// Lowest multipole kept; every l below it gets zero weight.
    pub fn highpass(mut self, highpass: usize) -> Self {
        self.highpass = highpass;
        self
    }

    /// Unit in which the output covariance is expressed.
    pub fn unit_scale(mut self, unit_scale: UnitScale) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    /// The truncation actually used with `kernel`.
    ///
    /// Any active beam or pixel window forces [`SMOOTHED_LMAX`], overriding
    /// the requested value.
    pub fn effective_lmax(&self, kernel: &FilterKernel) -> usize {
        if kernel.is_smoothing() {
            SMOOTHED_LMAX
        } else {
            self.lmax
        }
    }

    /// Per-multipole series coefficients `w_l`, l = 0..=effective lmax.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the spectrum or a kernel table is shorter than
    /// effective lmax + 1.
    pub fn weights(&self, spectrum: &PowerSpectrum, kernel: &FilterKernel) -> Result<Vec<f64>> {
        let lmax = self.effective_lmax(kernel);
        if spectrum.len() <= lmax {
            return Err(CovarianceError::DimensionMismatch {
                context: "power spectrum length",
                expected: lmax + 1,
                actual: spectrum.len(),
            });
        }
        let response = kernel.squared_response(lmax)?;
        let power_factor = self.unit_scale.power_factor();

        let weights = spectrum.as_slice()[..=lmax]
            .iter()
            .zip(&response)
            .enumerate()
            .map(|(l, (&cl, &r))| {
                if l < self.highpass {
                    0.0
                } else {
                    (2 * l + 1) as f64 / FOUR_PI * r * (cl * power_factor)
                }
            })
            .collect();
        Ok(weights)
    }

    /// Build the covariance matrix for the pixels in `geometry`.
    ///
    /// # Errors
    ///
    /// See [`weights`](Self::weights).
    pub fn build(
        &self,
        geometry: &UnitVectorArray,
        spectrum: &PowerSpectrum,
        kernel: &FilterKernel,
    ) -> Result<CovarianceMatrix> {
        let lmax = self.effective_lmax(kernel);
        if lmax != self.lmax {
            tracing::warn!(
                requested = self.lmax,
                imposed = lmax,
                "smoothing active: lmax cutoff overridden"
            );
        }
        let weights = self.weights(spectrum, kernel)?;
        let n = geometry.len();
        tracing::debug!(pixels = n, lmax, highpass = self.highpass, "building covariance matrix");

        let rows = upper_rows(geometry, &weights);

        let mut data = Matrix::zeros(n, n);
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, value) in row.into_iter().enumerate() {
                let j = i + offset;
                data[(i, j)] = value;
                data[(j, i)] = value;
            }
        }

        tracing::debug!(pixels = n, "covariance matrix complete");
        Ok(CovarianceMatrix::from_mirrored(data, geometry.ordering()))
    }
}

/// Upper-triangle rows: entry `k` of row `i` is the covariance of pixels
/// `i` and `i + k`.
fn upper_rows(geometry: &UnitVectorArray, weights: &[f64]) -> Vec<Vec<f64>> {
    let n = geometry.len();
    let row = |i: usize| -> Vec<f64> {
        tracing::trace!(row = i, of = n, "covariance row");
        (i..n)
            .map(|j| legendre_series(geometry.cos_separation(i, j), weights))
            .collect()
    };

    #[cfg(feature = "parallel")]
    {
        thread_pool::install(|| (0..n).into_par_iter().map(row).collect())
    }

    #[cfg(not(feature = "parallel"))]
    {
        thread_pool::install(|| (0..n).map(row).collect())
    }
}

/// Build a covariance matrix in one call.
///
/// Equivalent to `CovarianceBuilder::new(lmax).highpass(highpass).unit_scale(unit_scale).build(..)`.
pub fn build_covariance(
    geometry: &UnitVectorArray,
    spectrum: &PowerSpectrum,
    kernel: &FilterKernel,
    highpass: usize,
    lmax: usize,
    unit_scale: UnitScale,
) -> Result<CovarianceMatrix> {
    CovarianceBuilder::new(lmax)
        .highpass(highpass)
        .unit_scale(unit_scale)
        .build(geometry, spectrum, kernel)
}
