//! Configuration for covariance construction and validation.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BEAM_FWHM_ARCMIN, SMOOTHED_LMAX};
use crate::covariance::CovarianceBuilder;
use crate::error::{CovarianceError, Result};
use crate::inversion::InversionStrategy;
use crate::spectrum::{arcmin_to_rad, gaussian_beam, FilterKernel};
use crate::types::{PixelOrdering, UnitScale};

/// Configuration options for [`CovariancePipeline`](crate::CovariancePipeline).
///
/// Missing fields take their [`Default`] values when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowest multipole kept in the series (default: 0).
    pub highpass: usize,

    /// Series truncation when no smoothing is active (default: 2000).
    pub lmax: usize,

    /// Apply a Gaussian beam of [`beam_fwhm_arcmin`](Self::beam_fwhm_arcmin)
    /// (default: true). Forces lmax to 250.
    pub beam_smooth: bool,

    /// Apply the caller-supplied pixel-window response (default: false).
    /// Forces lmax to 250.
    pub pix_win: bool,

    /// Units of the spectrum, covariance and validation fields
    /// (default: Kelvin).
    pub unit_scale: UnitScale,

    /// Pixel numbering scheme of masks and coordinates (default: Ring).
    pub ordering: PixelOrdering,

    /// Inversion algorithm (default: Cholesky).
    pub inversion: InversionStrategy,

    /// Chi-square realizations per validation run (default: 1000).
    pub trials: usize,

    /// Beam full width at half maximum in arcminutes (default: 120).
    pub beam_fwhm_arcmin: f64,

    /// Remove the monopole from the built covariance (default: false).
    pub mean_correction: bool,

    /// Optional deterministic seed for validation.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            highpass: 0,
            lmax: 2000,
            beam_smooth: true,
            pix_win: false,
            unit_scale: UnitScale::Kelvin,
            ordering: PixelOrdering::Ring,
            inversion: InversionStrategy::Cholesky,
            trials: 1000,
            beam_fwhm_arcmin: DEFAULT_BEAM_FWHM_ARCMIN,
            mean_correction: false,
            seed: None,
        }
    }
}

impl Config {
    /// Small unsmoothed series and few trials, for tests and quick checks.
    pub fn quick() -> Self {
        Self {
            lmax: 64,
            beam_smooth: false,
            trials: 200,
            ..Self::default()
        }
    }

    /// Covariance builder carrying this configuration's series settings.
    pub fn builder(&self) -> CovarianceBuilder {
        CovarianceBuilder::new(self.lmax)
            .highpass(self.highpass)
            .unit_scale(self.unit_scale)
    }

    /// Smoothing kernel implied by `beam_smooth` and `pix_win`.
    ///
    /// # Errors
    ///
    /// `Validation` if `pix_win` is set but no pixel-window table was
    /// supplied, or the beam width is not a positive finite number.
    pub fn filter_kernel(&self, pixel_window: Option<&[f64]>) -> Result<FilterKernel> {
        let mut kernel = FilterKernel::identity();
        if self.beam_smooth {
            if !(self.beam_fwhm_arcmin.is_finite() && self.beam_fwhm_arcmin > 0.0) {
                return Err(CovarianceError::validation(format!(
                    "beam FWHM must be positive, got {} arcmin",
                    self.beam_fwhm_arcmin
                )));
            }
            kernel = kernel.with_beam(gaussian_beam(arcmin_to_rad(self.beam_fwhm_arcmin), SMOOTHED_LMAX));
        }
        if self.pix_win {
            let window = pixel_window
                .ok_or_else(|| CovarianceError::validation("pixel window requested but no table supplied"))?;
            kernel = kernel.with_pixel_window(window.to_vec());
        }
        Ok(kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kernel_is_beam_only() {
        let kernel = Config::default().filter_kernel(None).unwrap();
        assert!(kernel.beam().is_some());
        assert!(kernel.pixel_window().is_none());
        assert_eq!(kernel.beam().map(<[f64]>::len), Some(SMOOTHED_LMAX + 1));
    }

    #[test]
    fn test_pixel_window_required() {
        let config = Config {
            pix_win: true,
            ..Config::quick()
        };
        assert!(config.filter_kernel(None).unwrap_err().is_validation());
        let kernel = config.filter_kernel(Some(&[1.0; 300])).unwrap();
        assert!(kernel.is_smoothing());
    }

    #[test]
    fn test_quick_is_unsmoothed() {
        let config = Config::quick();
        let kernel = config.filter_kernel(None).unwrap();
        assert!(!kernel.is_smoothing());
        assert_eq!(config.builder().effective_lmax(&kernel), 64);
    }

    #[test]
    fn test_bad_beam_width() {
        let config = Config {
            beam_fwhm_arcmin: 0.0,
            ..Config::default()
        };
        assert!(config.filter_kernel(None).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"highpass": 12, "unit_scale": "MicroKelvin", "inversion": "EigenDecomposition"}"#).unwrap();
        assert_eq!(config.highpass, 12);
        assert_eq!(config.unit_scale, UnitScale::MicroKelvin);
        assert_eq!(config.inversion, InversionStrategy::Eigen);
        assert_eq!(config.lmax, 2000);
        assert!(config.beam_smooth);
    }
}
