//! Beam and pixel-window responses.

use serde::{Deserialize, Serialize};

use crate::error::{CovarianceError, Result};

/// Multiplicative per-multipole smoothing applied to the power spectrum.
///
/// A missing response behaves as 1 at every multipole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterKernel {
    beam: Option<Vec<f64>>,
    pixel_window: Option<Vec<f64>>,
}

impl FilterKernel {
    /// Kernel with neither beam nor pixel window.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Attach a beam response B_l.
    pub fn with_beam(mut self, beam: Vec<f64>) -> Self {
        self.beam = Some(beam);
        self
    }

    /// Attach a pixel-window response W_l.
    pub fn with_pixel_window(mut self, window: Vec<f64>) -> Self {
        self.pixel_window = Some(window);
        self
    }

    /// Whether any smoothing is active.
    pub fn is_smoothing(&self) -> bool {
        self.beam.is_some() || self.pixel_window.is_some()
    }

    /// Beam response, if any.
    pub fn beam(&self) -> Option<&[f64]> {
        self.beam.as_deref()
    }

    /// Pixel-window response, if any.
    pub fn pixel_window(&self) -> Option<&[f64]> {
        self.pixel_window.as_deref()
    }

    /// Combined factor B_l² · W_l² for l = 0..=lmax.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if a present response has fewer than lmax+1 entries.
    pub fn squared_response(&self, lmax: usize) -> Result<Vec<f64>> {
        let mut response = vec![1.0; lmax + 1];
        for (context, table) in [
            ("beam response", self.beam.as_deref()),
            ("pixel window", self.pixel_window.as_deref()),
        ] {
            if let Some(table) = table {
                if table.len() <= lmax {
                    return Err(CovarianceError::DimensionMismatch {
                        context,
                        expected: lmax + 1,
                        actual: table.len(),
                    });
                }
                for (r, &t) in response.iter_mut().zip(table) {
                    *r *= t * t;
                }
            }
        }
        Ok(response)
    }
}

/// Gaussian beam window `B_l = exp(−l(l+1)σ²/2)` for l = 0..=lmax.
///
/// `fwhm_rad` is the full width at half maximum in radians; σ = FWHM/√(8 ln 2).
pub fn gaussian_beam(fwhm_rad: f64, lmax: usize) -> Vec<f64> {
    let sigma = fwhm_rad / (8.0 * std::f64::consts::LN_2).sqrt();
    let sigma2 = sigma * sigma;
    (0..=lmax)
        .map(|l| {
            let l = l as f64;
            (-0.5 * l * (l + 1.0) * sigma2).exp()
        })
        .collect()
}

/// Convert arcminutes to radians.
pub fn arcmin_to_rad(arcmin: f64) -> f64 {
    (arcmin / 60.0).to_radians()
}
