//! Angular power spectra, smoothing kernels and Legendre series.

mod kernel;
mod legendre;

pub use kernel::{arcmin_to_rad, gaussian_beam, FilterKernel};
pub use legendre::{legendre_p, legendre_series};

use serde::{Deserialize, Serialize};

use crate::error::{CovarianceError, Result};

/// Angular power spectrum C_l indexed by multipole l = 0, 1, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum {
    cl: Vec<f64>,
}

impl PowerSpectrum {
    /// Wrap a spectrum table.
    ///
    /// # Errors
    ///
    /// `Validation` if any entry is negative or not finite.
    pub fn new(cl: Vec<f64>) -> Result<Self> {
        if let Some((l, v)) = cl
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(CovarianceError::validation(format!(
                "C_{l} = {v} is not a non-negative finite variance"
            )));
        }
        Ok(Self { cl })
    }

    /// Highest multipole present.
    pub fn lmax(&self) -> Option<usize> {
        self.cl.len().checked_sub(1)
    }

    /// Number of multipoles.
    pub fn len(&self) -> usize {
        self.cl.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.cl.is_empty()
    }

    /// The C_l values.
    pub fn as_slice(&self) -> &[f64] {
        &self.cl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_spectrum_rejects_negative_and_nan() {
        assert!(PowerSpectrum::new(vec![1.0, -1e-30]).unwrap_err().is_validation());
        assert!(PowerSpectrum::new(vec![f64::NAN]).is_err());
        let ps = PowerSpectrum::new(vec![0.0, 2.0, 3.0]).unwrap();
        assert_eq!(ps.lmax(), Some(2));
        assert_eq!(PowerSpectrum::new(vec![]).unwrap().lmax(), None);
    }
}
