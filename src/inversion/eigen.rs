//! Inversion through the symmetric eigen-decomposition.

use nalgebra::SymmetricEigen;

use super::{InversionStrategy, Inverter};
use crate::error::{CovarianceError, Result};
use crate::types::Matrix;

/// `C = V·Λ·Vᵗ`, then `C⁻¹ = V·Λ⁻¹·Vᵗ`.
///
/// Slower than Cholesky but tolerates indefinite input, and a negligible
/// eigenvalue is reported instead of silently amplified.
#[derive(Debug, Clone, Copy, Default)]
pub struct EigenInverter;

impl EigenInverter {
    /// Eigenvalues with `|λ| <= n·ε·max|λ|` are treated as zero.
    pub fn singular_threshold(eigenvalues: &[f64]) -> f64 {
        let max_abs = eigenvalues.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        eigenvalues.len() as f64 * f64::EPSILON * max_abs
    }
}

impl Inverter for EigenInverter {
    fn strategy(&self) -> InversionStrategy {
        InversionStrategy::Eigen
    }

    fn invert_matrix(&self, matrix: &Matrix) -> Result<Matrix> {
        let eigen = SymmetricEigen::new(matrix.clone());
        let values = eigen.eigenvalues.as_slice();
        let threshold = Self::singular_threshold(values);

        if let Some((k, &lambda)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| v.abs() <= threshold || !v.is_finite())
        {
            return Err(CovarianceError::singular(format!(
                "eigenvalue {k} is {lambda:e} (threshold {threshold:e})"
            )));
        }

        let min_abs = values.iter().fold(f64::INFINITY, |m, v| m.min(v.abs()));
        let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        tracing::debug!(condition = max_abs / min_abs, "eigen-decomposition complete");

        let inv_values = eigen.eigenvalues.map(|v| 1.0 / v);
        let vectors = &eigen.eigenvectors;
        Ok(vectors * Matrix::from_diagonal(&inv_values) * vectors.transpose())
    }
}
