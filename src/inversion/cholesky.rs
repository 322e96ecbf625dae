//! Inversion through the Cholesky factor.

use nalgebra::Cholesky;

use super::{InversionStrategy, Inverter};
use crate::error::{CovarianceError, Result};
use crate::types::Matrix;

/// `C = L·Lᵗ`, then `C⁻¹ = (L⁻¹)ᵗ·L⁻¹`.
///
/// Fastest of the three strategies, but requires a positive-definite input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CholeskyInverter;

impl Inverter for CholeskyInverter {
    fn strategy(&self) -> InversionStrategy {
        InversionStrategy::Cholesky
    }

    fn invert_matrix(&self, matrix: &Matrix) -> Result<Matrix> {
        let n = matrix.nrows();
        let chol = Cholesky::new(matrix.clone()).ok_or(CovarianceError::Decomposition)?;

        // L⁻¹ by forward substitution against the identity.
        let l_inv = chol
            .l()
            .solve_lower_triangular(&Matrix::identity(n, n))
            .ok_or(CovarianceError::Decomposition)?;

        Ok(l_inv.transpose() * l_inv)
    }
}
