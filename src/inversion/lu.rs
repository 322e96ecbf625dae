//! General LU inversion.

use super::{InversionStrategy, Inverter};
use crate::error::{CovarianceError, Result};
use crate::types::Matrix;

/// Partial-pivot LU inversion that ignores symmetry.
///
/// Kept as a baseline; it is the least stable choice for ill-conditioned
/// covariance matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuInverter;

impl Inverter for LuInverter {
    fn strategy(&self) -> InversionStrategy {
        InversionStrategy::Lu
    }

    fn invert_matrix(&self, matrix: &Matrix) -> Result<Matrix> {
        matrix
            .clone()
            .lu()
            .try_inverse()
            .ok_or_else(|| CovarianceError::singular("LU factorisation has a zero pivot"))
    }
}
