//! The symmetric covariance matrix type.

use crate::error::{CovarianceError, Result};
use crate::types::{Matrix, PixelOrdering};

/// Dense, exactly symmetric pixel-pixel covariance matrix.
///
/// The matrix is immutable once constructed; corrections and extractions
/// produce new instances. It remembers the pixel ordering it was built under.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    data: Matrix,
    ordering: PixelOrdering,
}

impl CovarianceMatrix {
    /// Wrap a matrix after checking it is square and exactly symmetric.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for a non-square matrix, `Validation` if any
    /// `C[i][j] != C[j][i]`.
    pub fn from_symmetric(data: Matrix, ordering: PixelOrdering) -> Result<Self> {
        if !data.is_square() {
            return Err(CovarianceError::DimensionMismatch {
                context: "covariance matrix columns",
                expected: data.nrows(),
                actual: data.ncols(),
            });
        }
        let n = data.nrows();
        for i in 0..n {
            for j in (i + 1)..n {
                // Bitwise comparison so NaN entries must also mirror.
                if data[(i, j)].to_bits() != data[(j, i)].to_bits() {
                    return Err(CovarianceError::validation(format!(
                        "matrix not symmetric at ({i}, {j}): {} vs {}",
                        data[(i, j)],
                        data[(j, i)]
                    )));
                }
            }
        }
        Ok(Self { data, ordering })
    }

    /// Wrap a matrix the caller built symmetric by construction.
    pub(crate) fn from_mirrored(data: Matrix, ordering: PixelOrdering) -> Self {
        debug_assert!(data.is_square());
        Self { data, ordering }
    }

    /// Number of pixels (rows = columns).
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Pixel numbering scheme.
    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    /// Borrow the underlying matrix.
    pub fn as_matrix(&self) -> &Matrix {
        &self.data
    }

    /// Take the underlying matrix.
    pub fn into_matrix(self) -> Matrix {
        self.data
    }

    /// Entry (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }
}

/// Build an `n × n` matrix from its upper triangle by mirroring.
///
/// `upper(i, j)` is called once for each `i <= j`; the lower triangle is a
/// copy, so the result is bit-for-bit symmetric.
pub(crate) fn mirror_from_upper<F>(n: usize, mut upper: F) -> Matrix
where
    F: FnMut(usize, usize) -> f64,
{
    let mut data = Matrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let v = upper(i, j);
            data[(i, j)] = v;
            data[(j, i)] = v;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symmetric_accepts_symmetric() {
        let m = Matrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let c = CovarianceMatrix::from_symmetric(m.clone(), PixelOrdering::Ring).unwrap();
        assert_eq!(c.dim(), 2);
        assert_eq!(c.as_matrix(), &m);
    }

    #[test]
    fn test_from_symmetric_rejects_asymmetric_and_non_square() {
        let m = Matrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5000001, 1.0]);
        assert!(CovarianceMatrix::from_symmetric(m, PixelOrdering::Ring)
            .unwrap_err()
            .is_validation());

        let rect = Matrix::zeros(2, 3);
        assert!(matches!(
            CovarianceMatrix::from_symmetric(rect, PixelOrdering::Ring),
            Err(CovarianceError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_mirror_from_upper_is_exact() {
        let m = mirror_from_upper(4, |i, j| (i as f64 + 1.0) / (j as f64 + 3.0));
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m[(i, j)].to_bits(), m[(j, i)].to_bits());
            }
        }
    }
}
