//! Compact storage of symmetric matrices as their upper triangle.

use serde::{Deserialize, Serialize};

use super::matrix::{mirror_from_upper, CovarianceMatrix};
use crate::error::{CovarianceError, Result};
use crate::types::PixelOrdering;

/// Upper triangle of a symmetric `N × N` matrix, row-major, diagonal included.
///
/// Holds `N(N+1)/2` values: `C[0][0], C[0][1], ..., C[0][N-1], C[1][1], ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetricCompactForm {
    values: Vec<f64>,
}

impl SymmetricCompactForm {
    /// Wrap raw values (typically read back from storage). The length is
    /// checked when decoding.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are stored (the 0×0 matrix).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The stored values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Take the stored values.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Matrix dimension `N` such that `N(N+1)/2 == len()`.
    ///
    /// # Errors
    ///
    /// `Validation` if the length is not a triangular number.
    pub fn dimension(&self) -> Result<usize> {
        triangular_root(self.values.len()).ok_or_else(|| {
            CovarianceError::validation(format!(
                "compact form length {} is not N(N+1)/2 for any integer N",
                self.values.len()
            ))
        })
    }
}

/// `N` with `N(N+1)/2 == len`, if one exists.
fn triangular_root(len: usize) -> Option<usize> {
    // N = (−1 + √(1 + 8·len)) / 2, then confirmed in integer arithmetic.
    let estimate = ((-1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    let lo = estimate.saturating_sub(1);
    (lo..=estimate + 1).find(|&n| n.checked_mul(n + 1).map(|t| t / 2) == Some(len))
}

/// Flatten the upper triangle of `matrix`.
pub fn encode(matrix: &CovarianceMatrix) -> SymmetricCompactForm {
    let n = matrix.dim();
    let data = matrix.as_matrix();
    let mut values = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            values.push(data[(i, j)]);
        }
    }
    SymmetricCompactForm { values }
}

/// Rebuild the full symmetric matrix from its compact form.
///
/// Each stored value lands at `(i, j)` and is mirrored to `(j, i)`, so the
/// diagonal is written once and the round trip is bit-exact.
///
/// # Errors
///
/// `Validation` if the compact length is not a triangular number.
pub fn decode(compact: &SymmetricCompactForm, ordering: PixelOrdering) -> Result<CovarianceMatrix> {
    let n = compact.dimension()?;
    let values = compact.as_slice();
    let mut k = 0;
    // Called in row-major upper order, matching `encode`.
    let data = mirror_from_upper(n, |_, _| {
        let v = values[k];
        k += 1;
        v
    });
    Ok(CovarianceMatrix::from_mirrored(data, ordering))
}
