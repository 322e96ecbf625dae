//! Correction for estimating the mean from the sample itself.
//!
//! When the field mean is subtracted using the same pixels, the effective
//! covariance loses the component along the all-ones vector
//! (Granett, Neyrinck & Szapudi 2009, §4.1):
//!
//! ```text
//! C'_ij = C_ij − r_i/N − c_j/N + T/N²
//! ```
//!
//! with row sums r, column sums c and grand total T.

use super::matrix::{mirror_from_upper, CovarianceMatrix};

/// Apply the sample-mean correction, returning a new matrix.
///
/// Every row of the result sums to zero up to rounding. The input is
/// symmetric, so its column sums equal its row sums and one vector serves as
/// both; the result is filled from its upper triangle and mirrored.
pub fn correct(matrix: &CovarianceMatrix) -> CovarianceMatrix {
    let n = matrix.dim();
    if n == 0 {
        return matrix.clone();
    }
    let data = matrix.as_matrix();
    let size = n as f64;

    let row_sums: Vec<f64> = data.row_iter().map(|row| row.sum()).collect();
    let total: f64 = row_sums.iter().sum();
    let offset = total / (size * size);

    let corrected = mirror_from_upper(n, |i, j| {
        data[(i, j)] - row_sums[i] / size - row_sums[j] / size + offset
    });
    CovarianceMatrix::from_mirrored(corrected, matrix.ordering())
}
