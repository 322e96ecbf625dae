//! Extraction of a pixel-subset covariance from a superset matrix.

use super::codec::{decode, SymmetricCompactForm};
use super::matrix::{mirror_from_upper, CovarianceMatrix};
use crate::error::{ensure_dimension, ensure_ordering, CovarianceError, Result};
use crate::sky::PixelSet;

/// Position of each subset pixel within the superset's active-pixel order.
///
/// Uses binary search on the (sorted) superset, so the cost is
/// O(|subset| · log |superset|).
///
/// # Errors
///
/// `Validation` if a subset pixel is not active in the superset.
pub fn superset_positions(subset: &PixelSet, superset: &PixelSet) -> Result<Vec<usize>> {
    subset
        .indices()
        .iter()
        .map(|&pixel| {
            superset.position(pixel).ok_or_else(|| {
                CovarianceError::validation(format!(
                    "subset pixel {pixel} is not active in the superset mask"
                ))
            })
        })
        .collect()
}

/// Covariance of the `subset` pixels, taken from a matrix built for `superset`.
///
/// Rows and columns follow the subset's own order. The source matrix is not
/// modified, and `extract(s, s, m) == m`.
///
/// # Errors
///
/// - `OrderingMismatch` if the masks or the matrix use different numbering.
/// - `DimensionMismatch` if the masks cover different universes or the matrix
///   dimension differs from the superset pixel count.
/// - `Validation` if a subset pixel is absent from the superset.
pub fn extract(
    subset: &PixelSet,
    superset: &PixelSet,
    superset_matrix: &CovarianceMatrix,
) -> Result<CovarianceMatrix> {
    ensure_ordering("subset vs superset mask", superset.ordering(), subset.ordering())?;
    ensure_ordering("superset mask vs matrix", superset.ordering(), superset_matrix.ordering())?;
    ensure_dimension("subset vs superset universe", superset.universe_size(), subset.universe_size())?;
    ensure_dimension("superset matrix dimension", superset.len(), superset_matrix.dim())?;

    let positions = superset_positions(subset, superset)?;
    tracing::debug!(
        subset = subset.len(),
        superset = superset.len(),
        "extracting covariance sub-matrix"
    );

    let source = superset_matrix.as_matrix();
    let data = mirror_from_upper(positions.len(), |i, j| source[(positions[i], positions[j])]);
    Ok(CovarianceMatrix::from_mirrored(data, superset_matrix.ordering()))
}

/// [`extract`] from a persisted compact superset matrix.
///
/// # Errors
///
/// As [`extract`], plus `Validation` for a malformed compact form.
pub fn extract_from_compact(
    subset: &PixelSet,
    superset: &PixelSet,
    compact: &SymmetricCompactForm,
) -> Result<CovarianceMatrix> {
    let matrix = decode(compact, superset.ordering())?;
    extract(subset, superset, &matrix)
}
