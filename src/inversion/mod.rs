//! Covariance matrix inversion.
//!
//! Three interchangeable strategies share the [`Inverter`] contract:
//! - **Cholesky**: fastest, requires positive definiteness
//! - **Eigen**: symmetric eigen-decomposition, robust for marginal input
//! - **LU**: general baseline, least stable for ill-conditioned input
//!
//! Ill-conditioning is not an error. When accuracy matters, invert with two
//! strategies and compare them with [`max_relative_difference`].

mod cholesky;
mod eigen;
mod lu;

pub use cholesky::CholeskyInverter;
pub use eigen::EigenInverter;
pub use lu::LuInverter;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::covariance::CovarianceMatrix;
use crate::error::{ensure_dimension, CovarianceError, Result};
use crate::types::{Matrix, PixelOrdering};

/// Which inversion algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InversionStrategy {
    /// Cholesky factorisation.
    #[default]
    Cholesky,
    /// Symmetric eigen-decomposition.
    #[serde(alias = "EigenDecomposition")]
    Eigen,
    /// Partial-pivot LU.
    Lu,
}

impl InversionStrategy {
    /// All strategies, in order of preference for well-conditioned input.
    pub const ALL: [InversionStrategy; 3] = [Self::Cholesky, Self::Eigen, Self::Lu];

    /// The implementation behind this strategy.
    pub fn inverter(&self) -> &'static dyn Inverter {
        match self {
            Self::Cholesky => &CholeskyInverter,
            Self::Eigen => &EigenInverter,
            Self::Lu => &LuInverter,
        }
    }

    /// Short name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cholesky => "cholesky",
            Self::Eigen => "eigen",
            Self::Lu => "lu",
        }
    }
}

/// One way of inverting a square matrix.
pub trait Inverter: Send + Sync {
    /// The strategy tag this implementation answers to.
    fn strategy(&self) -> InversionStrategy;

    /// Invert a non-empty square matrix.
    fn invert_matrix(&self, matrix: &Matrix) -> Result<Matrix>;
}

/// Inverse of a specific covariance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseCovarianceMatrix {
    data: Matrix,
    ordering: PixelOrdering,
    strategy: Option<InversionStrategy>,
}

impl InverseCovarianceMatrix {
    /// Wrap a dense inverse read back from storage.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the matrix is not square.
    pub fn from_matrix(data: Matrix, ordering: PixelOrdering) -> Result<Self> {
        ensure_dimension("inverse matrix columns", data.nrows(), data.ncols())?;
        Ok(Self {
            data,
            ordering,
            strategy: None,
        })
    }

    /// Number of pixels.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Pixel numbering scheme of the source covariance.
    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    /// Strategy that produced this inverse; `None` when loaded from storage.
    pub fn strategy(&self) -> Option<InversionStrategy> {
        self.strategy
    }

    /// Borrow the dense inverse.
    pub fn as_matrix(&self) -> &Matrix {
        &self.data
    }

    /// Take the dense inverse.
    pub fn into_matrix(self) -> Matrix {
        self.data
    }
}

/// Invert `matrix` with the chosen strategy.
///
/// # Errors
///
/// - `Decomposition` when Cholesky meets a non-positive-definite matrix.
/// - `SingularMatrix` when Eigen or LU meet a (numerically) singular matrix.
pub fn invert(matrix: &CovarianceMatrix, strategy: InversionStrategy) -> Result<InverseCovarianceMatrix> {
    invert_with(matrix, strategy.inverter())
}

/// Invert `matrix` with a caller-supplied [`Inverter`].
pub fn invert_with(matrix: &CovarianceMatrix, inverter: &dyn Inverter) -> Result<InverseCovarianceMatrix> {
    let n = matrix.dim();
    let strategy = inverter.strategy();
    let data = if n == 0 {
        Matrix::zeros(0, 0)
    } else {
        let start = Instant::now();
        tracing::debug!(pixels = n, strategy = strategy.as_str(), "inverting covariance matrix");
        let inverse = inverter.invert_matrix(matrix.as_matrix())?;
        tracing::debug!(
            strategy = strategy.as_str(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "inversion complete"
        );
        inverse
    };
    Ok(InverseCovarianceMatrix {
        data,
        ordering: matrix.ordering(),
        strategy: Some(strategy),
    })
}

/// Largest absolute entry of `C·C⁻¹ − I`.
///
/// # Errors
///
/// `DimensionMismatch` if the two matrices differ in size.
pub fn residual(matrix: &CovarianceMatrix, inverse: &InverseCovarianceMatrix) -> Result<f64> {
    let n = matrix.dim();
    ensure_dimension("inverse residual", n, inverse.dim())?;
    let product = matrix.as_matrix() * inverse.as_matrix();
    let mut worst = 0.0_f64;
    for i in 0..n {
        for j in 0..n {
            let target = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((product[(i, j)] - target).abs());
        }
    }
    Ok(worst)
}

/// `max|A − B| / max|A|`, the agreement between two inverses of one matrix.
///
/// # Errors
///
/// `DimensionMismatch` if the inverses differ in size.
pub fn max_relative_difference(a: &InverseCovarianceMatrix, b: &InverseCovarianceMatrix) -> Result<f64> {
    ensure_dimension("inverse comparison", a.dim(), b.dim())?;
    if a.dim() == 0 {
        return Ok(0.0);
    }
    let scale = a.as_matrix().amax();
    if scale == 0.0 {
        return Err(CovarianceError::singular("reference inverse is identically zero"));
    }
    Ok((a.as_matrix() - b.as_matrix()).amax() / scale)
}
