//! Error types for covariance construction, inversion and validation.

use crate::types::PixelOrdering;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CovarianceError>;

/// Errors that can occur anywhere in the covariance pipeline.
///
/// Every variant is fail-fast: the operation that raised it produced no output.
#[derive(Debug, thiserror::Error)]
pub enum CovarianceError {
    /// Malformed input (bad compact length, subset pixel outside superset,
    /// duplicate pixel index, negative spectrum entry, ...).
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong.
        message: String,
    },

    /// Two inputs that must share a pixel numbering scheme do not.
    #[error("pixel ordering mismatch in {context}: expected {expected:?}, found {found:?}")]
    OrderingMismatch {
        /// Where the check failed.
        context: &'static str,
        /// Ordering of the reference input.
        expected: PixelOrdering,
        /// Ordering actually found.
        found: PixelOrdering,
    },

    /// Cholesky factorisation met a non-positive pivot.
    #[error("matrix is not positive definite (Cholesky decomposition failed)")]
    Decomposition,

    /// Inversion met a zero or numerically negligible eigenvalue / pivot.
    #[error("singular matrix: {message}")]
    SingularMatrix {
        /// Which test detected the singularity.
        message: String,
    },

    /// Operands of incompatible size.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Where the check failed.
        context: &'static str,
        /// Required size.
        expected: usize,
        /// Size found.
        actual: usize,
    },

    /// Failure reading or writing a persisted array.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted array could not be interpreted.
    #[error("storage error: {message}")]
    Storage {
        /// Location and cause.
        message: String,
    },
}

impl CovarianceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub(crate) fn singular(message: impl Into<String>) -> Self {
        Self::SingularMatrix {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the validation family
    /// (malformed input or mismatched ordering).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::OrderingMismatch { .. })
    }
}

/// Fail with `OrderingMismatch` unless both orderings agree.
pub(crate) fn ensure_ordering(
    context: &'static str,
    expected: PixelOrdering,
    found: PixelOrdering,
) -> Result<()> {
    if expected != found {
        return Err(CovarianceError::OrderingMismatch {
            context,
            expected,
            found,
        });
    }
    Ok(())
}

/// Fail with `DimensionMismatch` unless both sizes agree.
pub(crate) fn ensure_dimension(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CovarianceError::DimensionMismatch {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}
