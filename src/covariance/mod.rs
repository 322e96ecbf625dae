//! Covariance matrix construction and transformation.
//!
//! This module provides:
//! - Matrix construction from a power spectrum via Legendre series
//! - Compact upper-triangle encoding for persistence
//! - The sample-mean bias correction
//! - Sub-matrix extraction for pixel subsets

mod builder;
mod codec;
mod correction;
mod matrix;
mod submatrix;

pub use builder::{build_covariance, CovarianceBuilder};
pub use codec::{decode, encode, SymmetricCompactForm};
pub use correction::correct;
pub use matrix::CovarianceMatrix;
pub use submatrix::{extract, extract_from_compact, superset_positions};
