//! Type aliases and common types.

use nalgebra::{DMatrix, DVector, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{MICRO_FIELD_FACTOR, MICRO_POWER_FACTOR};

/// Dense real matrix used for covariance and inverse storage.
pub type Matrix = DMatrix<f64>;

/// Dense real column vector.
pub type Vector = DVector<f64>;

/// Cartesian unit vector on the sphere.
pub type UnitVector = Vector3<f64>;

/// Pixel numbering scheme of the pixel universe.
///
/// A matrix built under one convention is meaningless under the other, so every
/// mask, coordinate table, matrix and field generator carries its ordering and
/// operations refuse to mix them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelOrdering {
    /// Ring numbering.
    #[default]
    Ring,
    /// Nested (hierarchical) numbering.
    Nested,
}

impl PixelOrdering {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ring => "ring",
            Self::Nested => "nested",
        }
    }
}

/// Temperature unit in which spectra and fields are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitScale {
    /// Kelvin (spectra in K²).
    #[default]
    Kelvin,
    /// Microkelvin (spectra in µK²).
    MicroKelvin,
}

impl UnitScale {
    /// Factor applied to each C_l before weighting.
    pub fn power_factor(&self) -> f64 {
        match self {
            Self::Kelvin => 1.0,
            Self::MicroKelvin => MICRO_POWER_FACTOR,
        }
    }

    /// Factor applied to each field sample.
    pub fn field_factor(&self) -> f64 {
        match self {
            Self::Kelvin => 1.0,
            Self::MicroKelvin => MICRO_FIELD_FACTOR,
        }
    }
}
