//! # sky-covariance
//!
//! Pixel-space covariance matrices of a temperature field on the sphere,
//! built from its angular power spectrum.
//!
//! For a set of masked pixels with unit vectors `x̂ᵢ` the covariance is the
//! Legendre series
//!
//! ```text
//! C_ij = Σₗ (2l+1)/(4π) · B_l² · W_l² · C_l · P_l(x̂ᵢ·x̂ⱼ)
//! ```
//!
//! with optional beam `B_l`, pixel window `W_l` and highpass cut. The crate
//! provides:
//! - construction ([`CovarianceBuilder`]) with exact symmetry
//! - a compact upper-triangle codec and `.npy` persistence
//! - monopole removal ([`correct`]) and sub-matrix extraction ([`extract`])
//! - inversion by Cholesky, eigen-decomposition or LU ([`invert`])
//! - a Monte Carlo chi-square check of the inverse ([`ChiSquareValidator`])
//!
//! ## Quick Start
//!
//! ```ignore
//! use sky_covariance::{
//!     invert, ChiSquareValidator, CovarianceBuilder, FilterKernel, InversionStrategy,
//!     PixelCoordinates, PowerSpectrum, SkyMask, WhiteNoiseGenerator,
//! };
//!
//! let pixels = mask.pixel_set();
//! let vectors = coordinates.unit_vectors(&pixels)?;
//! let cov = CovarianceBuilder::new(250)
//!     .highpass(2)
//!     .build(&vectors, &spectrum, &FilterKernel::identity())?;
//! let inv = invert(&cov, InversionStrategy::Cholesky)?;
//! let samples = ChiSquareValidator::new(1000).seed(7).validate(&inv, &pixels, &generator)?;
//! println!("mean chi2 {:.2} for {} pixels", samples.mean(), pixels.len());
//! ```
//!
//! Logging goes through `tracing`; install a subscriber to see it.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod error;
mod pipeline;
mod result;
mod thread_pool;
mod types;

// Functional modules
pub mod covariance;
pub mod inversion;
pub mod output;
pub mod sky;
pub mod spectrum;
pub mod store;
pub mod validation;

// Re-exports for public API
pub use config::Config;
pub use constants::{DEFAULT_BEAM_FWHM_ARCMIN, FOUR_PI, MICRO_FIELD_FACTOR, MICRO_POWER_FACTOR, SMOOTHED_LMAX};
pub use covariance::{
    build_covariance, correct, decode, encode, extract, extract_from_compact, CovarianceBuilder, CovarianceMatrix,
    SymmetricCompactForm,
};
pub use error::{CovarianceError, Result};
pub use inversion::{
    invert, invert_with, max_relative_difference, residual, InverseCovarianceMatrix, InversionStrategy, Inverter,
};
pub use pipeline::{BuildMode, CaseCatalog, CaseResources, CovariancePipeline, PreparedCase, SkyInputs};
pub use result::{ChiSquareReport, ChiSquareSummary, Verdict};
pub use sky::{PixelCoordinates, PixelSet, SkyMask, UnitVectorArray};
pub use spectrum::{gaussian_beam, FilterKernel, PowerSpectrum};
pub use store::{ArrayStore, MemoryStore, NpyFile};
pub use types::{Matrix, PixelOrdering, UnitScale, UnitVector, Vector};
pub use validation::{
    ChiSquareSamples, ChiSquareValidator, CorrelatedFieldGenerator, FieldGenerator, WhiteNoiseGenerator,
};
