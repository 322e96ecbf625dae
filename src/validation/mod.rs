//! Chi-square validation of inverse covariance matrices.
//!
//! Random fields are drawn by a [`FieldGenerator`], restricted to the pixel
//! set of the inverse and reduced to `Tᵗ·C⁻¹·T`. Every trial owns an RNG
//! derived from `(seed, trial)`, so a seeded run is reproducible regardless of
//! thread count.

mod chi_square;
mod generator;
mod moments;
mod seed;

pub use chi_square::{validate, ChiSquareSamples, ChiSquareValidator};
pub use generator::{CorrelatedFieldGenerator, FieldGenerator, WhiteNoiseGenerator};
pub use moments::RunningMoments;
pub use seed::{counter_rng_seed, trial_rng};
