//! Numerical constants shared across the pipeline.

/// Series truncation imposed whenever beam or pixel-window smoothing is active.
pub const SMOOTHED_LMAX: usize = 250;

/// Default Gaussian beam FWHM in arcminutes (chosen to sit below the NSIDE=64 pixel window).
pub const DEFAULT_BEAM_FWHM_ARCMIN: f64 = 120.0;

/// Power-spectrum rescale from K² to µK².
pub const MICRO_POWER_FACTOR: f64 = 1e12;

/// Field rescale from K to µK.
pub const MICRO_FIELD_FACTOR: f64 = 1e6;

/// 4π, the solid angle of the full sky.
pub const FOUR_PI: f64 = 4.0 * std::f64::consts::PI;

/// Largest `max|C·C⁻¹ − I|` accepted before an inverse is persisted.
pub const INVERSE_RESIDUAL_TOLERANCE: f64 = 1e-6;
