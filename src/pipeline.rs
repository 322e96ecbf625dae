//! `CovariancePipeline` entry point and case catalog.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::Config;
use crate::constants::INVERSE_RESIDUAL_TOLERANCE;
use crate::covariance::{correct, encode, extract_from_compact, CovarianceMatrix};
use crate::error::{ensure_dimension, ensure_ordering, CovarianceError, Result};
use crate::inversion::{invert, residual, InverseCovarianceMatrix, InversionStrategy};
use crate::result::ChiSquareReport;
use crate::sky::{PixelCoordinates, PixelSet, SkyMask};
use crate::spectrum::PowerSpectrum;
use crate::store::{load_compact, load_inverse, save_compact, save_inverse, ArrayStore};
use crate::types::{PixelOrdering, UnitScale};
use crate::validation::{ChiSquareValidator, FieldGenerator};

/// Mask and storage locations for one analysis case.
pub struct CaseResources {
    /// Active pixels of the case.
    pub mask: SkyMask,
    /// Where the compact covariance is persisted.
    pub covariance: Box<dyn ArrayStore>,
    /// Where the dense inverse is persisted.
    pub inverse: Box<dyn ArrayStore>,
}

impl CaseResources {
    /// Bundle a mask with its covariance and inverse stores.
    pub fn new(mask: SkyMask, covariance: impl ArrayStore + 'static, inverse: impl ArrayStore + 'static) -> Self {
        Self {
            mask,
            covariance: Box::new(covariance),
            inverse: Box::new(inverse),
        }
    }
}

impl std::fmt::Debug for CaseResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseResources")
            .field("pixels", &self.mask.active_count())
            .field("ordering", &self.mask.ordering())
            .field("covariance", &self.covariance.describe())
            .field("inverse", &self.inverse.describe())
            .finish()
    }
}

/// Maps case identifiers to their [`CaseResources`].
#[derive(Debug, Default)]
pub struct CaseCatalog {
    cases: BTreeMap<String, CaseResources>,
}

impl CaseCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a case.
    pub fn insert(&mut self, case: impl Into<String>, resources: CaseResources) {
        self.cases.insert(case.into(), resources);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_case(mut self, case: impl Into<String>, resources: CaseResources) -> Self {
        self.insert(case, resources);
        self
    }

    /// Resources of `case`.
    ///
    /// # Errors
    ///
    /// `Validation` for an unknown identifier.
    pub fn get(&self, case: &str) -> Result<&CaseResources> {
        self.cases
            .get(case)
            .ok_or_else(|| CovarianceError::validation(format!("unknown case '{case}'")))
    }

    /// Known case identifiers, sorted.
    pub fn case_ids(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }
}

/// Whether [`CovariancePipeline::prepare`] computes or reads the inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Build, persist and invert the covariance.
    Create,
    /// Read a previously persisted inverse.
    Load,
}

/// Sky data needed to build a covariance.
#[derive(Debug, Clone, Copy)]
pub struct SkyInputs<'a> {
    /// Longitude/latitude of every pixel of the universe.
    pub coordinates: &'a PixelCoordinates,
    /// Angular power spectrum.
    pub spectrum: &'a PowerSpectrum,
    /// Pixel-window response, required when the config enables it.
    pub pixel_window: Option<&'a [f64]>,
}

/// A case ready for validation.
#[derive(Debug, Clone)]
pub struct PreparedCase {
    case: String,
    pixels: PixelSet,
    covariance: Option<CovarianceMatrix>,
    inverse: InverseCovarianceMatrix,
}

impl PreparedCase {
    /// Case identifier.
    pub fn case(&self) -> &str {
        &self.case
    }

    /// Active pixels of the case mask.
    pub fn pixels(&self) -> &PixelSet {
        &self.pixels
    }

    /// The built covariance; `None` for [`BuildMode::Load`].
    pub fn covariance(&self) -> Option<&CovarianceMatrix> {
        self.covariance.as_ref()
    }

    /// The inverse covariance.
    pub fn inverse(&self) -> &InverseCovarianceMatrix {
        &self.inverse
    }
}

/// Builds, inverts, persists and validates covariance matrices per case.
///
/// # Example
///
/// ```ignore
/// use sky_covariance::{BuildMode, CovariancePipeline, InversionStrategy, SkyInputs};
///
/// let pipeline = CovariancePipeline::new()
///     .highpass(12)
///     .strategy(InversionStrategy::Eigen)
///     .trials(2000);
///
/// let inputs = SkyInputs { coordinates: &coords, spectrum: &cl, pixel_window: None };
/// let prepared = pipeline.prepare("north", &catalog, Some(&inputs), BuildMode::Create)?;
/// let report = pipeline.validate(&prepared, &generator)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CovariancePipeline {
    config: Config,
}

impl CovariancePipeline {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with [`Config::quick`].
    pub fn quick() -> Self {
        Self::from_config(Config::quick())
    }

    /// Create with an explicit configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the lowest multipole kept.
    pub fn highpass(mut self, highpass: usize) -> Self {
        self.config.highpass = highpass;
        self
    }

    /// Set the series truncation used without smoothing.
    pub fn lmax(mut self, lmax: usize) -> Self {
        self.config.lmax = lmax;
        self
    }

    /// Enable or disable the Gaussian beam.
    pub fn beam_smooth(mut self, enabled: bool) -> Self {
        self.config.beam_smooth = enabled;
        self
    }

    /// Enable or disable the pixel window.
    pub fn pix_win(mut self, enabled: bool) -> Self {
        self.config.pix_win = enabled;
        self
    }

    /// Set the temperature unit.
    pub fn unit_scale(mut self, unit_scale: UnitScale) -> Self {
        self.config.unit_scale = unit_scale;
        self
    }

    /// Set the expected pixel numbering scheme.
    pub fn ordering(mut self, ordering: PixelOrdering) -> Self {
        self.config.ordering = ordering;
        self
    }

    /// Set the inversion strategy.
    pub fn strategy(mut self, strategy: InversionStrategy) -> Self {
        self.config.inversion = strategy;
        self
    }

    /// Set the number of chi-square trials.
    pub fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    /// Fix the validation seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Enable or disable monopole removal.
    pub fn mean_correction(mut self, enabled: bool) -> Self {
        self.config.mean_correction = enabled;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Produce the inverse covariance for `case`.
    ///
    /// With [`BuildMode::Create`] the covariance is built from `inputs`,
    /// optionally mean-corrected, persisted in compact form, inverted, and the
    /// inverse persisted. With [`BuildMode::Load`] the persisted inverse is
    /// read back and `inputs` is ignored.
    ///
    /// # Errors
    ///
    /// - `Validation` for an unknown case, or `Create` without inputs.
    /// - `OrderingMismatch` if mask or coordinates differ from the configured
    ///   ordering.
    /// - `DimensionMismatch` if a loaded inverse does not match the mask.
    /// - `SingularMatrix` if a created inverse misses `C·C⁻¹ = I` by more than
    ///   [`INVERSE_RESIDUAL_TOLERANCE`]; nothing is written to the inverse store.
    ///   A mean-corrected covariance is singular and always ends here.
    /// - Any build, inversion, storage or I/O error.
    pub fn prepare(
        &self,
        case: &str,
        catalog: &CaseCatalog,
        inputs: Option<&SkyInputs<'_>>,
        mode: BuildMode,
    ) -> Result<PreparedCase> {
        let resources = catalog.get(case)?;
        ensure_ordering("case mask", self.config.ordering, resources.mask.ordering())?;
        let pixels = resources.mask.pixel_set();
        let start = Instant::now();

        let prepared = match mode {
            BuildMode::Create => {
                let inputs = inputs.ok_or_else(|| {
                    CovarianceError::validation(format!("case '{case}': building a covariance needs sky inputs"))
                })?;
                ensure_ordering("pixel coordinates", self.config.ordering, inputs.coordinates.ordering())?;
                tracing::debug!(case, pixels = pixels.len(), "creating covariance");

                let vectors = inputs.coordinates.unit_vectors(&pixels)?;
                let kernel = self.config.filter_kernel(inputs.pixel_window)?;
                let mut covariance = self.config.builder().build(&vectors, inputs.spectrum, &kernel)?;
                if self.config.mean_correction {
                    covariance = correct(&covariance);
                }
                save_compact(resources.covariance.as_ref(), &encode(&covariance))?;

                let inverse = invert(&covariance, self.config.inversion)?;
                let worst = residual(&covariance, &inverse)?;
                if worst > INVERSE_RESIDUAL_TOLERANCE {
                    return Err(CovarianceError::singular(format!(
                        "case '{case}': inverse residual {worst:e} exceeds {INVERSE_RESIDUAL_TOLERANCE:e}"
                    )));
                }
                save_inverse(resources.inverse.as_ref(), &inverse)?;

                PreparedCase {
                    case: case.to_string(),
                    pixels,
                    covariance: Some(covariance),
                    inverse,
                }
            }
            BuildMode::Load => {
                tracing::debug!(case, location = %resources.inverse.describe(), "loading inverse covariance");
                let inverse = load_inverse(resources.inverse.as_ref(), self.config.ordering)?;
                ensure_dimension("loaded inverse", pixels.len(), inverse.dim())?;
                PreparedCase {
                    case: case.to_string(),
                    pixels,
                    covariance: None,
                    inverse,
                }
            }
        };

        tracing::debug!(
            case,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "case prepared"
        );
        Ok(prepared)
    }

    /// Chi-square validation of a prepared case.
    ///
    /// # Errors
    ///
    /// See [`ChiSquareValidator::validate`].
    pub fn validate<G>(&self, prepared: &PreparedCase, generator: &G) -> Result<ChiSquareReport>
    where
        G: FieldGenerator + ?Sized,
    {
        let samples = ChiSquareValidator::new(self.config.trials)
            .maybe_seed(self.config.seed)
            .unit_scale(self.config.unit_scale)
            .validate(prepared.inverse(), prepared.pixels(), generator)?;
        Ok(ChiSquareReport {
            case: prepared.case.clone(),
            strategy: prepared.inverse.strategy(),
            summary: samples.summary(),
        })
    }

    /// Covariance of `subset` taken from the persisted covariance of
    /// `superset_case`.
    ///
    /// # Errors
    ///
    /// `Validation` for an unknown case or a subset pixel missing from the
    /// superset mask; storage and extraction errors otherwise.
    pub fn sub_covariance(
        &self,
        subset: &PixelSet,
        superset_case: &str,
        catalog: &CaseCatalog,
    ) -> Result<CovarianceMatrix> {
        let resources = catalog.get(superset_case)?;
        let superset = resources.mask.pixel_set();
        let compact = load_compact(resources.covariance.as_ref())?;
        extract_from_compact(subset, &superset, &compact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::validation::WhiteNoiseGenerator;

    fn catalog(ordering: PixelOrdering) -> CaseCatalog {
        CaseCatalog::new().with_case(
            "ring",
            CaseResources::new(
                SkyMask::new(vec![true, false, true, true], ordering),
                MemoryStore::new(),
                MemoryStore::new(),
            ),
        )
    }

    #[test]
    fn test_unknown_case() {
        let err = CovariancePipeline::quick()
            .prepare("missing", &catalog(PixelOrdering::Ring), None, BuildMode::Load)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_requires_inputs() {
        let err = CovariancePipeline::quick()
            .prepare("ring", &catalog(PixelOrdering::Ring), None, BuildMode::Create)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_mask_ordering_checked() {
        let err = CovariancePipeline::quick()
            .prepare("ring", &catalog(PixelOrdering::Nested), None, BuildMode::Load)
            .unwrap_err();
        assert!(matches!(err, CovarianceError::OrderingMismatch { .. }));
    }

    #[test]
    fn test_load_before_create_is_storage_error() {
        let err = CovariancePipeline::quick()
            .prepare("ring", &catalog(PixelOrdering::Ring), None, BuildMode::Load)
            .unwrap_err();
        assert!(matches!(err, CovarianceError::Storage { .. }));
    }

    #[test]
    fn test_validate_reports_strategy() {
        let pixels = PixelSet::from_indices(vec![0, 1], 2, PixelOrdering::Ring).unwrap();
        let inverse = InverseCovarianceMatrix::from_matrix(crate::types::Matrix::identity(2, 2), PixelOrdering::Ring)
            .unwrap();
        let prepared = PreparedCase {
            case: "pair".to_string(),
            pixels,
            covariance: None,
            inverse,
        };
        let report = CovariancePipeline::quick()
            .seed(4)
            .trials(300)
            .validate(&prepared, &WhiteNoiseGenerator::new(2, PixelOrdering::Ring))
            .unwrap();
        assert_eq!(report.case, "pair");
        assert_eq!(report.strategy, None);
        assert_eq!(report.summary.trials, 300);
        assert_eq!(report.summary.seed, 4);
    }

    #[test]
    fn test_mean_corrected_inverse_is_rejected() {
        let mask = SkyMask::new((0..12).map(|i| i % 2 == 0).collect(), PixelOrdering::Ring);
        let lon: Vec<f64> = (0..12).map(|k| 30.0 * k as f64).collect();
        let lat: Vec<f64> = (0..12).map(|k| if k < 6 { -30.0 } else { 30.0 }).collect();
        let coords = PixelCoordinates::new(lon, lat, PixelOrdering::Ring).unwrap();
        let spectrum = PowerSpectrum::new((0..=64).map(|l| 1.0 / (l as f64 + 1.0)).collect()).unwrap();
        let inputs = SkyInputs {
            coordinates: &coords,
            spectrum: &spectrum,
            pixel_window: None,
        };

        for strategy in InversionStrategy::ALL {
            let catalog = CaseCatalog::new().with_case(
                "corrected",
                CaseResources::new(mask.clone(), MemoryStore::new(), MemoryStore::new()),
            );
            let err = CovariancePipeline::quick()
                .mean_correction(true)
                .strategy(strategy)
                .prepare("corrected", &catalog, Some(&inputs), BuildMode::Create)
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    CovarianceError::SingularMatrix { .. } | CovarianceError::Decomposition
                ),
                "{strategy:?}: {err}"
            );
            let resources = catalog.get("corrected").unwrap();
            assert!(!resources.inverse.exists(), "{strategy:?} persisted an inverse");
        }

        // Without the correction the same inputs invert cleanly.
        let catalog = CaseCatalog::new().with_case(
            "plain",
            CaseResources::new(mask, MemoryStore::new(), MemoryStore::new()),
        );
        let prepared = CovariancePipeline::quick()
            .prepare("plain", &catalog, Some(&inputs), BuildMode::Create)
            .unwrap();
        let cov = prepared.covariance().unwrap();
        assert!(residual(cov, prepared.inverse()).unwrap() < INVERSE_RESIDUAL_TOLERANCE);
        assert!(catalog.get("plain").unwrap().inverse.exists());
    }

    #[test]
    fn test_builder_methods_update_config() {
        let pipeline = CovariancePipeline::new()
            .highpass(12)
            .lmax(300)
            .beam_smooth(false)
            .pix_win(true)
            .unit_scale(UnitScale::MicroKelvin)
            .ordering(PixelOrdering::Nested)
            .strategy(InversionStrategy::Lu)
            .mean_correction(true);
        let config = pipeline.config();
        assert_eq!(config.highpass, 12);
        assert_eq!(config.lmax, 300);
        assert!(!config.beam_smooth);
        assert!(config.pix_win);
        assert_eq!(config.ordering, PixelOrdering::Nested);
        assert_eq!(config.inversion, InversionStrategy::Lu);
        assert!(config.mean_correction);
    }
}
