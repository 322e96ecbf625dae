//! Pixel masks and the active-pixel sets derived from them.

use serde::{Deserialize, Serialize};

use crate::error::{CovarianceError, Result};
use crate::types::PixelOrdering;

/// Indicator array over a fixed pixel universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyMask {
    flags: Vec<bool>,
    ordering: PixelOrdering,
}

impl SkyMask {
    /// Create a mask from one flag per pixel.
    pub fn new(flags: Vec<bool>, ordering: PixelOrdering) -> Self {
        Self { flags, ordering }
    }

    /// Create a mask from numeric map values; any non-zero value marks an active pixel.
    ///
    /// NaN counts as active, matching how non-zero tests treat it.
    pub fn from_values(values: &[f64], ordering: PixelOrdering) -> Self {
        Self {
            flags: values.iter().map(|&v| v != 0.0).collect(),
            ordering,
        }
    }

    /// Number of pixels in the universe.
    pub fn universe_size(&self) -> usize {
        self.flags.len()
    }

    /// Pixel numbering scheme the mask was read under.
    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    /// Whether pixel `index` is active. Out-of-range indices are inactive.
    pub fn is_active(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Number of active pixels.
    pub fn active_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Active pixel indices in ascending order.
    pub fn pixel_set(&self) -> PixelSet {
        let indices = self
            .flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect();
        PixelSet {
            indices,
            universe_size: self.flags.len(),
            ordering: self.ordering,
        }
    }
}

/// Ordered, unique active pixel indices within a pixel universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSet {
    indices: Vec<usize>,
    universe_size: usize,
    ordering: PixelOrdering,
}

impl PixelSet {
    /// Build a pixel set from explicit indices.
    ///
    /// # Errors
    ///
    /// `Validation` if an index repeats, the indices are not ascending, or an
    /// index falls outside `[0, universe_size)`.
    pub fn from_indices(
        indices: Vec<usize>,
        universe_size: usize,
        ordering: PixelOrdering,
    ) -> Result<Self> {
        for pair in indices.windows(2) {
            if pair[0] == pair[1] {
                return Err(CovarianceError::validation(format!(
                    "duplicate pixel index {}",
                    pair[0]
                )));
            }
            if pair[0] > pair[1] {
                return Err(CovarianceError::validation(format!(
                    "pixel indices not ascending: {} before {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some(&last) = indices.last() {
            if last >= universe_size {
                return Err(CovarianceError::validation(format!(
                    "pixel index {last} outside universe of {universe_size} pixels"
                )));
            }
        }
        Ok(Self {
            indices,
            universe_size,
            ordering,
        })
    }

    /// Active indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of active pixels (the dimension of any matrix over this set).
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the set has no active pixels.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Size of the enclosing pixel universe.
    pub fn universe_size(&self) -> usize {
        self.universe_size
    }

    /// Pixel numbering scheme.
    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    /// Position of `pixel` within this set, by binary search.
    pub fn position(&self, pixel: usize) -> Option<usize> {
        self.indices.binary_search(&pixel).ok()
    }

    /// Gather the values of `map` at the active pixels, in set order.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `map` does not cover the pixel universe.
    pub fn restrict(&self, map: &[f64]) -> Result<Vec<f64>> {
        crate::error::ensure_dimension("pixel set restriction", self.universe_size, map.len())?;
        Ok(self.indices.iter().map(|&i| map[i]).collect())
    }
}
