//! Pixel coordinates and unit vectors.

use serde::{Deserialize, Serialize};

use super::mask::PixelSet;
use crate::error::{ensure_dimension, ensure_ordering, CovarianceError, Result};
use crate::types::{PixelOrdering, UnitVector};

/// Longitude/latitude (degrees) for every pixel of a universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelCoordinates {
    lon_deg: Vec<f64>,
    lat_deg: Vec<f64>,
    ordering: PixelOrdering,
}

impl PixelCoordinates {
    /// Create a coordinate table.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the longitude and latitude columns differ in length.
    pub fn new(lon_deg: Vec<f64>, lat_deg: Vec<f64>, ordering: PixelOrdering) -> Result<Self> {
        ensure_dimension("coordinate columns", lon_deg.len(), lat_deg.len())?;
        Ok(Self {
            lon_deg,
            lat_deg,
            ordering,
        })
    }

    /// Number of pixels covered.
    pub fn universe_size(&self) -> usize {
        self.lon_deg.len()
    }

    /// Pixel numbering scheme of the table.
    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    /// Unit vectors for the pixels of `pixels`, in set order.
    ///
    /// # Errors
    ///
    /// `OrderingMismatch` if the set and the table use different numbering
    /// schemes; `DimensionMismatch` if they describe different universes.
    pub fn unit_vectors(&self, pixels: &PixelSet) -> Result<UnitVectorArray> {
        ensure_ordering("coordinates vs pixel set", self.ordering, pixels.ordering())?;
        ensure_dimension("coordinates vs pixel set universe", self.universe_size(), pixels.universe_size())?;

        let vectors = pixels
            .indices()
            .iter()
            .map(|&i| lonlat_to_vec(self.lon_deg[i], self.lat_deg[i]))
            .collect();
        Ok(UnitVectorArray {
            vectors,
            ordering: self.ordering,
        })
    }
}

/// One unit vector per active pixel, in pixel-set order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitVectorArray {
    vectors: Vec<UnitVector>,
    ordering: PixelOrdering,
}

impl UnitVectorArray {
    /// Wrap precomputed vectors; each is normalised.
    ///
    /// # Errors
    ///
    /// `Validation` if a vector has zero or non-finite length.
    pub fn new(vectors: Vec<UnitVector>, ordering: PixelOrdering) -> Result<Self> {
        let vectors = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let norm = v.norm();
                if norm > 0.0 && norm.is_finite() {
                    Ok(v / norm)
                } else {
                    Err(CovarianceError::validation(format!(
                        "direction {i} has invalid norm {norm}"
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vectors, ordering })
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Pixel numbering scheme the vectors were derived under.
    pub fn ordering(&self) -> PixelOrdering {
        self.ordering
    }

    /// The vectors.
    pub fn as_slice(&self) -> &[UnitVector] {
        &self.vectors
    }

    /// Cosine of the angular separation between pixels `i` and `j`.
    ///
    /// Exactly 1.0 when `i == j`; otherwise the dot product of the two vectors.
    pub fn cos_separation(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 1.0;
        }
        self.vectors[i].dot(&self.vectors[j])
    }
}

/// Convert longitude/latitude in degrees to a Cartesian unit vector.
pub fn lonlat_to_vec(lon_deg: f64, lat_deg: f64) -> UnitVector {
    let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
    UnitVector::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}
