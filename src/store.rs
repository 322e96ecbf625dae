//! Persistence of covariance and inverse matrices as `.npy` arrays.
//!
//! Covariance matrices are stored in their compact upper-triangle form as a
//! 1-D `<f8` array; inverses are stored dense as a 2-D row-major `<f8` array.
//! Both are readable with `numpy.load`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy, ReadNpyError, ReadNpyExt, WriteNpyError, WriteNpyExt};

use crate::covariance::SymmetricCompactForm;
use crate::error::{CovarianceError, Result};
use crate::inversion::InverseCovarianceMatrix;
use crate::types::{Matrix, PixelOrdering};

/// Location holding one persisted array.
pub trait ArrayStore: Send + Sync {
    /// Human-readable location for logs and errors.
    fn describe(&self) -> String;

    /// Whether an array has been stored here.
    fn exists(&self) -> bool;

    /// Store a 1-D array, replacing any previous content.
    fn save_vector(&self, values: &Array1<f64>) -> Result<()>;

    /// Read back a 1-D array.
    fn load_vector(&self) -> Result<Array1<f64>>;

    /// Store a 2-D array, replacing any previous content.
    fn save_matrix(&self, values: &Array2<f64>) -> Result<()>;

    /// Read back a 2-D array.
    fn load_matrix(&self) -> Result<Array2<f64>>;
}

/// `.npy` file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyFile {
    path: PathBuf,
}

impl NpyFile {
    /// Store backed by `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filesystem failures surface as `Io`; malformed content as `Storage`.
    fn read_error(&self, err: ReadNpyError) -> CovarianceError {
        match err {
            ReadNpyError::Io(io) => CovarianceError::Io(io),
            other => storage_error(self, other),
        }
    }

    fn write_error(&self, err: WriteNpyError) -> CovarianceError {
        match err {
            WriteNpyError::Io(io) => CovarianceError::Io(io),
            other => storage_error(self, other),
        }
    }
}

impl ArrayStore for NpyFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn save_vector(&self, values: &Array1<f64>) -> Result<()> {
        write_npy(&self.path, values).map_err(|e| self.write_error(e))
    }

    fn load_vector(&self) -> Result<Array1<f64>> {
        read_npy(&self.path).map_err(|e| self.read_error(e))
    }

    fn save_matrix(&self, values: &Array2<f64>) -> Result<()> {
        write_npy(&self.path, values).map_err(|e| self.write_error(e))
    }

    fn load_matrix(&self) -> Result<Array2<f64>> {
        read_npy(&self.path).map_err(|e| self.read_error(e))
    }
}

/// In-process store holding the encoded `.npy` bytes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the stored `.npy` bytes, if any.
    pub fn bytes(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot()?.clone())
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Vec<u8>>>> {
        self.bytes
            .lock()
            .map_err(|_| CovarianceError::storage("memory store lock poisoned"))
    }

    fn put(&self, bytes: Vec<u8>) -> Result<()> {
        *self.slot()? = Some(bytes);
        Ok(())
    }

    fn get(&self) -> Result<Vec<u8>> {
        self.slot()?
            .clone()
            .ok_or_else(|| CovarianceError::storage("memory store is empty"))
    }
}

impl ArrayStore for MemoryStore {
    fn describe(&self) -> String {
        "<memory>".to_string()
    }

    fn exists(&self) -> bool {
        self.slot().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn save_vector(&self, values: &Array1<f64>) -> Result<()> {
        let mut bytes = Vec::new();
        values.write_npy(&mut bytes).map_err(|e| storage_error(self, e))?;
        self.put(bytes)
    }

    fn load_vector(&self) -> Result<Array1<f64>> {
        let bytes = self.get()?;
        Array1::<f64>::read_npy(bytes.as_slice()).map_err(|e| storage_error(self, e))
    }

    fn save_matrix(&self, values: &Array2<f64>) -> Result<()> {
        let mut bytes = Vec::new();
        values.write_npy(&mut bytes).map_err(|e| storage_error(self, e))?;
        self.put(bytes)
    }

    fn load_matrix(&self) -> Result<Array2<f64>> {
        let bytes = self.get()?;
        Array2::<f64>::read_npy(bytes.as_slice()).map_err(|e| storage_error(self, e))
    }
}

fn storage_error(store: &dyn ArrayStore, err: impl std::fmt::Display) -> CovarianceError {
    CovarianceError::storage(format!("{}: {err}", store.describe()))
}

/// Persist a covariance matrix in compact form.
pub fn save_compact(store: &dyn ArrayStore, compact: &SymmetricCompactForm) -> Result<()> {
    tracing::debug!(location = %store.describe(), values = compact.len(), "saving compact covariance");
    store.save_vector(&Array1::from(compact.as_slice().to_vec()))
}

/// Read a compact covariance matrix.
///
/// # Errors
///
/// `Io` if the file cannot be read; `Storage` if the array is missing from
/// memory or not 1-D `<f8`; `Validation` if its length is not triangular.
pub fn load_compact(store: &dyn ArrayStore) -> Result<SymmetricCompactForm> {
    let values = store.load_vector()?;
    let compact = SymmetricCompactForm::from_vec(values.to_vec());
    compact.dimension()?;
    Ok(compact)
}

/// Persist a dense inverse as a row-major 2-D array.
pub fn save_inverse(store: &dyn ArrayStore, inverse: &InverseCovarianceMatrix) -> Result<()> {
    let m = inverse.as_matrix();
    tracing::debug!(location = %store.describe(), pixels = m.nrows(), "saving inverse covariance");
    let array = Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)]);
    store.save_matrix(&array)
}

/// Read a dense inverse, tagging it with `ordering`.
///
/// # Errors
///
/// `Io` if the file cannot be read; `Storage` if the array is missing from
/// memory or not 2-D `<f8`; `DimensionMismatch` if it is not square.
pub fn load_inverse(store: &dyn ArrayStore, ordering: PixelOrdering) -> Result<InverseCovarianceMatrix> {
    let array = store.load_matrix()?;
    let (rows, cols) = array.dim();
    let data = Matrix::from_fn(rows, cols, |i, j| array[[i, j]]);
    InverseCovarianceMatrix::from_matrix(data, ordering)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_compact() {
        let store = MemoryStore::new();
        assert!(!store.exists());
        assert!(matches!(load_compact(&store), Err(CovarianceError::Storage { .. })));

        let compact = SymmetricCompactForm::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        save_compact(&store, &compact).unwrap();
        assert!(store.exists());
        assert_eq!(load_compact(&store).unwrap(), compact);
    }

    #[test]
    fn test_memory_store_bytes_are_npy() {
        let store = MemoryStore::new();
        save_compact(&store, &SymmetricCompactForm::from_vec(vec![0.5])).unwrap();
        let bytes = store.bytes().unwrap().unwrap();
        assert_eq!(&bytes[..6], b"\x93NUMPY");
        let header = String::from_utf8_lossy(&bytes[10..]);
        assert!(header.contains("<f8"));
    }

    #[test]
    fn test_inverse_is_row_major() {
        let store = MemoryStore::new();
        let data = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let inverse = InverseCovarianceMatrix::from_matrix(data.clone(), PixelOrdering::Nested).unwrap();
        save_inverse(&store, &inverse).unwrap();

        let array = store.load_matrix().unwrap();
        assert_eq!(array[[0, 1]], 2.0);
        assert_eq!(array[[1, 0]], 3.0);

        let loaded = load_inverse(&store, PixelOrdering::Nested).unwrap();
        assert_eq!(loaded.as_matrix(), &data);
        assert_eq!(loaded.strategy(), None);
    }

    #[test]
    fn test_rank_mismatch_is_storage_error() {
        let store = MemoryStore::new();
        save_compact(&store, &SymmetricCompactForm::from_vec(vec![1.0, 2.0, 3.0])).unwrap();
        assert!(matches!(
            load_inverse(&store, PixelOrdering::Ring),
            Err(CovarianceError::Storage { .. })
        ));
    }

    #[test]
    fn test_non_triangular_length_rejected() {
        let store = MemoryStore::new();
        store.save_vector(&Array1::from(vec![1.0, 2.0])).unwrap();
        assert!(load_compact(&store).unwrap_err().is_validation());
    }
}
