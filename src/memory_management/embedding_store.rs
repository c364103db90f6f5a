use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// A `[rows, dim]` matrix of embeddings as persisted on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingMatrix {
    pub dim: usize,
    pub rows: Vec<Vec<f32>>,
}

impl EmbeddingMatrix {
    pub fn new(dim: usize, rows: Vec<Vec<f32>>) -> EmbeddingMatrix {
        EmbeddingMatrix { dim, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn read(path: &Path) -> Result<EmbeddingMatrix, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        let matrix: EmbeddingMatrix = bincode::deserialize_from(BufReader::new(file))
            .map_err(|source| LoadError::Decode { path: path.to_path_buf(), source })?;
        matrix.validate(path)?;
        Ok(matrix)
    }

    /// Writes to a sibling temp file, then renames it over `path`.
    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        self.validate(path)?;
        let tmp = self.stage(path)?;
        commit(&tmp, path)
    }

    /// Writes the matrix next to `path` and returns the temp file's path.
    fn stage(&self, path: &Path) -> Result<PathBuf, LoadError> {
        let tmp = tmp_path(path);
        let written = self.write_to(&tmp);
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written.map(|_| tmp)
    }

    fn write_to(&self, path: &Path) -> Result<(), LoadError> {
        let io_error = |source| LoadError::Io { path: path.to_path_buf(), source };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .map_err(|source| LoadError::Encode { path: path.to_path_buf(), source })?;
        writer.flush().map_err(io_error)?;
        let file = writer.into_inner().map_err(|e| io_error(e.into_error()))?;
        file.sync_all().map_err(io_error)
    }

    fn validate(&self, path: &Path) -> Result<(), LoadError> {
        if self.dim == 0 && !self.rows.is_empty() {
            return Err(LoadError::ZeroDimension { path: path.to_path_buf() });
        }
        for (row, values) in self.rows.iter().enumerate() {
            if values.len() != self.dim {
                return Err(LoadError::RaggedRow {
                    path: path.to_path_buf(),
                    row,
                    expected: self.dim,
                    actual: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(LoadError::NonFinite { path: path.to_path_buf(), row });
            }
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn commit(tmp: &Path, path: &Path) -> Result<(), LoadError> {
    fs::rename(tmp, path).map_err(|source| {
        let _ = fs::remove_file(tmp);
        LoadError::Io { path: path.to_path_buf(), source }
    })
}

/// Inclusion and exclusion embeddings, row `i` of each belonging to study `i`.
#[derive(Debug)]
pub struct EmbeddingStore {
    inclusion: EmbeddingMatrix,
    exclusion: EmbeddingMatrix,
}

impl EmbeddingStore {
    /// Loads both matrices and checks them against the catalog size.
    pub fn load(inclusion_path: &Path, exclusion_path: &Path, num_studies: usize) -> Result<EmbeddingStore, LoadError> {
        let inclusion = EmbeddingMatrix::read(inclusion_path)?;
        let exclusion = EmbeddingMatrix::read(exclusion_path)?;

        for (path, matrix) in [(inclusion_path, &inclusion), (exclusion_path, &exclusion)] {
            if matrix.len() != num_studies {
                return Err(LoadError::RowCountMismatch {
                    path: path.to_path_buf(),
                    expected: num_studies,
                    actual: matrix.len(),
                });
            }
        }

        let store = EmbeddingStore::from_matrices(inclusion, exclusion)?;
        if store.len() > 0 && store.exclusion_matches_inclusion() {
            warn!(
                "{} and {} are identical; every study will score 0 and queries will always match the first study",
                inclusion_path.display(),
                exclusion_path.display()
            );
        }
        info!(
            "Loaded {} inclusion and exclusion embeddings of dimension {}",
            store.len(),
            store.dim()
        );
        Ok(store)
    }

    pub fn from_matrices(inclusion: EmbeddingMatrix, exclusion: EmbeddingMatrix) -> Result<EmbeddingStore, LoadError> {
        inclusion.validate(Path::new("inclusion embeddings"))?;
        exclusion.validate(Path::new("exclusion embeddings"))?;
        if inclusion.len() != exclusion.len() {
            return Err(LoadError::RowCountMismatch {
                path: "exclusion embeddings".into(),
                expected: inclusion.len(),
                actual: exclusion.len(),
            });
        }
        if inclusion.dim != exclusion.dim {
            return Err(LoadError::DimensionMismatch {
                inclusion: inclusion.dim,
                exclusion: exclusion.dim,
            });
        }
        Ok(EmbeddingStore { inclusion, exclusion })
    }

    /// Writes both files, or neither: each matrix is staged to a temp file
    /// and only renamed into place once both were written.
    pub fn save(&self, inclusion_path: &Path, exclusion_path: &Path) -> Result<(), LoadError> {
        let inclusion_tmp = self.inclusion.stage(inclusion_path)?;
        let exclusion_tmp = match self.exclusion.stage(exclusion_path) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&inclusion_tmp);
                return Err(e);
            }
        };

        if let Err(e) = commit(&inclusion_tmp, inclusion_path) {
            let _ = fs::remove_file(&exclusion_tmp);
            return Err(e);
        }
        commit(&exclusion_tmp, exclusion_path)
    }

    /// True when every exclusion row equals its inclusion row.
    pub fn exclusion_matches_inclusion(&self) -> bool {
        self.inclusion.rows == self.exclusion.rows
    }

    pub fn len(&self) -> usize {
        self.inclusion.len()
    }

    pub fn dim(&self) -> usize {
        self.inclusion.dim
    }

    pub fn inclusion(&self) -> &[Vec<f32>] {
        &self.inclusion.rows
    }

    pub fn exclusion(&self) -> &[Vec<f32>] {
        &self.exclusion.rows
    }
}
