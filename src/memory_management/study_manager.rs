use std::path::Path;

use log::debug;

use crate::embedding::Embedder;
use crate::error::{LoadError, ServiceError};
use crate::memory_management::embedding_store::EmbeddingStore;
use crate::memory_management::matcher::match_study;
use crate::memory_management::study_catalog::load_catalog;
use crate::models::study::StudyRecord;

/// Read-only state shared by every request: the catalog, its embeddings
/// and the embedder used for queries.
pub struct StudyManager {
    studies: Vec<StudyRecord>,
    store: EmbeddingStore,
    embedder: Box<dyn Embedder>,
}

impl StudyManager {
    pub fn new(studies: Vec<StudyRecord>, store: EmbeddingStore, embedder: Box<dyn Embedder>) -> Result<StudyManager, LoadError> {
        if store.len() != studies.len() {
            return Err(LoadError::RowCountMismatch {
                path: "embedding store".into(),
                expected: studies.len(),
                actual: store.len(),
            });
        }

        Ok(StudyManager { studies, store, embedder })
    }

    /// Loads the catalog, then the embeddings checked against it.
    pub fn load(
        catalog_path: &Path,
        inclusion_path: &Path,
        exclusion_path: &Path,
        embedder: Box<dyn Embedder>,
    ) -> Result<StudyManager, LoadError> {
        let studies = load_catalog(catalog_path)?;
        let store = EmbeddingStore::load(inclusion_path, exclusion_path, studies.len())?;
        StudyManager::new(studies, store, embedder)
    }

    pub fn studies(&self) -> &[StudyRecord] {
        &self.studies
    }

    pub async fn get_most_similar_study(&self, message: &str) -> Result<&StudyRecord, ServiceError> {
        let query = self.embedder.encode(message).await?;
        let idx = match_study(&query, self.store.inclusion(), self.store.exclusion())?;

        let study = &self.studies[idx];
        debug!("Matched study {} at index {}", study.id, idx);
        Ok(study)
    }
}
