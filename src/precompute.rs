use std::path::Path;

use log::info;

use crate::embedding::{embed_criteria, Embedder};
use crate::error::PrecomputeError;
use crate::memory_management::embedding_store::{EmbeddingMatrix, EmbeddingStore};
use crate::memory_management::study_catalog::read_catalog;
use crate::models::study::StudyRecord;

/// Embeds every study's inclusion and exclusion criteria, keeping catalog order.
pub async fn embed_studies(
    embedder: &dyn Embedder,
    studies: &[StudyRecord],
) -> Result<EmbeddingStore, PrecomputeError> {
    let mut inclusion = Vec::with_capacity(studies.len());
    let mut exclusion = Vec::with_capacity(studies.len());

    for (idx, study) in studies.iter().enumerate() {
        let wrap = |source| PrecomputeError::Embedding { id: study.id.clone(), source };
        inclusion.push(embed_criteria(embedder, &study.inclusion_criteria).await.map_err(wrap)?);
        exclusion.push(embed_criteria(embedder, &study.exclusion_criteria).await.map_err(wrap)?);

        if (idx + 1) % 100 == 0 {
            info!("Embedded {}/{} studies", idx + 1, studies.len());
        }
    }

    let dim = inclusion.first().map(|v| v.len()).unwrap_or(0);
    let store = EmbeddingStore::from_matrices(EmbeddingMatrix::new(dim, inclusion), EmbeddingMatrix::new(dim, exclusion))?;
    Ok(store)
}

/// Reads the catalog, embeds it and writes both embedding files.
///
/// Refuses catalogs without an `Exclusion` column: their inclusion and
/// exclusion embeddings would be identical.
pub async fn run(
    embedder: &dyn Embedder,
    catalog_path: &Path,
    inclusion_path: &Path,
    exclusion_path: &Path,
) -> Result<usize, PrecomputeError> {
    let catalog = read_catalog(catalog_path)?;
    if catalog.exclusion_from_inclusion {
        return Err(PrecomputeError::NoExclusionColumn { path: catalog_path.to_path_buf() });
    }
    let studies = catalog.studies;

    let store = embed_studies(embedder, &studies).await?;
    store.save(inclusion_path, exclusion_path)?;
    info!(
        "Wrote {} embeddings to {} and {}",
        studies.len(),
        inclusion_path.display(),
        exclusion_path.display()
    );
    Ok(studies.len())
}
