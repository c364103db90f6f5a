pub mod http_embedder;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::EmbeddingError;

pub use http_embedder::HttpEmbedder;

/// Turns text into a fixed-dimensional vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Element-wise mean of equal-length vectors. An empty slice pools to an
/// empty vector.
pub fn mean_pool(vectors: &[Vec<f32>]) -> Vec<f32> {
    let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
    let mut pooled = vec![0.0f32; dim];
    for vector in vectors {
        for (acc, value) in pooled.iter_mut().zip(vector) {
            *acc += value;
        }
    }
    let count = vectors.len() as f32;
    pooled.iter_mut().for_each(|acc| *acc /= count);
    pooled
}

/// Embeds a study's criteria as one vector: the mean of its non-empty
/// criterion embeddings, or the embedding of "" when every criterion is empty.
pub async fn embed_criteria(embedder: &dyn Embedder, criteria: &[String]) -> Result<Vec<f32>, EmbeddingError> {
    let texts: Vec<&str> = criteria
        .iter()
        .map(String::as_str)
        .filter(|criterion| !criterion.is_empty())
        .collect();

    if texts.is_empty() {
        return embedder.encode("").await;
    }

    let results = join_all(texts.iter().map(|text| embedder.encode(text))).await;
    let vectors = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(mean_pool(&vectors))
}
