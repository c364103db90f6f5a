mod chat_handler_test;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::embedding::Embedder;
use crate::error::EmbeddingError;

/// Deterministic embedder: known texts map to fixed vectors, everything
/// else maps to `fallback`.
pub struct StubEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
    pub fallback: Vec<f32>,
}

impl StubEmbedder {
    pub fn new(fallback: Vec<f32>) -> StubEmbedder {
        StubEmbedder { vectors: HashMap::new(), fallback }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> StubEmbedder {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectors.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn encode(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Status { status: 502, body: String::from("model offline") })
    }
}
