use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::EmbeddingError;

#[derive(Serialize, Debug)]
struct Request<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize, Debug)]
struct Embedding {
    embedding: Vec<f32>,
}

#[derive(Deserialize, Debug)]
struct Response {
    data: Vec<Embedding>,
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint serving a
/// sentence-embedding model.
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    pub fn new(url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> HttpEmbedder {
        HttpEmbedder {
            client: reqwest::Client::new(),
            url: url.into(),
            model: model.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let data = Request { input: text, model: &self.model };

        let mut request = self.client.post(&self.url).json(&data);
        if let Some(api_key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", api_key));
        }
        let res = request.send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status { status: status.as_u16(), body });
        }

        let response: Response = res.json().await?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or(EmbeddingError::Empty)?;

        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::NonFinite);
        }

        debug!("Embedded {} chars into {} dimensions", text.len(), embedding.len());
        Ok(embedding)
    }
}
