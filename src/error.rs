use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Startup failures. Any of these aborts the process before the server binds.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("couldn't read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("catalog {path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("couldn't decode embeddings in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("couldn't encode embeddings for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("{path}: row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        path: PathBuf,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{path}: row {row} contains a non-finite value")]
    NonFinite { path: PathBuf, row: usize },

    #[error("{path}: embedding dimension is zero")]
    ZeroDimension { path: PathBuf },

    #[error("{path} holds {actual} embeddings but the catalog has {expected} studies")]
    RowCountMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("inclusion embeddings have dimension {inclusion}, exclusion embeddings have {exclusion}")]
    DimensionMismatch { inclusion: usize, exclusion: usize },
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("embedding service returned no embeddings")]
    Empty,

    #[error("embedding contains a non-finite value")]
    NonFinite,
}

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("no studies loaded")]
    NoCatalog,

    #[error("query embedding has dimension {actual}, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors a request handler can return.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Match(MatchError::NoCatalog) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, Error)]
pub enum PrecomputeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("catalog {path} has no `Exclusion` column; inclusion and exclusion embeddings would be identical")]
    NoExclusionColumn { path: PathBuf },

    #[error("study {id}: {source}")]
    Embedding {
        id: String,
        #[source]
        source: EmbeddingError,
    },
}
