use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 5] = [
    "http://localhost.tiangolo.com",
    "https://localhost.tiangolo.com",
    "http://localhost",
    "http://localhost:8080",
    "http://localhost:3000",
];

#[derive(Parser, Debug)]
#[command(name = "trial_matcher", about = "Matches patient descriptions against clinical-trial eligibility criteria")]
pub struct Cli {
    #[command(flatten)]
    pub data: DataConfig,

    #[command(flatten)]
    pub embedder: EmbedderConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Embed the catalog and write both embedding files
    Precompute,
}

#[derive(Args, Debug, Clone)]
pub struct DataConfig {
    /// Trial catalog CSV
    #[arg(long, env = "TRIAL_MATCHER_CATALOG", default_value = "output.csv", global = true)]
    pub catalog: PathBuf,

    #[arg(long, env = "TRIAL_MATCHER_INCLUSION_EMBEDDINGS", default_value = "inclusion_embeddings.bin", global = true)]
    pub inclusion_embeddings: PathBuf,

    #[arg(long, env = "TRIAL_MATCHER_EXCLUSION_EMBEDDINGS", default_value = "exclusion_embeddings.bin", global = true)]
    pub exclusion_embeddings: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct EmbedderConfig {
    /// OpenAI-compatible embeddings endpoint
    #[arg(long, env = "TRIAL_MATCHER_EMBEDDING_URL", default_value = "http://127.0.0.1:8080/v1/embeddings", global = true)]
    pub embedding_url: String,

    #[arg(long, env = "TRIAL_MATCHER_EMBEDDING_MODEL", default_value = "sentence-transformers/all-mpnet-base-v2", global = true)]
    pub embedding_model: String,

    #[arg(long, env = "TRIAL_MATCHER_EMBEDDING_API_KEY", hide_env_values = true, global = true)]
    pub embedding_api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    #[arg(long, env = "TRIAL_MATCHER_BIND", default_value = "127.0.0.1:8000", global = true)]
    pub bind: String,

    /// Origin allowed by CORS; repeat for several
    #[arg(long = "allowed-origin", env = "TRIAL_MATCHER_ALLOWED_ORIGINS", value_delimiter = ',', global = true)]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Configured origins, or the local development hosts when none are given.
    pub fn origins(&self) -> Vec<String> {
        if self.allowed_origins.is_empty() {
            DEFAULT_ALLOWED_ORIGINS.iter().map(|origin| origin.to_string()).collect()
        } else {
            self.allowed_origins.clone()
        }
    }
}
