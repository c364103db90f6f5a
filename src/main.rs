mod embedding;
mod error;
mod handlers;
mod memory_management;
mod models;
mod precompute;
mod utils;

#[cfg(test)]
mod tests;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use dotenv::dotenv;
use log::{error, info, warn};

use crate::embedding::HttpEmbedder;
use crate::memory_management::study_manager::StudyManager;
use crate::utils::config::{Cli, Command, DataConfig, ServerConfig};

pub fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

async fn serve(data: DataConfig, server: ServerConfig, embedder: HttpEmbedder) -> std::io::Result<()> {
    let study_manager = match StudyManager::load(
        &data.catalog,
        &data.inclusion_embeddings,
        &data.exclusion_embeddings,
        Box::new(embedder),
    ) {
        Ok(study_manager) => web::Data::new(study_manager),
        Err(e) => {
            error!("Startup failed: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };
    if study_manager.studies().is_empty() {
        warn!("Catalog {} is empty, /chat will answer 503", data.catalog.display());
    }

    let origins = server.origins();
    info!("Listening on {}", server.bind);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(middleware::Logger::default())
            .app_data(study_manager.clone())
            .configure(handlers::chat_handler::init_routes)
    })
    .bind(&server.bind)?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let embedder = HttpEmbedder::new(
        cli.embedder.embedding_url,
        cli.embedder.embedding_model,
        cli.embedder.embedding_api_key,
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.data, cli.server, embedder).await,
        Command::Precompute => {
            let data = cli.data;
            match precompute::run(&embedder, &data.catalog, &data.inclusion_embeddings, &data.exclusion_embeddings).await {
                Ok(count) => {
                    info!("Precomputed embeddings for {} studies", count);
                    Ok(())
                }
                Err(e) => {
                    error!("Precompute failed: {}", e);
                    Err(std::io::Error::new(std::io::ErrorKind::Other, e))
                }
            }
        }
    }
}
