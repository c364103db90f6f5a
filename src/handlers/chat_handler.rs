use actix_web::{web, HttpResponse};
use log::error;
use serde_json::json;

use crate::error::ServiceError;
use crate::memory_management::study_manager::StudyManager;
use crate::models::chat::{ChatQuery, ChatResponse};

pub async fn read_root() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "Hello": "World" }))
}

pub async fn chat(
    study_manager: web::Data<StudyManager>,
    query: web::Query<ChatQuery>,
) -> Result<HttpResponse, ServiceError> {
    match study_manager.get_most_similar_study(&query.message).await {
        Ok(study) => Ok(HttpResponse::Ok().json(ChatResponse { study })),
        Err(e) => {
            error!("Chat request failed: {}", e);
            Err(e)
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(read_root))
    );

    cfg.service(
        web::resource("/chat")
            .route(web::post().to(chat))
    );
}
