#[cfg(test)]
mod tests {
    use actix_web::http::header::{ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};
    use crate::cors;
    use crate::embedding::Embedder;
    use crate::handlers::chat_handler::*;
    use crate::memory_management::embedding_store::{EmbeddingMatrix, EmbeddingStore};
    use crate::memory_management::study_manager::StudyManager;
    use crate::models::study::StudyRecord;
    use crate::tests::{FailingEmbedder, StubEmbedder};
    use crate::utils::config::DEFAULT_ALLOWED_ORIGINS;

    fn study(id: &str) -> StudyRecord {
        StudyRecord {
            id: id.to_string(),
            inclusion_criteria: vec![format!("{} inclusion", id)],
            exclusion_criteria: vec![format!("{} exclusion", id)],
        }
    }

    fn setup_manager(embedder: Box<dyn Embedder>) -> web::Data<StudyManager> {
        let studies = vec![study("NCT01"), study("NCT02")];
        let inclusion = EmbeddingMatrix::new(3, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
        let exclusion = EmbeddingMatrix::new(3, vec![vec![0.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]]);
        let store = EmbeddingStore::from_matrices(inclusion, exclusion).unwrap();

        web::Data::new(StudyManager::new(studies, store, embedder).unwrap())
    }

    fn stub() -> Box<dyn Embedder> {
        Box::new(
            StubEmbedder::new(vec![0.0, 0.0, 0.0])
                .with("metastatic breast cancer", vec![0.0, 1.0, 0.0])
                .with("stage IV lung cancer", vec![1.0, 0.0, 0.0]),
        )
    }

    #[actix_rt::test]
    async fn test_read_root() {
        let app = test::init_service(App::new().configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({ "Hello": "World" }));
    }

    #[actix_rt::test]
    async fn test_chat_returns_best_study() {
        let app = test::init_service(
            App::new()
                .app_data(setup_manager(stub()))
                .configure(init_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/chat?message=metastatic%20breast%20cancer")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!({
                "study": {
                    "id": "NCT02",
                    "inclusionCriteria": ["NCT02 inclusion"],
                    "exclusionCriteria": ["NCT02 exclusion"]
                }
            })
        );
    }

    #[actix_rt::test]
    async fn test_chat_empty_message() {
        let app = test::init_service(
            App::new()
                .app_data(setup_manager(stub()))
                .configure(init_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/chat?message=").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["study"]["id"].is_string());
    }

    #[actix_rt::test]
    async fn test_chat_missing_message() {
        let app = test::init_service(
            App::new()
                .app_data(setup_manager(stub()))
                .configure(init_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/chat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_chat_rejects_get() {
        let app = test::init_service(
            App::new()
                .app_data(setup_manager(stub()))
                .configure(init_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/chat?message=hi").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_rt::test]
    async fn test_chat_embedding_failure() {
        let app = test::init_service(
            App::new()
                .app_data(setup_manager(Box::new(FailingEmbedder)))
                .configure(init_routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/chat?message=hi").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("model offline"));
    }

    #[actix_rt::test]
    async fn test_chat_empty_catalog() {
        let store = EmbeddingStore::from_matrices(EmbeddingMatrix::new(3, vec![]), EmbeddingMatrix::new(3, vec![])).unwrap();
        let manager = web::Data::new(StudyManager::new(vec![], store, stub()).unwrap());
        let app = test::init_service(App::new().app_data(manager).configure(init_routes)).await;

        let req = test::TestRequest::post().uri("/chat?message=hi").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_rt::test]
    async fn test_cors_allowed_origin() {
        let origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect();
        let app = test::init_service(
            App::new()
                .wrap(cors(&origins))
                .configure(init_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((ORIGIN, "http://localhost:3000"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "http://localhost:3000");
        assert_eq!(resp.headers().get(ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
    }
}
