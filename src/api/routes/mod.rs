pub mod embedding;
pub mod health;

use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);
    let index_page = ServeFile::new(&state.config.config.assets.index_page);
    let static_files = ServeDir::new(&state.config.config.assets.static_dir);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route_service("/", index_page)
        .nest_service("/static", static_files)
        .nest("/api/embedding", embedding_routes())
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn embedding_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(embedding::get_models))
        .route("/compare", post(embedding::compare_embeddings))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::{ComparisonService, ModelCache};
    use crate::domain::{ALL_MINILM_L6_V2, QWEN3_EMBEDDING_0_6B};
    use crate::infrastructure::AppConfig;
    use crate::testing::MockLoader;

    fn app_with(loader: MockLoader) -> (Router, Arc<ModelCache>) {
        let cache = Arc::new(ModelCache::new(Arc::new(loader)));
        let comparison = Arc::new(ComparisonService::new(cache.clone()));
        let state = AppState::new(comparison, AppConfig::default());
        (create_router(state), cache)
    }

    fn app() -> Router {
        app_with(MockLoader::new()).0
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_compare(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/embedding/compare")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_models() {
        let request = Request::get("/api/embedding/models").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"models": [
                {"name": "Qwen/Qwen3-Embedding-0.6B", "dimension": 1024},
                {"name": "sentence-transformers/all-MiniLM-L6-v2", "dimension": 384},
            ]})
        );
    }

    #[tokio::test]
    async fn test_compare_success() {
        let sentences = json!([
            "The cat sat on the mat.",
            "A cat is sitting on a mat.",
            "Stock prices rose today.",
        ]);
        let (status, body) = send(
            app(),
            post_compare(json!({"sentences": sentences, "models": [ALL_MINILM_L6_V2]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentences"], sentences);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["model_name"], ALL_MINILM_L6_V2);
        assert_eq!(results[0]["dimension"], 384);

        let cosine = results[0]["cosine_similarity"].as_array().unwrap();
        let distance = results[0]["normalized_euclidean_distance"].as_array().unwrap();
        assert_eq!(cosine.len(), 3);
        assert_eq!(distance.len(), 3);
        for i in 0..3 {
            assert!((cosine[i][i].as_f64().unwrap() - 1.0).abs() < 1e-6);
            assert!(distance[i][i].as_f64().unwrap().abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_compare_validation_errors() {
        let cases = [
            (json!({"sentences": ["one"], "models": [ALL_MINILM_L6_V2]}), "At least 2 sentences are required."),
            (json!({"sentences": ["a", "b"], "models": []}), "Select at least one model."),
            (json!({"sentences": ["a", " "], "models": [ALL_MINILM_L6_V2]}), "Sentence 2 is empty."),
            (json!({"sentences": ["a", "b"], "models": ["x/y"]}), "Invalid model: x/y"),
        ];

        for (body, detail) in cases {
            let (status, response) = send(app(), post_compare(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({ "detail": detail }));
        }
    }

    fn post_compare_raw(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/embedding/compare")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_compare_missing_field_is_json_error() {
        let (status, body) = send(app(), post_compare(json!({"sentences": ["a", "b"]}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("models"), "{detail}");
    }

    #[tokio::test]
    async fn test_compare_malformed_bodies_are_json_errors() {
        let cases = [
            (r#"{"sentences": "a b", "models": []}"#, StatusCode::UNPROCESSABLE_ENTITY),
            ("not json", StatusCode::BAD_REQUEST),
        ];

        for (raw, expected) in cases {
            let (status, body) = send(app(), post_compare_raw(raw)).await;
            assert_eq!(status, expected, "{raw}");
            assert!(!body["detail"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_compare_processing_error_is_500() {
        let (app, _) = app_with(MockLoader::new().with_failing_encoder(QWEN3_EMBEDDING_0_6B));
        let (status, body) = send(
            app,
            post_compare(json!({
                "sentences": ["a", "b"],
                "models": [ALL_MINILM_L6_V2, QWEN3_EMBEDDING_0_6B],
            })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("results").is_none());
        assert!(body["detail"].as_str().unwrap().contains(QWEN3_EMBEDDING_0_6B));
    }

    #[tokio::test]
    async fn test_readiness_follows_cache() {
        let (app, cache) = app_with(MockLoader::new());

        let request = || Request::get("/ready").body(Body::empty()).unwrap();
        let (status, body) = send(app.clone(), request()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not_ready");

        cache.preload_all().await.unwrap();

        let (status, body) = send(app, request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loaded_models"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
