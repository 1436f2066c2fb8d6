pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::file_service::FileService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload::upload_file,
        api::handlers::files::manage::delete_file,
        api::handlers::files::list::list_team_files,
        api::handlers::files::backup::download_bucket,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::files::UploadRequest,
            api::handlers::files::UploadResponse,
            api::handlers::files::UploadMetadata,
            api::handlers::files::DeleteResponse,
            services::file_repository::TeamFile,
            api::error::ErrorResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "Project file upload and retrieval"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub file_service: Arc<FileService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/upload", post(api::handlers::files::upload_file))
        .route("/files", delete(api::handlers::files::delete_file))
        .route("/download", get(api::handlers::files::list_team_files))
        .route("/bucket/backup", get(api::handlers::files::download_bucket));

    // Configure tracing layer for HTTP requests
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get(api::middleware::request_id::REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .nest("/api/v1", api_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_bytes() + 10 * 1024 * 1024, // Add 10MB buffer for multipart overhead
        ))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(trace_layer)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
