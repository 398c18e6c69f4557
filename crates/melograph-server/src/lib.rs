//! Melograph server library logic.

pub mod api;
pub mod api_collections;
pub mod config;
pub mod uploads;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    response::Html,
    routing::get,
    Json, Router,
};
use melograph_db::DbPool;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use uploads::UploadRegistry;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// In-memory registry of upload metadata.
    pub uploads: UploadRegistry,
    /// Directory holding the built frontend bundle.
    pub frontend_dir: String,
    /// Directory for uploaded files.
    pub upload_dir: String,
}

/// Maximum request body size (1 MiB). The API only accepts small form and
/// JSON bodies.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Served for `GET /` when the frontend bundle has not been built.
const FALLBACK_INDEX_HTML: &str = "<!DOCTYPE html>
<html>
<head><title>Melograph</title></head>
<body>
<h1>Melograph</h1>
<p>The frontend bundle has not been built. The API is up.</p>
</body>
</html>
";

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `GET /`.
///
/// Serves the frontend's `index.html` when the bundle exists and a built-in
/// placeholder page otherwise. The homepage answers 200 in every deployment
/// state; the bundle is probed per request, so building it later needs no
/// restart.
async fn homepage(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let index = Path::new(&state.frontend_dir).join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(contents) => Html(contents),
        Err(_) => Html(FALLBACK_INDEX_HTML.to_string()),
    }
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(homepage))
        .route("/health", get(health))
        .route(
            "/api/collections",
            get(api_collections::list_collections_handler)
                .post(api_collections::create_collection_handler),
        );

    // Serve uploaded files under /uploads/*
    let upload_dir = state.upload_dir.clone();
    let router = if Path::new(&upload_dir).exists() {
        tracing::info!(path = %upload_dir, "serving uploaded files at /uploads");
        router.nest_service("/uploads", ServeDir::new(&upload_dir))
    } else {
        tracing::info!(path = %upload_dir, "upload directory not found yet, skipping /uploads");
        router
    };

    // Serve the frontend bundle if it has been built: fingerprinted assets
    // under /static/* plus index.html as the fallback for client-side routes.
    let frontend_dir = state.frontend_dir.clone();
    let index = Path::new(&frontend_dir).join("index.html");
    let router = if index.exists() {
        tracing::info!(path = %frontend_dir, "serving frontend bundle");
        router
            .nest_service("/static", ServeDir::new(Path::new(&frontend_dir).join("static")))
            .fallback_service(ServeDir::new(&frontend_dir).fallback(ServeFile::new(index)))
    } else {
        tracing::info!(path = %frontend_dir, "frontend bundle not found, serving placeholder homepage");
        router
    };

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
