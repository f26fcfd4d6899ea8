use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

mod compress;
mod config;
mod decode;
mod error;
mod extract;
mod models;
mod pipeline;
mod storage;
#[cfg(test)]
mod test_support;
mod validate;

use config::{ConfigError, Settings, StorageConfig};
use error::ApiError;
use models::{ArticleImagesResponse, ArticleRequest, Base64UploadRequest, Base64UploadResponse};
use pipeline::Pipeline;
use storage::ImageStore;

#[derive(Clone)]
struct AppState {
    http: reqwest::Client,
    /// Missing credentials are kept as an error and reported per request.
    store: Result<Arc<dyn ImageStore>, ConfigError>,
    max_images_per_article: usize,
}

impl AppState {
    fn store(&self) -> Result<Arc<dyn ImageStore>, ApiError> {
        self.store.clone().map_err(ApiError::from)
    }

    fn pipeline<'a>(&'a self, store: &'a dyn ImageStore) -> Pipeline<'a> {
        Pipeline::new(&self.http, store, self.max_images_per_article)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::from_env()?;
    let http = extract::build_http_client()?;

    let store = StorageConfig::from_env().map(|config| storage::build_store(config, http.clone()));
    if let Err(e) = &store {
        tracing::warn!(error = %e, "storage is not configured; image endpoints will return 500");
    }

    let state = AppState {
        http,
        store,
        max_images_per_article: settings.max_images_per_article,
    };

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/fetch-article-images", post(fetch_article_images))
        .route("/upload-gemini-images", post(upload_gemini_images))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "Article Image Fetcher"}))
}

async fn fetch_article_images(
    State(state): State<AppState>,
    Json(req): Json<ArticleRequest>,
) -> Result<Json<ArticleImagesResponse>, ApiError> {
    let store = state.store()?;
    let articles = state
        .pipeline(store.as_ref())
        .fetch_article_images(&req.article_urls)
        .await?;

    Ok(Json(ArticleImagesResponse {
        count: articles.len(),
        articles,
    }))
}

async fn upload_gemini_images(
    State(state): State<AppState>,
    Json(req): Json<Base64UploadRequest>,
) -> Result<Json<Base64UploadResponse>, ApiError> {
    let store = state.store()?;
    let images = state
        .pipeline(store.as_ref())
        .upload_base64_images(&req.images)
        .await?;

    Ok(Json(Base64UploadResponse {
        count: images.len(),
        images,
    }))
}
