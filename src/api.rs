use crate::error::RetrievalError;
use crate::service::{
    ContextHit, IngestOptions, RetrievalService, SearchOptions, DEFAULT_MAX_CONTEXT_LENGTH,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct AddDocumentRequest {
    pub file_name: String,
    pub content: String,
    #[serde(default)]
    pub max_chunk_size: Option<usize>,
    #[serde(default)]
    pub overlap: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PromptParams {
    pub query: String,
    #[serde(default)]
    pub max_context_length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ContextHit>,
    pub total: usize,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn error_msg(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }

    fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

struct AppError(RetrievalError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RetrievalError::UnsupportedFileType { .. } | RetrievalError::FileTooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            RetrievalError::DuplicateDocument { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        tracing::error!("API error: {}", message);

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        Self(err)
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn add_document(
    State(service): State<Arc<RetrievalService>>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let defaults = IngestOptions::default();
    let options = IngestOptions {
        max_chunk_size: req.max_chunk_size.unwrap_or(defaults.max_chunk_size),
        overlap: req.overlap.unwrap_or(defaults.overlap),
    };

    let report = service.add_document(&req.file_name, req.content.as_bytes(), &options)?;

    Ok(Json(ApiResponse::success(report)))
}

async fn list_documents(State(service): State<Arc<RetrievalService>>) -> impl IntoResponse {
    Json(ApiResponse::success(service.list_documents()))
}

async fn remove_document(
    State(service): State<Arc<RetrievalService>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if service.remove_document(&id) {
        Json(ApiResponse::success("Document removed successfully"))
    } else {
        Json(ApiResponse::error_msg(format!(
            "Document with id '{}' not found",
            id
        )))
    }
}

async fn clear_documents(State(service): State<Arc<RetrievalService>>) -> impl IntoResponse {
    service.clear();
    Json(ApiResponse::success("Knowledge base cleared"))
}

async fn search_documents(
    State(service): State<Arc<RetrievalService>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let defaults = SearchOptions::default();
    let options = SearchOptions {
        top_k: params.top_k.unwrap_or(defaults.top_k),
        threshold: params.threshold.unwrap_or(defaults.threshold),
    };

    let results = service.search_context(&params.query, &options);

    let response = SearchResponse {
        total: results.len(),
        results,
        query: params.query,
    };

    Json(ApiResponse::success(response))
}

async fn contextual_prompt(
    State(service): State<Arc<RetrievalService>>,
    Query(params): Query<PromptParams>,
) -> impl IntoResponse {
    let max_context_length = params
        .max_context_length
        .unwrap_or(DEFAULT_MAX_CONTEXT_LENGTH);
    let result = service.generate_contextual_prompt(&params.query, max_context_length);

    Json(ApiResponse::success(result))
}

async fn get_stats(State(service): State<Arc<RetrievalService>>) -> impl IntoResponse {
    Json(ApiResponse::success(service.stats()))
}

// ========== Router ==========

pub fn create_router(service: Arc<RetrievalService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/documents", post(add_document))
        .route("/documents", get(list_documents))
        .route("/documents", delete(clear_documents))
        .route("/documents/:id", delete(remove_document))
        .route("/search", get(search_documents))
        .route("/prompt", get(contextual_prompt))
        .route("/stats", get(get_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
