use crate::analysis::AnalyzedDocument;
use crate::document::Document;
use crate::engine::Indexer;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TokenizeResponse {
    pub tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchIndexRequest {
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub document_id: String,
    pub terms: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchIndexResponse {
    pub indexed: usize,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SegmentsResponse {
    pub segments: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_documents: usize,
    pub total_terms: usize,
    pub avg_postings_per_term: f64,
    pub segment_document_count: usize,
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

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.0);
        tracing::error!("API error: {}", message);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(message)),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn tokenize(
    State(indexer): State<Arc<Indexer>>,
    Json(req): Json<TokenizeRequest>,
) -> impl IntoResponse {
    let tokens = indexer.tokenize(&req.text);
    Json(ApiResponse::success(TokenizeResponse { tokens }))
}

async fn analyze_document(
    State(indexer): State<Arc<Indexer>>,
    Json(document): Json<Document>,
) -> Json<ApiResponse<AnalyzedDocument>> {
    Json(ApiResponse::success(indexer.analyze(&document)))
}

async fn index_document(
    State(indexer): State<Arc<Indexer>>,
    Json(document): Json<Document>,
) -> Result<impl IntoResponse, AppError> {
    let analyzed = indexer.index_document(&document)?;

    Ok(Json(ApiResponse::success(IndexResponse {
        document_id: analyzed.document_id,
        terms: analyzed.terms.len(),
    })))
}

async fn batch_index(
    State(indexer): State<Arc<Indexer>>,
    Json(req): Json<BatchIndexRequest>,
) -> Result<impl IntoResponse, AppError> {
    let indexed = indexer.index_batch(&req.documents)?;
    Ok(Json(ApiResponse::success(BatchIndexResponse { indexed })))
}

async fn commit(State(indexer): State<Arc<Indexer>>) -> Result<impl IntoResponse, AppError> {
    let path = tokio::task::spawn_blocking(move || indexer.commit()).await??;
    let segment = path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned());

    Ok(Json(ApiResponse::success(CommitResponse { segment })))
}

async fn list_segments(State(indexer): State<Arc<Indexer>>) -> Result<impl IntoResponse, AppError> {
    let paths = tokio::task::spawn_blocking(move || indexer.segments()).await??;
    let segments = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();

    Ok(Json(ApiResponse::success(SegmentsResponse { segments })))
}

async fn get_stats(State(indexer): State<Arc<Indexer>>) -> Result<impl IntoResponse, AppError> {
    let stats = indexer.stats()?;
    let segment_document_count =
        tokio::task::spawn_blocking(move || indexer.segment_document_count()).await??;

    let response = StatsResponse {
        total_documents: stats.total_documents,
        total_terms: stats.total_terms,
        avg_postings_per_term: stats.avg_postings_per_term,
        segment_document_count,
    };

    Ok(Json(ApiResponse::success(response)))
}

// ========== Router ==========

pub fn create_router(indexer: Arc<Indexer>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tokenize", post(tokenize))
        .route("/analyze", post(analyze_document))
        .route("/documents", post(index_document))
        .route("/documents/batch", post(batch_index))
        .route("/commit", post(commit))
        .route("/segments", get(list_segments))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(indexer)
}
