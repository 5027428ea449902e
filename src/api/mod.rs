pub mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::delivery::{Mailer, OutgoingMail, ProposalEntry, ProposalWriter};
use crate::engine::BidWizEngine;
use crate::error::{DeliveryError, EngineError};
use crate::negotiation::{NegotiationRole, NegotiationTurn};

pub use error::{ApiError, ApiResult, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BidWizEngine>,
    pub proposals: Arc<ProposalWriter>,
    pub mailer: Arc<dyn Mailer>,
    /// Where `/api/train` stages uploads while they are ingested.
    pub upload_dir: PathBuf,
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: String,
    message: String,
    knowledge_loaded: bool,
}

#[derive(Serialize)]
pub struct UploadResponse {
    filename: String,
    status: String,
}

#[derive(Serialize)]
pub struct TrainResponse {
    message: String,
    chunks: usize,
}

fn default_tone() -> String {
    "Professional".to_string()
}

#[derive(Deserialize, Validate)]
pub struct AnalysisRequest {
    #[validate(length(min = 1))]
    requirement: String,
    #[serde(default = "default_tone")]
    tone: String,
}

#[derive(Serialize)]
pub struct TextResponse {
    response: String,
}

#[derive(Deserialize)]
pub struct NegotiationRequest {
    #[serde(default)]
    history: Vec<NegotiationTurn>,
    role: NegotiationRole,
    #[serde(default)]
    policy: String,
}

#[derive(Deserialize, Validate)]
pub struct FinalizeRequest {
    #[validate(length(min = 1))]
    responses: Vec<ProposalEntry>,
    #[validate(email)]
    email: String,
}

#[derive(Serialize)]
pub struct FinalizeResponse {
    status: String,
    file: String,
}

/// Create and configure the API router
pub fn create_api(state: AppState, max_upload_bytes: usize) -> Router {
    // Fully permissive CORS; the dashboard runs on a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/train", post(train_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/negotiate", post(negotiate_handler))
        .route("/api/finalize", post(finalize_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

/// First multipart field named `file`, if any.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok(Some(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "BidWiz backend running!".to_string(),
        knowledge_loaded: state.engine.is_ready(),
    })
}

async fn upload_handler(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    let file = read_file_field(multipart?)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    Ok(Json(UploadResponse {
        filename: file.filename,
        status: "uploaded".to_string(),
    }))
}

async fn train_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<TrainResponse> {
    let file = read_file_field(multipart?)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| ApiError::Delivery(DeliveryError::Io(e)))?;

    let suffix = Path::new(&file.filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    // Removed when `staged` drops, whichever way this handler returns.
    let staged = tempfile::Builder::new()
        .prefix("temp_")
        .suffix(&suffix)
        .tempfile_in(&state.upload_dir)
        .map_err(|e| ApiError::Delivery(DeliveryError::Io(e)))?;

    tokio::fs::write(staged.path(), &file.bytes)
        .await
        .map_err(|e| ApiError::Delivery(DeliveryError::Io(e)))?;

    let report = state.engine.ingest_as(staged.path(), Some(&file.filename)).await?;

    Ok(Json(TrainResponse {
        message: "Knowledge base loaded successfully!".to_string(),
        chunks: report.chunks,
    }))
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<TextResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let response = match state.engine.answer(&request.requirement, &request.tone).await {
        Ok(text) => text,
        // user-facing flow: not-ready is an answer, not a failure
        Err(EngineError::NotReady) => EngineError::NotReady.to_string(),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(TextResponse { response }))
}

async fn negotiate_handler(
    State(state): State<AppState>,
    payload: Result<Json<NegotiationRequest>, JsonRejection>,
) -> ApiResult<TextResponse> {
    let Json(request) = payload?;
    let response = state
        .engine
        .next_turn(&request.history, request.role, &request.policy)
        .await?;

    Ok(Json(TextResponse { response }))
}

async fn finalize_handler(
    State(state): State<AppState>,
    payload: Result<Json<FinalizeRequest>, JsonRejection>,
) -> ApiResult<FinalizeResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let writer = Arc::clone(&state.proposals);
    let entries = request.responses;
    let pdf_path = tokio::task::spawn_blocking(move || writer.write(&entries))
        .await
        .map_err(|e| ApiError::Delivery(DeliveryError::Task(e.to_string())))??;

    state
        .mailer
        .send_with_attachment(OutgoingMail {
            to: &request.email,
            subject: "Your BidWiz Proposal",
            body: "Please find the requested proposal attached.",
            attachment: &pdf_path,
        })
        .await?;

    Ok(Json(FinalizeResponse {
        status: "success".to_string(),
        file: pdf_path.display().to_string(),
    }))
}
