use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{DeliveryError, EngineError, IngestError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Every failure the HTTP layer reports, mapped to a status code in one place.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Ingest(IngestError),
    Engine(EngineError),
    Delivery(DeliveryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(EngineError::NotReady) => StatusCode::CONFLICT,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Delivery(DeliveryError::Address(_)) => StatusCode::BAD_REQUEST,
            ApiError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Ingest(e) => format!("Ingestion Failed: {}", e),
            ApiError::Engine(e) => e.to_string(),
            ApiError::Delivery(e) => e.to_string(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        ApiError::Ingest(e)
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl From<DeliveryError> for ApiError {
    fn from(e: DeliveryError) -> Self {
        ApiError::Delivery(e)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            tracing::error!(%status, %detail, "request failed");
        } else {
            tracing::warn!(%status, %detail, "request rejected");
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
