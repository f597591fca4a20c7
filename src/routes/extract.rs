//! Document extraction endpoints, one per document type.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info};

use crate::extraction::{DocumentType, ExtractionError, ExtractionRequest};
use crate::models::{AppState, ErrorResponse, ExtractionResponse};

/// Multipart field carrying the uploaded document.
pub const UPLOAD_FIELD: &str = "uploaded_file";

pub fn router(state: AppState) -> Router {
    let mut router = Router::new();
    for document_type in DocumentType::ALL {
        router = router.route(
            document_type.route(),
            post(
                move |State(state): State<AppState>,
                      multipart: Result<Multipart, MultipartRejection>| {
                    process_document(document_type, state, multipart)
                },
            ),
        );
    }
    router.with_state(state)
}

/// Error body in the `{"detail": ...}` shape clients expect.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

async fn process_document(
    document_type: DocumentType,
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResponse>, ApiError> {
    info!(route = document_type.route(), "Extraction request received");

    let mut multipart = multipart.map_err(|e| ApiError::new(e.status(), e.body_text()))?;
    let document_bytes = read_upload(&mut multipart).await?;

    let info = state
        .pipeline
        .extract(ExtractionRequest {
            document_bytes,
            document_type,
        })
        .await
        .map_err(|e| {
            error!(document_type = %document_type, "Extraction failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(ExtractionResponse { info }))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()));
        }
    }

    Err(ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Field required: {}", UPLOAD_FIELD),
    ))
}
