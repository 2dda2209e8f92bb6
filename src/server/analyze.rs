//! Upload handling for `POST /analyze` and the liveness probes.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::models::{AnalysisResponse, SourceDocument};

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An error answered with `{ "error": message }`.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Plain-text liveness probe.
pub async fn index() -> &'static str {
    "Server is running"
}

/// JSON health check.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "aiConfigured": state.service.ai_configured(),
    }))
}

/// Accept a single uploaded file and run the analysis pipeline on it.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id);

    match handle_upload(state, multipart).instrument(span).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_upload(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AnalysisResponse, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let document = read_file_field(&mut multipart, state.max_upload_bytes).await?;

    info!(
        "Received {} bytes declared as {}",
        document.size_bytes(),
        document.content_type()
    );

    state.service.process(document).await.map_err(|e| {
        warn!("Extraction failed: {}", e);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    })
}

/// Find the `file` field, validate it and wrap it as a [`SourceDocument`].
async fn read_file_field(
    multipart: &mut Multipart,
    max_upload_bytes: usize,
) -> Result<SourceDocument, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty."));
        }
        if bytes.len() > max_upload_bytes {
            return Err(ApiError::bad_request(format!(
                "Uploaded file exceeds the {} bytes limit.",
                max_upload_bytes
            )));
        }

        let content_type = resolve_content_type(declared.as_deref(), file_name.as_deref(), &bytes);
        return Ok(SourceDocument::new(bytes, content_type));
    }

    Err(ApiError::bad_request(
        "No file uploaded. Use field name \"file\".",
    ))
}

/// Decide the content type of an upload.
///
/// Order: the declared part type, a guess from the file name, a sniff of the
/// magic bytes, then `application/octet-stream`. A declared
/// `application/octet-stream` counts as undeclared.
pub fn resolve_content_type(declared: Option<&str>, file_name: Option<&str>, bytes: &[u8]) -> String {
    let declared = declared
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(FALLBACK_CONTENT_TYPE));
    if let Some(declared) = declared {
        return declared.to_string();
    }

    if let Some(guess) = file_name.and_then(|name| mime_guess::from_path(name).first()) {
        return guess.essence_str().to_string();
    }

    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
