use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::BytesMut;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id_from;
use crate::models::{is_pdf_upload, Upload};
use crate::state::AppState;

/// Multipart field the upload is expected in.
const FILE_FIELD: &str = "file";

pub async fn convert_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = request_id_from(&headers);
    match process_conversion(&state, &request_id, multipart).await {
        Ok(response) => response,
        Err(e) => e.into_response_with_id(&request_id),
    }
}

async fn process_conversion(
    state: &AppState,
    request_id: &str,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let start = Instant::now();

    info!(request_id = %request_id, "Starting PDF to DOCX conversion request");

    let mut multipart = multipart.map_err(|rejection| {
        warn!(request_id = %request_id, "Request is not a multipart upload");
        AppError::invalid_request(rejection.body_text())
    })?;

    let upload = match read_upload(&mut multipart, state.config.max_upload_bytes()).await {
        Ok(upload) => {
            info!(
                request_id = %request_id,
                file_name = %upload.name,
                file_size = upload.size,
                "File extracted from multipart form"
            );
            upload
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Upload rejected");
            return Err(e);
        }
    };

    let document = match state.conversion.convert(request_id, upload).await {
        Ok(document) => document,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "PDF conversion failed");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        output_name = %document.file_name,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Request completed successfully"
    );

    Ok(document.into_response())
}

/// Pulls the single file part out of the form and validates it in order:
/// presence, type, size, emptiness.
async fn read_upload(multipart: &mut Multipart, max_bytes: usize) -> AppResult<Upload> {
    let limit_mb = max_bytes / (1024 * 1024);

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb))?
    {
        let is_file_part = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file_part {
            debug!(field = ?field.name(), "Skipping non-file form field");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        if !is_pdf_upload(file_name.as_deref(), content_type.as_deref()) {
            return Err(AppError::invalid_file_type("Only PDF files are allowed"));
        }

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, limit_mb))?
        {
            if buffer.len() + chunk.len() > max_bytes {
                return Err(AppError::FileTooLarge { limit_mb });
            }
            buffer.extend_from_slice(&chunk);
        }

        if buffer.is_empty() {
            return Err(AppError::EmptyFile);
        }

        debug!(
            "Extracted file: {:?} ({} bytes, type: {:?})",
            file_name,
            buffer.len(),
            content_type
        );

        return Ok(Upload::new(file_name, buffer.freeze()).with_content_type(content_type));
    }

    Err(AppError::MissingFile)
}

fn multipart_error(err: MultipartError, limit_mb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { limit_mb }
    } else {
        AppError::invalid_request(format!("Failed to read multipart body: {}", err.body_text()))
    }
}
