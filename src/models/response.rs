use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::services::docx::DOCX_MEDIA_TYPE;

pub const SERVICE_NAME: &str = "PDF to DOCX Converter";

/// A successfully converted document, ready to be sent back as a download.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ConvertedDocument {
    pub fn new(file_name: String, content: Vec<u8>) -> Self {
        Self { file_name, content }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", header_safe_file_name(&self.file_name))
    }
}

impl IntoResponse for ConvertedDocument {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&self.content_disposition())
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(DOCX_MEDIA_TYPE)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.content,
        )
            .into_response()
    }
}

// Quoted-string filenames cannot carry quotes, backslashes or control bytes,
// and non-ASCII is not portable across clients.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
    pub version: String,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Operation {
    pub method: String,
    pub path: String,
    pub description: String,
}

impl Operation {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        }
    }
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            status: "running".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            operations: vec![
                Operation::new(
                    "POST",
                    "/convert/pdf-to-docx",
                    "Convert an uploaded PDF (multipart field `file`) to DOCX",
                ),
                Operation::new("GET", "/health", "Liveness probe"),
                Operation::new("GET", "/ready", "Readiness probe (converter availability)"),
                Operation::new("GET", "/", "Service metadata"),
            ],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub timestamp: String,
}
