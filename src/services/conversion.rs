use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, GENERIC_CONVERSION_FAILURE};
use crate::models::{ConvertedDocument, Upload};
use crate::services::converter::Converter;
use crate::services::docx::verify_docx;
use crate::services::pdf_inspector::{self, Preflight};
use crate::services::workspace::{Workspace, WorkspaceRoot};

/// Orchestrates one conversion: stage the upload in a private workspace,
/// pre-flight it, run the converter, verify and return the output.
#[derive(Clone)]
pub struct ConversionService {
    converter: Arc<dyn Converter>,
    workspaces: WorkspaceRoot,
}

impl ConversionService {
    pub fn new(converter: Arc<dyn Converter>, workspaces: WorkspaceRoot) -> Self {
        Self {
            converter,
            workspaces,
        }
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    pub fn workspaces(&self) -> &WorkspaceRoot {
        &self.workspaces
    }

    pub async fn convert(&self, request_id: &str, upload: Upload) -> AppResult<ConvertedDocument> {
        let start = Instant::now();
        let file_name = upload.output_file_name();

        let workspace = self.workspaces.create(request_id).map_err(|e| {
            error!(request_id = %request_id, error = %e, "Failed to create workspace");
            AppError::internal("Failed to prepare conversion workspace")
        })?;

        // The workspace travels into the blocking task and back so that it
        // outlives the converter even if this future is dropped mid-flight.
        let converter = Arc::clone(&self.converter);
        let owned_request_id = request_id.to_string();
        let joined = tokio::task::spawn_blocking(move || {
            let outcome = run_in_workspace(converter.as_ref(), &workspace, &upload, &owned_request_id);
            (workspace, outcome)
        })
        .await;

        let outcome = match joined {
            Ok((workspace, outcome)) => {
                release(workspace, request_id);
                outcome
            }
            Err(e) => {
                // A panic unwinds through the task and drops the workspace there.
                error!(request_id = %request_id, error = %e, "Conversion task aborted");
                Err(AppError::conversion(GENERIC_CONVERSION_FAILURE))
            }
        };

        let content = outcome?;
        info!(
            request_id = %request_id,
            output_name = %file_name,
            output_size = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Conversion completed"
        );
        Ok(ConvertedDocument::new(file_name, content))
    }
}

fn run_in_workspace(
    converter: &dyn Converter,
    workspace: &Workspace,
    upload: &Upload,
    request_id: &str,
) -> AppResult<Vec<u8>> {
    let input = workspace.input_path();
    let output = workspace.output_path();

    fs::write(&input, &upload.content)?;
    info!(
        request_id = %request_id,
        file_name = %upload.name,
        file_size = upload.size,
        "Saved PDF to workspace"
    );

    let preflight = pdf_inspector::inspect(&upload.content).map_err(|e| {
        warn!(request_id = %request_id, reason = %e.diagnostic(), "PDF rejected by pre-flight");
        AppError::from(e)
    })?;
    match preflight {
        Preflight::Parsed(summary) => info!(
            request_id = %request_id,
            pdf_version = %summary.version,
            pages = summary.pages,
            encrypted = summary.encrypted,
            "PDF passed pre-flight"
        ),
        Preflight::Unparsed { reason } => warn!(
            request_id = %request_id,
            reason = %reason,
            "PDF could not be parsed, handing it to the converter as is"
        ),
    }

    let start = Instant::now();
    converter.convert(&input, &output).map_err(|e| {
        warn!(
            request_id = %request_id,
            converter = %converter.name(),
            diagnostic = %e.diagnostic(),
            "Converter reported a failure: {}",
            e
        );
        AppError::from(e)
    })?;
    info!(
        request_id = %request_id,
        converter = %converter.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Converter finished"
    );

    let content = match fs::read(&output) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(request_id = %request_id, "Converter reported success but wrote no output");
            return Err(AppError::conversion("Conversion failed - no output file generated"));
        }
        Err(e) => return Err(e.into()),
    };

    verify_docx(&content).map_err(|e| {
        error!(request_id = %request_id, error = %e, "Converter output is not a valid DOCX");
        AppError::conversion("Converter produced an invalid DOCX document")
    })?;

    Ok(content)
}

// Cleanup failures are logged rather than returned; they must not mask the
// conversion outcome.
fn release(workspace: Workspace, request_id: &str) {
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        warn!(
            request_id = %request_id,
            workspace = %path.display(),
            error = %e,
            "Failed to remove workspace"
        );
    }
}
