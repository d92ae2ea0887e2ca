use lopdf::Document;

use crate::services::converter::ConverterError;

const HEADER_WINDOW: usize = 1024;

/// What lopdf could read from an upload that carries a PDF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSummary {
    pub version: String,
    pub pages: usize,
    pub encrypted: bool,
}

/// Outcome of the pre-flight. Only a missing header is a definite rejection;
/// everything lopdf cannot read is left for the converter to judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    Parsed(PdfSummary),
    Unparsed { reason: String },
}

/// Cheap structural check run on the staged upload before the converter.
///
/// Encryption is only recorded here. Whether a password is actually required
/// is decided by the converter, since documents with just an owner password
/// open without one.
pub fn inspect(content: &[u8]) -> Result<Preflight, ConverterError> {
    let head = &content[..content.len().min(HEADER_WINDOW)];
    if find(head, b"%PDF-").is_none() {
        return Err(ConverterError::Corrupted("missing %PDF header".to_string()));
    }

    let document = match Document::load_mem(content) {
        Ok(document) => document,
        Err(e) => {
            return Ok(Preflight::Unparsed {
                reason: e.to_string(),
            })
        }
    };

    Ok(Preflight::Parsed(PdfSummary {
        version: document.version.clone(),
        pages: document.get_pages().len(),
        encrypted: document.is_encrypted(),
    }))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
