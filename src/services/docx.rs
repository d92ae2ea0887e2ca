use std::io::Cursor;

use thiserror::Error;
use zip::ZipArchive;

pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Parts every WordprocessingML package has.
const REQUIRED_PARTS: &[&str] = &["[Content_Types].xml", "word/document.xml"];

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("output is empty")]
    Empty,

    #[error("output is not a ZIP container: {0}")]
    NotAnArchive(#[from] zip::result::ZipError),

    #[error("output is missing the {0} part")]
    MissingPart(&'static str),
}

/// Confirms the converter produced a complete DOCX package.
pub fn verify_docx(content: &[u8]) -> Result<(), DocxError> {
    if content.is_empty() {
        return Err(DocxError::Empty);
    }

    let mut archive = ZipArchive::new(Cursor::new(content))?;
    for &part in REQUIRED_PARTS {
        if archive.by_name(part).is_err() {
            return Err(DocxError::MissingPart(part));
        }
    }
    Ok(())
}
