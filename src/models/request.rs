use bytes::Bytes;

/// Media types a PDF upload may be declared with. `application/octet-stream`
/// is what many HTTP clients send when they do not sniff the file.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/x-pdf",
    "application/octet-stream",
];

const PDF_MEDIA_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

const FALLBACK_FILE_NAME: &str = "document.pdf";
const FALLBACK_STEM: &str = "document";

/// A single uploaded file, validated and fully buffered.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
    pub content_type: Option<String>,
}

impl Upload {
    pub fn new(name: Option<String>, content: Bytes) -> Self {
        let size = content.len();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
        Self {
            name,
            size,
            content,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Base name of the upload without directories or extension.
    pub fn stem(&self) -> String {
        file_stem(&self.name)
    }

    /// Name of the converted document handed back to the caller.
    pub fn output_file_name(&self) -> String {
        format!("{}.docx", self.stem())
    }
}

/// Decides from the part headers alone whether an upload claims to be a PDF.
///
/// A named upload must carry a `.pdf` extension and, if it declares a content
/// type, one of [`ACCEPTED_CONTENT_TYPES`]. An unnamed upload must declare a
/// PDF media type explicitly.
pub fn is_pdf_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let essence = content_type.map(media_type_essence);

    match file_name.filter(|n| !n.trim().is_empty()) {
        Some(name) => {
            has_pdf_extension(name)
                && essence.map_or(true, |ct| ACCEPTED_CONTENT_TYPES.contains(&ct.as_str()))
        }
        None => essence.map_or(false, |ct| PDF_MEDIA_TYPES.contains(&ct.as_str())),
    }
}

fn has_pdf_extension(name: &str) -> bool {
    base_name(name).to_lowercase().ends_with(".pdf")
}

fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

// Browsers may send "C:\fakepath\report.pdf"; only the last segment counts.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn file_stem(name: &str) -> String {
    let base = base_name(name).trim();
    let stem = match base.rfind('.') {
        Some(idx) => &base[..idx],
        None => base,
    };
    if stem.trim().is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.trim().to_string()
    }
}
