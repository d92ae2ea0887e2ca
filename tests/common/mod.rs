//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use docxify::{
    config::Config,
    handlers::create_router,
    services::{ConversionService, Converter, ConverterError, WorkspaceRoot},
    state::AppState,
};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;
use tower::ServiceExt;
use zip::write::{FileOptions, ZipWriter};
use zip::ZipArchive;

pub const BOUNDARY: &str = "docxify-test-boundary";
pub const SOURCE_PART: &str = "docProps/source.pdf";

/// A router wired to a fake converter and a private workspace root.
pub struct TestApp {
    pub router: Router,
    pub workspace_root: TempDir,
}

impl TestApp {
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self::with_limit(converter, 50)
    }

    pub fn with_limit(converter: Arc<dyn Converter>, max_file_size_mb: usize) -> Self {
        let workspace_root = tempfile::tempdir().unwrap();
        let config = Config {
            max_file_size_mb,
            workspace_dir: workspace_root.path().to_path_buf(),
            ..Config::default()
        };
        let workspaces = WorkspaceRoot::new(workspace_root.path()).unwrap();
        let conversion = ConversionService::new(converter, workspaces);
        let router = create_router(Arc::new(AppState::new(config, conversion)));
        Self {
            router,
            workspace_root,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Number of entries left under the workspace root.
    pub fn leftover_entries(&self) -> usize {
        std::fs::read_dir(self.workspace_root.path()).unwrap().count()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// One multipart part: field name, optional filename and content type, bytes.
pub struct Part<'a> {
    pub field: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            field: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(field: &'a str, value: &'a str) -> Self {
        Self {
            field,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.field);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn convert_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/convert/pdf-to-docx")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn upload_pdf(file_name: &str, data: &[u8]) -> Request<Body> {
    convert_request(&[Part::file(file_name, "application/pdf", data)])
}

fn sample_document(text: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", text).into_bytes();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A one-page PDF whose content stream shows `text`.
pub fn sample_pdf(text: &str) -> Vec<u8> {
    save(sample_document(text))
}

/// A valid PDF carrying an unreferenced stream of `padding` bytes.
pub fn padded_pdf(padding: usize) -> Vec<u8> {
    let mut doc = sample_document("padded");
    doc.add_object(Stream::new(dictionary! {}, vec![b'0'; padding]));
    save(doc)
}

pub fn encrypted_pdf() -> Vec<u8> {
    let mut doc = sample_document("secret");
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    save(doc)
}

pub fn truncated_pdf() -> Vec<u8> {
    let bytes = sample_pdf("truncated");
    bytes[..bytes.len() / 2].to_vec()
}

/// `pdf` followed by `count` newlines after its `%%EOF`.
pub fn with_trailing_data(pdf: &[u8], count: usize) -> Vec<u8> {
    let mut bytes = pdf.to_vec();
    bytes.extend(std::iter::repeat(b'\n').take(count));
    bytes
}

/// `pdf` with its `startxref` offset moved `shift` bytes past the real table.
pub fn with_shifted_xref(pdf: &[u8], shift: usize) -> Vec<u8> {
    let pos = pdf.windows(9).rposition(|w| w == b"startxref").unwrap() + 9;
    let tail = String::from_utf8(pdf[pos..].to_vec()).unwrap();
    let offset: usize = tail.split_whitespace().next().unwrap().parse().unwrap();
    let mut bytes = pdf[..pos].to_vec();
    bytes.extend_from_slice(format!("\n{}\n%%EOF\n", offset + shift).as_bytes());
    bytes
}

/// A minimal DOCX package that also embeds the source PDF, so tests can tell
/// which input produced which output.
pub fn docx_for(source: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#)
            .unwrap();
        zip.start_file(SOURCE_PART, options).unwrap();
        zip.write_all(source).unwrap();
        zip.finish().unwrap();
    }
    buffer
}

/// Returns the embedded source PDF after checking the DOCX parts exist.
pub fn source_of(docx: &[u8]) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    assert!(archive.by_name("[Content_Types].xml").is_ok());
    assert!(archive.by_name("word/document.xml").is_ok());
    let mut source = Vec::new();
    archive
        .by_name(SOURCE_PART)
        .unwrap()
        .read_to_end(&mut source)
        .unwrap();
    source
}

/// Converter double: records every call, optionally sleeps, then behaves
/// according to `mode`.
pub struct FakeConverter {
    pub mode: Mode,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub seen_inputs: Mutex<Vec<PathBuf>>,
}

pub enum Mode {
    Succeed,
    Fail(ConverterError),
    NoOutput,
    GarbageOutput,
    Panic,
}

impl FakeConverter {
    pub fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            seen_inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(mode: Mode, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            mode,
            delay,
            calls: AtomicUsize::new(0),
            seen_inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Converter for FakeConverter {
    fn name(&self) -> &str {
        "fake"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConverterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_inputs.lock().unwrap().push(input.to_path_buf());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        match &self.mode {
            Mode::Succeed => {
                let source = std::fs::read(input).unwrap();
                std::fs::write(output, docx_for(&source)).unwrap();
                Ok(())
            }
            Mode::Fail(err) => Err(err.clone()),
            Mode::NoOutput => Ok(()),
            Mode::GarbageOutput => {
                std::fs::write(output, b"definitely not a zip").unwrap();
                Ok(())
            }
            Mode::Panic => panic!("converter crashed"),
        }
    }

    fn is_available(&self) -> bool {
        !matches!(self.mode, Mode::Panic)
    }
}
