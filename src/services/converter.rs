use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};

/// Diagnostic substrings that mean the document needs a password.
const PASSWORD_SIGNATURES: &[&str] = &["password", "encrypt"];

/// Diagnostic substrings that mean the document structure is unreadable.
const CORRUPTION_SIGNATURES: &[&str] = &[
    "corrupt",
    "damaged",
    "invalid pdf",
    "not a pdf",
    "broken",
    "cannot open",
    "failed to open",
    "syntax error",
];

/// Classified failure reported by a converter. Each variant keeps the raw
/// diagnostic for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConverterError {
    #[error("document requires a password: {0}")]
    PasswordProtected(String),

    #[error("document structure is unreadable: {0}")]
    Corrupted(String),

    #[error("conversion failed: {0}")]
    Failed(String),
}

impl ConverterError {
    pub fn diagnostic(&self) -> &str {
        match self {
            ConverterError::PasswordProtected(d)
            | ConverterError::Corrupted(d)
            | ConverterError::Failed(d) => d,
        }
    }
}

/// Maps a converter diagnostic onto a failure kind by looking for known
/// signatures. Password signatures take precedence.
pub fn classify_failure(diagnostic: &str) -> ConverterError {
    let lowered = diagnostic.to_lowercase();
    let owned = diagnostic.trim().to_string();

    if PASSWORD_SIGNATURES.iter().any(|sig| lowered.contains(sig)) {
        ConverterError::PasswordProtected(owned)
    } else if CORRUPTION_SIGNATURES.iter().any(|sig| lowered.contains(sig)) {
        ConverterError::Corrupted(owned)
    } else {
        ConverterError::Failed(owned)
    }
}

/// The external PDF → DOCX transformation, treated as a black box.
///
/// Implementations are called from the blocking thread pool and may block
/// for as long as the conversion takes.
pub trait Converter: Send + Sync {
    fn name(&self) -> &str;

    /// Reads the PDF at `input` and writes a DOCX to `output`.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConverterError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Runs an external program, e.g. `pdf2docx convert {input} {output}`.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.converter_program.clone(), config.converter_args.clone())
    }

    fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConverterError> {
        let args = self.render_args(input, output);
        debug!(program = %self.program, args = ?args, "Launching converter");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ConverterError::Failed(format!("failed to launch {}: {}", self.program, e))
            })?;

        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        let stdout = String::from_utf8_lossy(&result.stdout);
        warn!(
            program = %self.program,
            exit_code = ?result.status.code(),
            "Converter exited unsuccessfully"
        );

        let diagnostic = if stderr.trim().is_empty() {
            stdout.into_owned()
        } else {
            format!("{}\n{}", stderr, stdout)
        };
        Err(classify_failure(&diagnostic))
    }

    fn is_available(&self) -> bool {
        // Any exit status counts; only a failure to spawn means the program is missing.
        Command::new(&self.program)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}
