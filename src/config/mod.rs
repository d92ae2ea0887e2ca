use std::env;
use std::path::PathBuf;
use anyhow::{Result, Context};
use tracing::{info, warn};

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8000;
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 50;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_CONVERTER_PROGRAM: &str = "pdf2docx";
pub const DEFAULT_CONVERTER_ARGS: &str = "convert {input} {output}";

/// Placeholders substituted into the converter argument template.
pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Extra room allowed on top of the upload ceiling for the multipart envelope
/// (boundaries, part headers, stray form fields).
const MULTIPART_ENVELOPE_BYTES: usize = 1024 * 1024;

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub cors_allowed_origins: Vec<String>,
    pub workspace_dir: PathBuf,
    pub converter_program: String,
    pub converter_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            cors_allowed_origins: split_list(DEFAULT_CORS_ORIGINS, ','),
            workspace_dir: default_workspace_dir(),
            converter_program: DEFAULT_CONVERTER_PROGRAM.to_string(),
            converter_args: split_list(DEFAULT_CONVERTER_ARGS, ' '),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        // PORT wins over SERVER_PORT so platform-assigned ports are honoured.
        let server_port = match lookup("PORT") {
            Some(_) => Self::parse_var(&lookup, "PORT", defaults.server_port),
            None => Self::parse_var(&lookup, "SERVER_PORT", defaults.server_port),
        }
        .context("Failed to parse SERVER_PORT")?;

        let config = Config {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| {
                info!("SERVER_HOST not set, using default: {}", defaults.server_host);
                defaults.server_host.clone()
            }),
            server_port,
            max_file_size_mb: Self::parse_var(&lookup, "MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw, ','))
                .unwrap_or(defaults.cors_allowed_origins),
            workspace_dir: lookup("WORKSPACE_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_dir),
            converter_program: lookup("CONVERTER_PROGRAM")
                .filter(|program| !program.trim().is_empty())
                .unwrap_or(defaults.converter_program),
            converter_args: lookup("CONVERTER_ARGS")
                .map(|raw| split_list(&raw, ' '))
                .unwrap_or(defaults.converter_args),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_var<T, F>(lookup: &F, var_name: &str, default: T) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match lookup(var_name) {
            Some(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            None => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if !self.converter_args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            return Err(anyhow::anyhow!("CONVERTER_ARGS must contain {}", INPUT_PLACEHOLDER));
        }
        if !self.converter_args.iter().any(|arg| arg.contains(OUTPUT_PLACEHOLDER)) {
            return Err(anyhow::anyhow!("CONVERTER_ARGS must contain {}", OUTPUT_PLACEHOLDER));
        }
        if self.cors_allowed_origins.is_empty() {
            warn!("No CORS origins configured, cross-origin requests will be rejected");
        }
        Ok(())
    }

    /// Upload ceiling in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Transport-level body limit: the upload ceiling plus the multipart envelope.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_bytes() + MULTIPART_ENVELOPE_BYTES
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn default_workspace_dir() -> PathBuf {
    env::temp_dir().join("pdf_converter")
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
