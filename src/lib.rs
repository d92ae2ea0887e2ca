//! Docxify PDF to DOCX Conversion Service
//!
//! A small HTTP service that accepts a PDF upload, hands it to an external
//! converter inside a request-scoped workspace, and returns the DOCX.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
