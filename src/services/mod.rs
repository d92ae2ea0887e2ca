pub mod conversion;
pub mod converter;
pub mod docx;
pub mod pdf_inspector;
pub mod workspace;

pub use conversion::ConversionService;
pub use converter::{classify_failure, CommandConverter, Converter, ConverterError};
pub use workspace::{Workspace, WorkspaceRoot};
