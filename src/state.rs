use crate::config::Config;
use crate::services::ConversionService;

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub conversion: ConversionService,
}

impl AppState {
    pub fn new(config: Config, conversion: ConversionService) -> Self {
        Self { config, conversion }
    }
}
