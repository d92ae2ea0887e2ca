use anyhow::Context;
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docxify::{
    config::Config,
    handlers::create_router,
    services::{CommandConverter, ConversionService, Converter, WorkspaceRoot},
    state::AppState,
};

const DEFAULT_LOG_FILTER: &str = "docxify=debug,tower_http=debug,axum::rejection=trace";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting PDF to DOCX Converter Service");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);
    tracing::info!("Workspace root: {}", config.workspace_dir.display());

    let workspaces = WorkspaceRoot::new(&config.workspace_dir).with_context(|| {
        format!("Failed to create workspace root {}", config.workspace_dir.display())
    })?;
    workspaces.sweep();

    let converter = CommandConverter::from_config(&config);
    if converter.is_available() {
        tracing::info!("Converter '{}' is available", converter.name());
    } else {
        tracing::warn!(
            "Converter '{}' could not be launched; conversions will fail until it is installed",
            converter.name()
        );
    }

    let conversion = ConversionService::new(Arc::new(converter), workspaces.clone());
    let state = Arc::new(AppState::new(config.clone(), conversion));
    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = workspaces.sweep();
    tracing::info!(removed, "Server stopped, temporary files cleaned up");

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
