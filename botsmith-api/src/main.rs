//! Botsmith API - Main entry point.

use anyhow::Result;
use botsmith_common::logging::init_logging;
use botsmith_common::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::from_env()?;

    // Initialize logging
    init_logging(&settings.log_level, &settings.log_format);

    tracing::info!("Botsmith API v{}", env!("CARGO_PKG_VERSION"));

    // Start the API server
    botsmith_api::start_server(settings).await
}
