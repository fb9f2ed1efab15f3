//! Botsmith API - HTTP surface for the bot builder.
//!
//! This crate wires the conversation store and the model fallback invoker
//! into the HTTP endpoints the frontend drives:
//! - blueprint generation from interview answers
//! - playground chat with per-session history
//! - copy-paste embed snippets
//! - a stateless chat endpoint and health probes
//!
//! ```text
//! Frontend → Router (routes) → services (blueprint/playground/snippets)
//!                                   ↓                  ↓
//!                            ConversationStore   FallbackInvoker → Gemini
//! ```

#![warn(clippy::all)]

pub mod blueprint;
pub mod extract;
pub mod playground;
pub mod prompts;
pub mod routes;
pub mod snippets;

pub use routes::{api_routes, AppState};

use axum::http::HeaderValue;
use botsmith_common::Settings;
use botsmith_gateway::{FallbackInvoker, GeminiClient};
use botsmith_store::{ConversationStore, StoreConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Build the application router with CORS for the configured origins.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.settings);
    api_routes(state).layer(cors)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings.allowed_origins();
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Assemble the shared state from settings: store, client, and invoker.
pub fn build_state(settings: Settings) -> anyhow::Result<AppState> {
    let store = ConversationStore::new(StoreConfig::from_settings(&settings))?;
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let client = GeminiClient::new(settings.gemini_api_key.clone(), timeout);
    let invoker = FallbackInvoker::new(Arc::new(client), settings.preferred_models(), timeout);

    Ok(AppState {
        store: Arc::new(store),
        invoker: Arc::new(invoker),
        settings: Arc::new(settings),
    })
}

/// Start the API server.
pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let addr = SocketAddr::from((settings.bind.parse::<std::net::IpAddr>()?, settings.port));
    let state = build_state(settings)?;
    let router = build_router(state);

    tracing::info!("Starting Botsmith API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
