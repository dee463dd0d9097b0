//! HTTP server exposing the research workflow
//!
//! One JSON endpoint runs a full research workflow per request; the rest are
//! health and version probes.

pub mod response;
pub mod routes;
pub mod state;

pub use response::{ApiError, ApiResponse, ErrorContext};
pub use state::ServerAppState;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(Serialize)]
struct VersionInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: String,
}

/// Build the CORS layer: restricted when origins are configured, otherwise any
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([CONTENT_TYPE, ACCEPT])
    } else {
        let allowed_origins: Vec<HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods(Any)
            .allow_headers([CONTENT_TYPE, ACCEPT])
    }
}

/// Build the application router
pub fn build_router(state: ServerAppState) -> Router {
    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .route("/api/run-uxr", post(routes::run_research_handler))
        .route("/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until shutdown is requested
pub async fn run_server(state: ServerAppState) -> Result<(), String> {
    let server = state.settings.server.clone();
    let model = &state.settings.model;

    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = if server.cors_origins.is_empty() {
        "*".to_string()
    } else {
        server.cors_origins.join(", ")
    };
    let model_display = format!(
        "{} / {}",
        model.provider,
        model.resolved_model().unwrap_or_else(|_| "?".to_string())
    );

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     UXR Simulation Server                     ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                               ║");
    println!("║  Server URL: http://{:<41}║", addr);
    println!("║  Model: {:<54}║", model_display);
    println!("║  CORS Origins: {:<47}║", cors_display);
    println!("║                                                               ║");
    println!("║  Endpoints:                                                   ║");
    println!("║    POST /api/run-uxr     - Run a research workflow            ║");
    println!("║    GET  /api/version     - Server version info                ║");
    println!("║    GET  /health          - Health check                       ║");
    println!("║                                                               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let app = build_router(state.clone());

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    let shutdown_state = state.shutdown_state.clone();
    let shutdown_signal = async move {
        loop {
            if shutdown_state.is_shutdown_requested() {
                log::info!(
                    "Shutdown signal received, stopping server ({} run(s) still in flight)...",
                    shutdown_state.active_runs()
                );
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Health check endpoint
async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Version endpoint
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
