/// Remodel API - HTTP endpoint for schema conversion requests
///
/// Thin transport layer over `remodel::convert`: routing, CORS, and input
/// pre-validation (size/line caps plus a textual denylist). The denylist is
/// a weak heuristic documented as such, not a sandbox guarantee.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use remodel::{convert, ConversionRequest, ConvertError, ConverterConfig, NodeDelegate};

/// Byte ceiling for submitted source text
const MAX_SOURCE_BYTES: usize = 64 * 1024;
/// Line ceiling for submitted source text
const MAX_SOURCE_LINES: usize = 1_000;

/// Textual patterns tied to dangerous runtime capabilities. Heuristic only:
/// trivially bypassable, kept as a speed bump in front of the sandbox.
const DENYLIST: &[&str] = &[
    "require(",
    "process.",
    "child_process",
    "import fs",
    "import os",
    "eval(",
    "new Function",
    "fetch(",
    "XMLHttpRequest",
    "Deno.",
    "Bun.",
];

#[derive(Clone)]
struct AppState {
    delegate: Arc<NodeDelegate>,
    config: ConverterConfig,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let state = Arc::new(AppState {
        delegate: Arc::new(NodeDelegate::new(
            env_or("REMODEL_NODE_BIN", "node"),
            env_or("REMODEL_RUNNER", "/opt/remodel/runner.js"),
        )),
        config: config_from_env(),
    });

    // Build router
    let app = Router::new()
        .route("/convert", post(convert_handler))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Run server
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("Invalid PORT");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Remodel API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn config_from_env() -> ConverterConfig {
    let mut config = ConverterConfig::default();
    if let Ok(root) = std::env::var("REMODEL_SANDBOX_ROOT") {
        config.sandbox.sandbox_root = PathBuf::from(root);
    }
    if let Ok(root) = std::env::var("REMODEL_ZOD_ROOT") {
        config.sandbox.zod_install_root = PathBuf::from(root);
    }
    if let Ok(secs) = std::env::var("REMODEL_TIMEOUT_SECS") {
        if let Ok(secs) = secs.parse::<u64>() {
            config.execution_timeout = Duration::from_secs(secs);
        }
    }
    config
}

/// Convert a batch of exported schemas to the requested dialect
async fn convert_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConversionRequest>,
) -> Result<Json<ConvertResponse>, AppError> {
    pre_validate(&request.source)?;

    let output = convert(request, state.delegate.clone(), &state.config)
        .await
        .map_err(AppError)?;

    Ok(Json(ConvertResponse {
        output,
        generated_at: chrono::Utc::now(),
    }))
}

/// Upstream pre-validation: non-empty, size ceiling, line ceiling, denylist
fn pre_validate(source: &str) -> Result<(), AppError> {
    if source.trim().is_empty() {
        return Err(validation("Source must not be empty".to_string()));
    }
    if source.len() > MAX_SOURCE_BYTES {
        return Err(validation(format!("Source exceeds {} bytes", MAX_SOURCE_BYTES)));
    }
    if source.lines().count() > MAX_SOURCE_LINES {
        return Err(validation(format!("Source exceeds {} lines", MAX_SOURCE_LINES)));
    }
    for pattern in DENYLIST {
        if source.contains(pattern) {
            return Err(validation(format!(
                "Source contains a disallowed pattern: {}",
                pattern
            )));
        }
    }
    Ok(())
}

fn validation(message: String) -> AppError {
    AppError(ConvertError::Validation(message))
}

/// Health check endpoint (liveness)
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "remodel-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Error handling

#[derive(Debug)]
struct AppError(ConvertError);

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let AppError(err) = self;
        let status = match err {
            ConvertError::Validation(_) => StatusCode::BAD_REQUEST,
            ConvertError::NoExportedSchemas
            | ConvertError::TooManyExports(_)
            | ConvertError::UnavailableVersion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConvertError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ConvertError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = err.to_string();

        (status, Json(serde_json::json!({
            "error": message
        }))).into_response()
    }
}

// Response types

#[derive(Debug, serde::Serialize)]
struct ConvertResponse {
    output: String,
    generated_at: chrono::DateTime<chrono::Utc>,
}
