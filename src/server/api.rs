//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::backend::{CompletionBackend, GeminiBackend};
use crate::core::client::TranslationClient;
use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::language::Language;
use crate::core::models::TranslationRecord;

/// Application state
pub struct AppState<B = GeminiBackend> {
    client: TranslationClient<B>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Serialize)]
struct LanguageInfo {
    field: &'static str,
    name: String,
    source: bool,
}

/// Translation request body
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub items: Vec<String>,
}

/// Translation response body
#[derive(Serialize)]
pub struct TranslateResponse {
    pub records: Vec<TranslationRecord>,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: &'static str,
}

/// Translation error rendered as an HTTP response
pub struct ApiError(TranslationError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            TranslationError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
            TranslationError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            TranslationError::Overloaded { .. } => (StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            TranslationError::Configuration { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            TranslationError::MalformedResponse { .. } => (StatusCode::BAD_GATEWAY, "malformed_response"),
            _ => (StatusCode::BAD_GATEWAY, "upstream_error"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.0.user_message(),
                code,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Supported languages in canonical order
async fn languages() -> Json<Vec<LanguageInfo>> {
    Json(
        Language::ALL
            .iter()
            .map(|lang| LanguageInfo {
                field: lang.field_name(),
                name: lang.display_name(),
                source: lang.is_source(),
            })
            .collect(),
    )
}

/// Batch translation handler
async fn translate<B: CompletionBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    match state.client.translate(payload.items).await {
        Ok(records) => Ok(Json(TranslateResponse { records })),
        Err(e) => {
            warn!("Translation failed: {}", e);
            Err(ApiError(e))
        }
    }
}

/// Build the router around a client
pub fn router<B: CompletionBackend + 'static>(client: TranslationClient<B>) -> Router {
    let state = Arc::new(AppState { client });

    Router::new()
        .route("/", get(health_check))
        .route("/languages", get(languages))
        .route("/translate", post(translate::<B>))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16, config: TranslatorConfig) -> anyhow::Result<()> {
    let client = TranslationClient::from_config(&config)?;
    let app = router(client);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
