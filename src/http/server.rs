//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with the airdrop endpoint
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Derive the client IP from proxy headers
//! - Extract the bypass bearer token and the session-verified identity
//!   header (`X-Identity-Id`, set by the authenticating front end)
//! - Dispatch to the admission pipeline and map outcomes to responses

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admission::{AdmissionPipeline, AirdropRequest};
use crate::blockchain::Network;
use crate::config::FaucetConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AdmissionPipeline>,
}

/// HTTP server for the faucet.
pub struct HttpServer {
    router: Router,
    config: FaucetConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: FaucetConfig, pipeline: Arc<AdmissionPipeline>) -> Self {
        let state = AppState { pipeline };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &FaucetConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/request", post(request_handler))
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &FaucetConfig {
        &self.config
    }
}

/// `POST /api/request` wire format. Presence checks happen in the
/// pipeline, so absent fields map to their "missing" sentinels.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirdropRequestBody {
    #[serde(default)]
    wallet_address: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    network: Option<Network>,
    #[serde(default)]
    captcha_token: Option<String>,
}

async fn request_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<AirdropRequestBody>,
) -> Response {
    let start = Instant::now();

    let request = AirdropRequest {
        wallet_address: body.wallet_address.unwrap_or_default(),
        amount: body.amount.unwrap_or(0.0),
        network: body.network.unwrap_or_default(),
        client_ip: client_ip(&headers, addr),
        captcha_token: body.captcha_token,
        bearer_token: bearer_token(&headers),
        external_identity: header_value(&headers, "x-identity-id"),
    };

    match state.pipeline.process(&request).await {
        Ok(signature) => {
            metrics::record_request(200, start);
            (
                StatusCode::OK,
                Json(json!({ "success": true, "signature": signature.to_string() })),
            )
                .into_response()
        }
        Err(e) => {
            metrics::record_request(e.http_status_hint(), start);
            ApiError(e).into_response()
        }
    }
}

async fn root_handler() -> &'static str {
    "Nothing to see here"
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Client IP: first `x-forwarded-for` value, falling back to the socket
/// peer address.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => Some(addr.ip().to_string()),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
