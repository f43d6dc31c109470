//! API server

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};

use super::routes::{AppState, generate_plan, health_check};
use crate::config::ServerConfig;
use crate::pipeline::Pipeline;

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        ServerConfig::default().into()
    }
}

impl From<ServerConfig> for ApiServerConfig {
    fn from(config: ServerConfig) -> Self {
        Self {
            host: config.host,
            port: config.port,
            allowed_origins: config.allowed_origins,
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    pipeline: Arc<Pipeline>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, pipeline: Arc<Pipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Build the router with all routes and the CORS layer
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            pipeline: self.pipeline.clone(),
        });

        Router::new()
            .route("/api/generate-plan", post(generate_plan))
            .route("/api/health", get(health_check))
            .with_state(app_state)
            .layer(cors_layer(&self.config.allowed_origins))
    }

    /// Bind the configured address and serve until the process exits
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind {}", addr))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr().context("Failed to read listener address")?;
        info!("Starting API server on {}", addr);
        axum::serve(listener, self.router()).await.context("API server failed")?;
        Ok(())
    }
}

/// CORS for the configured origins, with credentials
///
/// Credentials rule out wildcard methods and headers, so the request's own
/// are mirrored back instead.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    debug!(?allowed_origins, "cors_layer: called");
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
