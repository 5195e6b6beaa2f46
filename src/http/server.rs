//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Configure HTTP/1.1 and HTTP/2 support
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::routing::any;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::assets::{AssetStore, DirectoryAssets, NotFoundAssets};
use crate::config::RelayConfig;
use crate::http::cors::CorsPolicy;
use crate::http::forward::Forwarder;
use crate::http::relay::{dispatch, RelayState};
use crate::http::request::{request_id, MakeRelayRequestId};
use crate::observability::{DefaultObserver, ExchangeObserver};
use crate::routing::{ApiPathClassifier, TargetResolver};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build backend client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server whose asset fallback follows `config.assets`.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let assets: Arc<dyn AssetStore> = match &config.assets.root {
            Some(root) => Arc::new(DirectoryAssets::new(root)),
            None => Arc::new(NotFoundAssets),
        };
        Self::with_assets(config, assets)
    }

    /// Create a server with a custom asset fallback.
    pub fn with_assets(
        config: RelayConfig,
        assets: Arc<dyn AssetStore>,
    ) -> Result<Self, ServerError> {
        Self::from_parts(config, assets, Arc::new(DefaultObserver))
    }

    /// Create a server with a custom asset fallback and exchange observer.
    pub fn from_parts(
        config: RelayConfig,
        assets: Arc<dyn AssetStore>,
        observer: Arc<dyn ExchangeObserver>,
    ) -> Result<Self, ServerError> {
        let state = RelayState {
            classifier: Arc::new(ApiPathClassifier::new(config.proxy.public_prefix.clone())),
            resolver: Arc::new(TargetResolver::from_config(&config.proxy)),
            forwarder: Forwarder::new(&config.timeouts, observer)?,
            cors: Arc::new(CorsPolicy::standard()),
            assets,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: RelayState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRelayRequestId))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            public_prefix = %self.config.proxy.public_prefix,
            backend_origin = %self.config.proxy.backend_origin,
            backend_prefix = %self.config.proxy.backend_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_router_answers_preflight_with_request_id() {
        let server = HttpServer::new(RelayConfig::default()).unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_router_keeps_incoming_request_id() {
        let server = HttpServer::new(RelayConfig::default()).unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api")
                    .header("x-request-id", "fixed-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "fixed-id");
    }

    #[tokio::test]
    async fn test_root_goes_to_assets() {
        let server = HttpServer::new(RelayConfig::default()).unwrap();

        let response = server
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
