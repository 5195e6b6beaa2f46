//! Request pipeline.
//!
//! ```text
//! dispatch ── not API ──▶ asset fallback
//!    │ API
//!    ▼
//! relay: OPTIONS ──▶ preflight answer ─────────────┐
//!        otherwise ─▶ resolve ─▶ forward ──────────┤
//!                       └── failure ─▶ error body ─┤
//!                                                  ▼
//!                                          CORS policy (once)
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::assets::AssetStore;
use crate::http::cors::CorsPolicy;
use crate::http::error::RelayError;
use crate::http::forward::Forwarder;
use crate::http::preflight;
use crate::http::request::{request_id, OutboundRequest};
use crate::observability::metrics;
use crate::routing::{ApiPathClassifier, TargetResolver};

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct RelayState {
    pub classifier: Arc<ApiPathClassifier>,
    pub resolver: Arc<TargetResolver>,
    pub forwarder: Forwarder,
    pub cors: Arc<CorsPolicy>,
    pub assets: Arc<dyn AssetStore>,
}

/// Entry handler: API traffic is relayed, everything else goes to the assets.
pub async fn dispatch(State(state): State<RelayState>, request: Request<Body>) -> Response {
    if state.classifier.is_api_path(request.uri().path()) {
        relay(&state, request).await
    } else {
        metrics::record_asset();
        state.assets.fetch(request).await
    }
}

/// Answer one API request. The CORS policy is applied to whatever comes out.
pub async fn relay(state: &RelayState, request: Request<Body>) -> Response {
    let response = if preflight::is_preflight(request.method()) {
        metrics::record_preflight();
        preflight::answer()
    } else {
        let request_id = request_id(&request).to_string();
        match proxy(state, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Relay failed");
                e.into_response()
            }
        }
    };

    state.cors.apply(response)
}

async fn proxy(state: &RelayState, request: Request<Body>) -> Result<Response, RelayError> {
    let target = state
        .resolver
        .resolve(request.uri().path(), request.uri().query())?;

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        target = %target,
        "Proxying request"
    );

    let outbound = OutboundRequest::from_incoming(request, target);
    Ok(state.forwarder.forward(outbound).await?)
}
