//! HTTP ingress: gateway events in, liveness check out.
//!
//! The gateway relay POSTs presence updates and command invocations here;
//! parsed events are forwarded to the dispatcher over the inbound queue.
//! `GET /` is the plain liveness endpoint the hosting platform polls.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use tokio::sync::mpsc;

use crate::dispatch::GatewayEvent;

const INGRESS_TOKEN_HEADER: &str = "x-studybell-ingress-token";
const LIVENESS_BODY: &str = "StudyBell server is online.";

#[derive(Clone)]
struct IngressState {
    tx: mpsc::Sender<GatewayEvent>,
    ingress_token: Option<String>,
}

/// Builds the ingress router.
///
/// When `ingress_token` is set, `POST /gateway` requires the matching
/// shared-secret header.
pub fn router(tx: mpsc::Sender<GatewayEvent>, ingress_token: Option<String>) -> Router {
    let state = IngressState { tx, ingress_token };
    Router::new()
        .route("/", get(handle_liveness))
        .route("/gateway", post(handle_gateway))
        .with_state(state)
}

async fn handle_liveness() -> &'static str {
    tracing::info!("health check ping received");
    LIVENESS_BODY
}

async fn handle_gateway(
    State(state): State<IngressState>,
    headers: HeaderMap,
    Json(event): Json<GatewayEvent>,
) -> Result<StatusCode, (StatusCode, String)> {
    if let Some(expected) = state.ingress_token.as_deref() {
        let provided = headers
            .get(INGRESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if provided != expected {
            return Err((
                StatusCode::UNAUTHORIZED,
                "invalid ingress token".to_string(),
            ));
        }
    }

    // try_send keeps the handler non-blocking: a full or closed queue is the
    // relay's cue to back off, not a reason to hold the connection open.
    if let Err(error) = state.tx.try_send(event) {
        match error {
            mpsc::error::TrySendError::Full(_) => tracing::warn!("inbound queue full"),
            mpsc::error::TrySendError::Closed(_) => tracing::error!("inbound queue closed"),
        }
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "inbound queue unavailable".to_string(),
        ));
    }

    Ok(StatusCode::OK)
}
