use crate::config::ServerConfig;
use crate::session::{OfferError, SessionRegistry, TunnelSession};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use viaduct_core::SessionDocument;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: SessionRegistry,
}

/// Signaling routes. CORS is permissive: the offer side is typically a
/// browser UI served from another origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sdp", post(accept_offer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// One offer in, one finalized answer out. The session stays alive
/// past the response; it is torn down by its own lifecycle callbacks.
async fn accept_offer(
    State(state): State<AppState>,
    Json(offer): Json<SessionDocument>,
) -> Result<Json<SessionDocument>, ApiError> {
    info!("received SDP offer, opening tunnel session");

    let session = TunnelSession::open(&state.config, state.registry.clone())
        .await
        .map_err(ApiError::Internal)?;

    match session.answer_offer(offer).await {
        Ok(answer) => Ok(Json(answer)),
        Err(err) => {
            warn!("session {} rejected: {err}", session.id());
            state.registry.release(session.id());
            Err(err.into())
        }
    }
}

enum ApiError {
    Rejected(String),
    Internal(anyhow::Error),
}

impl From<OfferError> for ApiError {
    fn from(err: OfferError) -> Self {
        match err {
            OfferError::NotAnOffer | OfferError::MalformedSdp(_) => {
                ApiError::Rejected(err.to_string())
            }
            OfferError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Rejected(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
            ApiError::Internal(err) => {
                error!("failed to answer offer: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned()).into_response()
            }
        }
    }
}
