use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use pk_auth::{AuthError, TokenSigner, TokenVerifier};

use crate::handlers::{check_auth, login, logout, refresh_token, register};
use crate::metrics::AuthMetrics;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub signer: Arc<TokenSigner>,
    pub verifier: Arc<TokenVerifier>,
    pub metrics: Arc<AuthMetrics>,
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl AppState {
    /// Counts a turned-away token. A missing Authorization header is not
    /// a rejected token, so it stays out of the counter.
    pub fn record_token_rejection(&self, err: &AuthError) {
        if !matches!(err, AuthError::MissingAuthorization) {
            self.metrics.token_rejected(err.kind());
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "failed to render metrics");
            Response::new(axum::body::Body::empty())
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/check", get(check_auth))
        .route("/auth/refresh", post(refresh_token))
        .with_state(state)
}
