use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    health::{healthz, readyz},
    password::{change_password, confirm_password_change, confirm_reset, request_reset},
    profile::{get_me, update_me},
    register::{register, verify_email},
    token::{login, refresh_token},
};
use crate::middleware::request_id_layer;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration and verification
        .route("/accounts/register", post(register))
        .route("/accounts/verify-email", post(verify_email))
        // Tokens
        .route("/accounts/login", post(login))
        .route("/accounts/token/refresh", post(refresh_token))
        // Password reset (unauthenticated)
        .route("/accounts/password-reset", post(request_reset))
        .route("/accounts/password-reset/confirm", post(confirm_reset))
        // Password change (authenticated)
        .route("/accounts/@me/password", post(change_password))
        .route(
            "/accounts/@me/password/confirm",
            post(confirm_password_change),
        )
        // Profile
        .route("/accounts/@me", get(get_me).patch(update_me))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
