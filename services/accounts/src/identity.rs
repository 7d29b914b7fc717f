//! Bearer-token identity extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AccountsServiceError;
use crate::state::AppState;
use crate::usecase::token::validate_token;

/// Authenticated caller identity, extracted from the `Authorization: Bearer`
/// header and validated against the service JWT secret.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AccountsServiceError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_owned);
        let secret = state.jwt_secret.clone();

        async move {
            let token = token.ok_or(AccountsServiceError::InvalidToken)?;
            let user_id = validate_token(&token, &secret)?;
            Ok(Self { user_id })
        }
    }
}
