use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Accounts service domain error variants.
///
/// `InvalidCode` and `ExpiredOrUsedCode` intentionally share one
/// caller-visible kind and message, so responses never confirm whether a
/// submitted code ever existed. The variants stay distinct for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum AccountsServiceError {
    #[error("email already registered")]
    EmailTaken,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("invalid profile field")]
    InvalidProfileField,
    #[error("missing data")]
    MissingData,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account not verified")]
    AccountNotVerified,
    #[error("old password is incorrect")]
    CredentialMismatch,
    #[error("invalid or expired code")]
    InvalidCode,
    #[error("invalid or expired code")]
    ExpiredOrUsedCode,
    #[error("no pending password change")]
    NoPendingReset,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccountsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidProfileField => "INVALID_PROFILE_FIELD",
            Self::MissingData => "MISSING_DATA",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            Self::CredentialMismatch => "CREDENTIAL_MISMATCH",
            Self::InvalidCode | Self::ExpiredOrUsedCode => "INVALID_CODE",
            Self::NoPendingReset => "NO_PENDING_RESET",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AccountsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::PasswordMismatch
            | Self::InvalidProfileField
            | Self::MissingData
            | Self::CredentialMismatch
            | Self::InvalidCode
            | Self::ExpiredOrUsedCode
            | Self::NoPendingReset => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidToken | Self::InvalidRefreshToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccountNotVerified => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        // Keep the expired/used case distinguishable in logs even though the
        // response body is indistinguishable from InvalidCode.
        if matches!(self, Self::ExpiredOrUsedCode) {
            tracing::debug!("code rejected: expired or already used");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
