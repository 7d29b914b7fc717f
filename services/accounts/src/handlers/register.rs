use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AccountsServiceError;
use crate::handlers::profile::ProfileFields;
use crate::state::AppState;
use crate::usecase::otp::{IssueCodeUseCase, VerifyCodeUseCase};
use crate::usecase::register::{RegisterInput, RegisterUseCase, VerifyEmailUseCase};

// ── POST /accounts/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let profile = body.profile.into_patch()?;
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.hasher(),
        issuer: IssueCodeUseCase {
            codes: state.code_repo(),
            notifier: state.notifier(),
        },
    };
    usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            password_confirm: body.password_confirm,
            profile,
        })
        .await?;
    Ok(StatusCode::CREATED)
}

// ── POST /accounts/verify-email ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = VerifyEmailUseCase {
        verifier: VerifyCodeUseCase {
            users: state.user_repo(),
            codes: state.code_repo(),
        },
    };
    usecase.execute(&body.email, &body.code).await?;
    Ok(StatusCode::OK)
}
