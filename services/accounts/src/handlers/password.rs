use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AccountsServiceError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::otp::{IssueCodeUseCase, VerifyCodeUseCase};
use crate::usecase::password::{
    ChangePasswordInput, ChangePasswordUseCase, ConfirmPasswordChangeUseCase,
    ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, RequestPasswordResetUseCase,
};

// ── POST /accounts/password-reset ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

pub async fn request_reset(
    State(state): State<AppState>,
    Json(body): Json<RequestResetRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = RequestPasswordResetUseCase {
        users: state.user_repo(),
        issuer: IssueCodeUseCase {
            codes: state.code_repo(),
            notifier: state.notifier(),
        },
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /accounts/password-reset/confirm ────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfirmResetRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    Json(body): Json<ConfirmResetRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = ConfirmPasswordResetUseCase {
        verifier: VerifyCodeUseCase {
            users: state.user_repo(),
            codes: state.code_repo(),
        },
        hasher: state.hasher(),
    };
    usecase
        .execute(ConfirmPasswordResetInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::OK)
}

// ── POST /accounts/@me/password ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn change_password(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        pending: state.pending_repo(),
        hasher: state.hasher(),
        issuer: IssueCodeUseCase {
            codes: state.code_repo(),
            notifier: state.notifier(),
        },
    };
    usecase
        .execute(ChangePasswordInput {
            user_id: identity.user_id,
            old_password: body.old_password,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
        })
        .await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /accounts/@me/password/confirm ──────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfirmChangeRequest {
    pub code: String,
}

pub async fn confirm_password_change(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ConfirmChangeRequest>,
) -> Result<StatusCode, AccountsServiceError> {
    let usecase = ConfirmPasswordChangeUseCase {
        users: state.user_repo(),
        pending: state.pending_repo(),
        verifier: VerifyCodeUseCase {
            users: state.user_repo(),
            codes: state.code_repo(),
        },
    };
    usecase.execute(identity.user_id, &body.code).await?;
    Ok(StatusCode::OK)
}
