use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::repository::{
    CredentialHasher, Notifier, OneTimeCodeRepository, PendingResetRepository, UserRepository,
};
use crate::domain::types::{
    CodePurpose, PENDING_RESET_TTL_SECS, PendingPasswordReset, normalize_email,
};
use crate::error::AccountsServiceError;
use crate::usecase::otp::{IssueCodeUseCase, VerifyCodeUseCase};

// ── RequestPasswordReset (unauthenticated, "forgot password") ────────────────

pub struct RequestPasswordResetUseCase<U, C, N>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: Notifier,
{
    pub users: U,
    pub issuer: IssueCodeUseCase<C, N>,
}

impl<U, C, N> RequestPasswordResetUseCase<U, C, N>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: Notifier,
{
    pub async fn execute(&self, email: &str) -> Result<(), AccountsServiceError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)?;

        self.issuer
            .execute(&user, CodePurpose::PasswordReset)
            .await?;
        Ok(())
    }
}

// ── ConfirmPasswordReset (unauthenticated) ───────────────────────────────────

pub struct ConfirmPasswordResetInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct ConfirmPasswordResetUseCase<U, C, H>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    H: CredentialHasher,
{
    pub verifier: VerifyCodeUseCase<U, C>,
    pub hasher: H,
}

impl<U, C, H> ConfirmPasswordResetUseCase<U, C, H>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    H: CredentialHasher,
{
    /// Redeem a reset code and replace the credential with the supplied
    /// password. Hashing happens before the code is consumed so a hashing
    /// failure cannot burn a still-valid code.
    pub async fn execute(
        &self,
        input: ConfirmPasswordResetInput,
    ) -> Result<(), AccountsServiceError> {
        let new_hash = self.hasher.hash(&input.new_password)?;
        self.verifier
            .execute(
                &input.email,
                &input.code,
                CodePurpose::PasswordReset,
                |user| {
                    user.password_hash = new_hash;
                },
            )
            .await?;
        Ok(())
    }
}

// ── ChangePassword (authenticated) ───────────────────────────────────────────

pub struct ChangePasswordInput {
    pub user_id: Uuid,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ChangePasswordUseCase<U, C, N, P, H>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: Notifier,
    P: PendingResetRepository,
    H: CredentialHasher,
{
    pub users: U,
    pub pending: P,
    pub hasher: H,
    pub issuer: IssueCodeUseCase<C, N>,
}

impl<U, C, N, P, H> ChangePasswordUseCase<U, C, N, P, H>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: Notifier,
    P: PendingResetRepository,
    H: CredentialHasher,
{
    /// Authenticated variant: requires the current password, parks the hashed
    /// new password in a pending record, and emails a confirmation code.
    /// The new password never travels with the confirmation request.
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), AccountsServiceError> {
        if input.new_password != input.confirm_password {
            return Err(AccountsServiceError::PasswordMismatch);
        }

        let user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)?;

        if !self
            .hasher
            .verify(&input.old_password, &user.password_hash)?
        {
            return Err(AccountsServiceError::CredentialMismatch);
        }

        let now = Utc::now();
        let pending = PendingPasswordReset {
            id: Uuid::new_v4(),
            user_id: user.id,
            new_password_hash: self.hasher.hash(&input.new_password)?,
            expires_at: now + Duration::seconds(PENDING_RESET_TTL_SECS),
            consumed_at: None,
            created_at: now,
        };
        self.pending.supersede_and_create(&pending).await?;

        self.issuer
            .execute(&user, CodePurpose::PasswordReset)
            .await?;
        Ok(())
    }
}

// ── ConfirmPasswordChange (authenticated) ────────────────────────────────────

pub struct ConfirmPasswordChangeUseCase<U, C, P>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    P: PendingResetRepository,
{
    pub users: U,
    pub pending: P,
    pub verifier: VerifyCodeUseCase<U, C>,
}

impl<U, C, P> ConfirmPasswordChangeUseCase<U, C, P>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    P: PendingResetRepository,
{
    pub async fn execute(&self, user_id: Uuid, code: &str) -> Result<(), AccountsServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)?;

        let pending = self
            .pending
            .find_active(user_id)
            .await?
            .ok_or(AccountsServiceError::NoPendingReset)?;

        let new_hash = pending.new_password_hash.clone();
        self.verifier
            .execute(&user.email, code, CodePurpose::PasswordReset, |user| {
                user.password_hash = new_hash;
            })
            .await?;

        // The code consume above is the effect guard; consuming the pending
        // record afterwards just retires it.
        self.pending.consume(pending.id).await?;
        Ok(())
    }
}
