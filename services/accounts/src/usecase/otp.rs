use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{Notifier, OneTimeCodeRepository, UserRepository};
use crate::domain::types::{
    CODE_LEN, CODE_TTL_SECS, CodePurpose, Mail, OneTimeCode, UserAccount, normalize_email,
};
use crate::error::AccountsServiceError;

/// Generate a uniformly random zero-padded numeric code.
fn generate_code() -> String {
    let mut rng = rand::rng();
    let bound = 10u32.pow(CODE_LEN as u32);
    format!("{:0width$}", rng.random_range(0..bound), width = CODE_LEN)
}

// ── IssueCode ────────────────────────────────────────────────────────────────

pub struct IssueCodeUseCase<C, N>
where
    C: OneTimeCodeRepository,
    N: Notifier,
{
    pub codes: C,
    pub notifier: N,
}

impl<C, N> IssueCodeUseCase<C, N>
where
    C: OneTimeCodeRepository,
    N: Notifier,
{
    /// Issue a fresh code for (user, purpose), superseding any still-active
    /// codes for the same pair, and email it to the user.
    ///
    /// Delivery is best-effort: once the row is persisted the call reports
    /// success even if the email could not be handed off.
    pub async fn execute(
        &self,
        user: &UserAccount,
        purpose: CodePurpose,
    ) -> Result<String, AccountsServiceError> {
        let code_str = generate_code();
        let now = Utc::now();
        let code = OneTimeCode {
            id: Uuid::new_v4(),
            user_id: user.id,
            code: code_str.clone(),
            purpose,
            expires_at: now + Duration::seconds(CODE_TTL_SECS),
            used_at: None,
            created_at: now,
        };

        self.codes.supersede_and_create(&code).await?;

        let mail = Mail {
            to: user.email.clone(),
            subject: purpose.mail_subject().to_owned(),
            body: format!(
                "Your verification code is: {code_str}\n\nIt expires in {} minutes.",
                CODE_TTL_SECS / 60
            ),
        };
        if let Err(e) = self.notifier.send(&mail).await {
            tracing::warn!(error = %e, purpose = purpose.as_str(), "failed to deliver one-time code email");
        }

        Ok(code_str)
    }
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

pub struct VerifyCodeUseCase<U, C>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
{
    pub users: U,
    pub codes: C,
}

impl<U, C> VerifyCodeUseCase<U, C>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
{
    /// Validate (email, code, purpose) and, on success, apply `effect` to the
    /// user and persist the credential columns.
    ///
    /// The code is consumed through an atomic conditional update *before* the
    /// effect runs, so two racing verifications can apply the effect at most
    /// once: the loser's `consume` affects zero rows and fails here.
    pub async fn execute<F>(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        effect: F,
    ) -> Result<UserAccount, AccountsServiceError>
    where
        F: FnOnce(&mut UserAccount),
    {
        let email = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AccountsServiceError::InvalidCode)?;

        let record = self
            .codes
            .find_latest(user.id, code, purpose)
            .await?
            .ok_or(AccountsServiceError::InvalidCode)?;

        if !record.is_valid() {
            return Err(AccountsServiceError::ExpiredOrUsedCode);
        }

        if !self.codes.consume(record.id).await? {
            // Lost the race against a concurrent verification.
            return Err(AccountsServiceError::ExpiredOrUsedCode);
        }

        effect(&mut user);
        self.users.save_credentials(&user).await?;

        Ok(user)
    }
}
