use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{
    CredentialHasher, Notifier, OneTimeCodeRepository, UserRepository,
};
use crate::domain::types::{CodePurpose, ProfilePatch, UserAccount, normalize_email};
use crate::error::AccountsServiceError;
use crate::usecase::otp::{IssueCodeUseCase, VerifyCodeUseCase};

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub profile: ProfilePatch,
}

pub struct RegisterUseCase<U, C, N, H>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: Notifier,
    H: CredentialHasher,
{
    pub users: U,
    pub hasher: H,
    pub issuer: IssueCodeUseCase<C, N>,
}

impl<U, C, N, H> RegisterUseCase<U, C, N, H>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    N: Notifier,
    H: CredentialHasher,
{
    /// Create an unverified account and send the signup code.
    /// No token is issued; authentication is gated on verification.
    pub async fn execute(&self, input: RegisterInput) -> Result<(), AccountsServiceError> {
        if input.password != input.password_confirm {
            return Err(AccountsServiceError::PasswordMismatch);
        }

        let email = normalize_email(&input.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountsServiceError::EmailTaken);
        }

        let now = Utc::now();
        let user = UserAccount {
            id: Uuid::new_v4(),
            email,
            password_hash: self.hasher.hash(&input.password)?,
            is_verified: false,
            first_name: input.profile.first_name,
            last_name: input.profile.last_name,
            phone_number: input.profile.phone_number,
            gender: input.profile.gender,
            age: input.profile.age,
            date_of_birth: input.profile.date_of_birth,
            height_cm: input.profile.height_cm,
            weight_kg: input.profile.weight_kg,
            goal: input.profile.goal,
            activity_level: input.profile.activity_level,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        self.users.create(&user).await?;
        self.issuer.execute(&user, CodePurpose::Signup).await?;

        Ok(())
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<U, C>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
{
    pub verifier: VerifyCodeUseCase<U, C>,
}

impl<U, C> VerifyEmailUseCase<U, C>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
{
    /// Redeem a signup code, flipping the verification flag.
    pub async fn execute(&self, email: &str, code: &str) -> Result<(), AccountsServiceError> {
        self.verifier
            .execute(email, code, CodePurpose::Signup, |user| {
                user.is_verified = true;
            })
            .await?;
        Ok(())
    }
}
