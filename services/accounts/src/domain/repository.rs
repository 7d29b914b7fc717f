#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    CodePurpose, Mail, OneTimeCode, PendingPasswordReset, ProfilePatch, UserAccount,
};
use crate::error::AccountsServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    /// Lookup by normalized (lowercased) email.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<UserAccount>, AccountsServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AccountsServiceError>;

    /// Insert a new account. The email column is unique; a duplicate insert
    /// (e.g. two racing registrations) fails with `EmailTaken`.
    async fn create(&self, user: &UserAccount) -> Result<(), AccountsServiceError>;

    /// Persist the credential-bearing columns (`is_verified`, `password_hash`).
    /// Called by the code verifier after its success effect has run.
    async fn save_credentials(&self, user: &UserAccount) -> Result<(), AccountsServiceError>;

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), AccountsServiceError>;

    async fn record_login(&self, id: Uuid) -> Result<(), AccountsServiceError>;
}

/// Repository for one-time codes.
pub trait OneTimeCodeRepository: Send + Sync {
    /// Find the newest code row matching (user, code, purpose), in any state.
    /// Used and expired rows are returned so the verifier can distinguish
    /// "never existed" from "no longer valid".
    async fn find_latest(
        &self,
        user_id: Uuid,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<Option<OneTimeCode>, AccountsServiceError>;

    /// In one transaction: mark every still-active code for the same
    /// (user, purpose) as used, then insert the new code.
    async fn supersede_and_create(&self, code: &OneTimeCode)
    -> Result<(), AccountsServiceError>;

    /// Atomically mark a code used: `SET used_at = now WHERE id = ? AND
    /// used_at IS NULL`. Returns whether a row was affected — `false` means
    /// a concurrent verification already consumed it.
    async fn consume(&self, id: Uuid) -> Result<bool, AccountsServiceError>;
}

/// Repository for pending authenticated password changes.
pub trait PendingResetRepository: Send + Sync {
    /// In one transaction: mark prior active pending resets for the user
    /// consumed, then insert the new record.
    async fn supersede_and_create(
        &self,
        pending: &PendingPasswordReset,
    ) -> Result<(), AccountsServiceError>;

    /// Find the user's active (unconsumed, unexpired) pending reset, if any.
    async fn find_active(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PendingPasswordReset>, AccountsServiceError>;

    /// Atomic conditional consume, same shape as `OneTimeCodeRepository::consume`.
    async fn consume(&self, id: Uuid) -> Result<bool, AccountsServiceError>;
}

/// Outbound email port. Delivery is best-effort: callers log failures and
/// never propagate them to the client.
pub trait Notifier: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), AccountsServiceError>;
}

/// Password hashing port (argon2 in production, a plain codec in tests).
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AccountsServiceError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AccountsServiceError>;
}
