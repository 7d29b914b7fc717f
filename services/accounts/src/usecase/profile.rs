use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::{ProfilePatch, UserAccount};
use crate::error::AccountsServiceError;

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserAccount, AccountsServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        patch: ProfilePatch,
    ) -> Result<(), AccountsServiceError> {
        if patch.is_empty() {
            return Err(AccountsServiceError::MissingData);
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AccountsServiceError::UserNotFound);
        }
        self.users.update_profile(user_id, &patch).await
    }
}
