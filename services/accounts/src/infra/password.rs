use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use crate::domain::repository::CredentialHasher;
use crate::error::AccountsServiceError;

/// Argon2id password hasher producing PHC-format strings.
#[derive(Clone, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AccountsServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountsServiceError::Internal(anyhow::anyhow!("hash password: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AccountsServiceError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AccountsServiceError::Internal(anyhow::anyhow!("parse stored hash: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
