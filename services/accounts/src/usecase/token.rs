use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::domain::repository::{CredentialHasher, UserRepository};
use crate::domain::types::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, normalize_email};
use crate::error::AccountsServiceError;

/// JWT claims for both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
) -> Result<(String, u64), AccountsServiceError> {
    let exp = now_secs() + ACCESS_TOKEN_TTL_SECS;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AccountsServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

pub fn issue_refresh_token(user_id: Uuid, secret: &str) -> Result<String, AccountsServiceError> {
    let exp = now_secs() + REFRESH_TOKEN_TTL_SECS;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AccountsServiceError::Internal(e.into()))
}

/// Validate a token and return the user id it was issued for.
pub fn validate_token(token: &str, secret: &str) -> Result<Uuid, AccountsServiceError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AccountsServiceError::InvalidToken)?;

    data.claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AccountsServiceError::InvalidToken)
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct LoginUseCase<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    pub users: U,
    pub hasher: H,
    pub jwt_secret: String,
}

impl<U, H> LoginUseCase<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    /// Credential check followed by the verification gate: a correct password
    /// on an unverified account fails with `AccountNotVerified`, never with
    /// a token.
    pub async fn execute(&self, input: LoginInput) -> Result<TokenPair, AccountsServiceError> {
        let email = normalize_email(&input.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AccountsServiceError::InvalidCredentials)?;

        if !self.hasher.verify(&input.password, &user.password_hash)? {
            return Err(AccountsServiceError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AccountsServiceError::AccountNotVerified);
        }

        self.users.record_login(user.id).await?;

        let (access_token, access_token_exp) = issue_access_token(user.id, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token(user.id, &self.jwt_secret)?;

        Ok(TokenPair {
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<TokenPair, AccountsServiceError> {
        let user_id = validate_token(refresh_token_value, &self.jwt_secret)
            .map_err(|_| AccountsServiceError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountsServiceError::InvalidRefreshToken)?;

        let (access_token, access_token_exp) = issue_access_token(user.id, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token(user.id, &self.jwt_secret)?;

        Ok(TokenPair {
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}
