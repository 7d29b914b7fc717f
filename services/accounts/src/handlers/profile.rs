use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::types::{ActivityLevel, FitnessGoal, Gender, ProfilePatch, UserAccount};
use crate::error::AccountsServiceError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::profile::{GetProfileUseCase, UpdateProfileUseCase};

/// Optional profile fields accepted at registration and profile update.
/// Enum-backed fields arrive as strings and are validated on parse.
#[derive(Deserialize, Default)]
pub struct ProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
}

impl ProfileFields {
    pub fn into_patch(self) -> Result<ProfilePatch, AccountsServiceError> {
        let gender = match self.gender.as_deref() {
            Some(s) => Some(Gender::parse(s).ok_or(AccountsServiceError::InvalidProfileField)?),
            None => None,
        };
        let goal = match self.goal.as_deref() {
            Some(s) => {
                Some(FitnessGoal::parse(s).ok_or(AccountsServiceError::InvalidProfileField)?)
            }
            None => None,
        };
        let activity_level = match self.activity_level.as_deref() {
            Some(s) => {
                Some(ActivityLevel::parse(s).ok_or(AccountsServiceError::InvalidProfileField)?)
            }
            None => None,
        };
        Ok(ProfilePatch {
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            gender,
            age: self.age,
            date_of_birth: self.date_of_birth,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            goal,
            activity_level,
        })
    }
}

// ── GET /accounts/@me ────────────────────────────────────────────────────────

/// Profile response. The password hash is deliberately absent.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub is_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<&'static str>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<&'static str>,
    pub activity_level: Option<&'static str>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Timestamps go out as RFC 3339 with 3-digit fractional seconds.
fn to_rfc3339_ms<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn to_rfc3339_ms_opt<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => to_rfc3339_ms(dt, s),
        None => s.serialize_none(),
    }
}

impl From<UserAccount> for ProfileResponse {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            is_verified: user.is_verified,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            gender: user.gender.map(Gender::as_str),
            age: user.age,
            date_of_birth: user.date_of_birth,
            height_cm: user.height_cm,
            weight_kg: user.weight_kg,
            goal: user.goal.map(FitnessGoal::as_str),
            activity_level: user.activity_level.map(ActivityLevel::as_str),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AccountsServiceError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}

// ── PATCH /accounts/@me ──────────────────────────────────────────────────────

pub async fn update_me(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ProfileFields>,
) -> Result<StatusCode, AccountsServiceError> {
    let patch = body.into_patch()?;
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    usecase.execute(identity.user_id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}
