use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Workflow a one-time code is scoped to. Codes are not cross-redeemable:
/// a signup code cannot confirm a password reset and vice versa.
/// `Login` is reserved; no entry point issues it today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    Signup,
    Login,
    PasswordReset,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Login => "login",
            Self::PasswordReset => "password_reset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "signup" => Some(Self::Signup),
            "login" => Some(Self::Login),
            "password_reset" => Some(Self::PasswordReset),
            _ => None,
        }
    }

    pub fn mail_subject(self) -> &'static str {
        match self {
            Self::Signup => "Verify your email address",
            Self::Login => "Your login code",
            Self::PasswordReset => "Password reset code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessGoal {
    WeightLoss,
    TryAiCoach,
    GainEndurance,
}

impl FitnessGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::TryAiCoach => "try_ai_coach",
            Self::GainEndurance => "gain_endurance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weight_loss" => Some(Self::WeightLoss),
            "try_ai_coach" => Some(Self::TryAiCoach),
            "gain_endurance" => Some(Self::GainEndurance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// User account with credentials and optional fitness profile.
/// `is_verified` only ever transitions false → true.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<FitnessGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<FitnessGoal>,
    pub activity_level: Option<ActivityLevel>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.gender.is_none()
            && self.age.is_none()
            && self.date_of_birth.is_none()
            && self.height_cm.is_none()
            && self.weight_kg.is_none()
            && self.goal.is_none()
            && self.activity_level.is_none()
    }
}

/// One-time code proving email ownership or reset authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub purpose: CodePurpose,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_valid(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Pending authenticated password change awaiting code confirmation.
/// Holds the hashed new password server-side so the client never
/// resupplies it at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub new_password_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PendingPasswordReset {
    pub fn is_active(&self) -> bool {
        self.consumed_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Outbound email message handed to the notifier.
#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Lowercase + trim. Emails are compared and stored in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// One-time code length in digits.
pub const CODE_LEN: usize = 6;

/// One-time code time-to-live in seconds (10 minutes).
pub const CODE_TTL_SECS: i64 = 600;

/// Pending password change time-to-live in seconds (same window as codes).
pub const PENDING_RESET_TTL_SECS: i64 = 600;

/// Access-token JWT lifetime in seconds (1 hour).
pub const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// Refresh-token JWT lifetime in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: u64 = 604_800;
