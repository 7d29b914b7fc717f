use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use fitbase_accounts_schema::{one_time_codes, pending_password_resets, users};

use crate::domain::repository::{OneTimeCodeRepository, PendingResetRepository, UserRepository};
use crate::domain::types::{
    ActivityLevel, CodePurpose, FitnessGoal, Gender, OneTimeCode, PendingPasswordReset,
    ProfilePatch, UserAccount,
};
use crate::error::AccountsServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, AccountsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AccountsServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &UserAccount) -> Result<(), AccountsServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_verified: Set(user.is_verified),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            phone_number: Set(user.phone_number.clone()),
            gender: Set(user.gender.map(Gender::as_str).map(str::to_owned)),
            age: Set(user.age),
            date_of_birth: Set(user.date_of_birth),
            height_cm: Set(user.height_cm),
            weight_kg: Set(user.weight_kg),
            goal: Set(user.goal.map(FitnessGoal::as_str).map(str::to_owned)),
            activity_level: Set(user
                .activity_level
                .map(ActivityLevel::as_str)
                .map(str::to_owned)),
            last_login_at: Set(user.last_login_at),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;

        // The usecase pre-checks the email, but two racing registrations can
        // both pass it; the unique index is the authority.
        match result {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AccountsServiceError::EmailTaken)
            }
            Err(e) => Err(anyhow::Error::from(e).context("create user").into()),
        }
    }

    async fn save_credentials(&self, user: &UserAccount) -> Result<(), AccountsServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            is_verified: Set(user.is_verified),
            password_hash: Set(user.password_hash.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("save user credentials")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), AccountsServiceError> {
        let mut model = users::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(ref v) = patch.first_name {
            model.first_name = Set(Some(v.clone()));
        }
        if let Some(ref v) = patch.last_name {
            model.last_name = Set(Some(v.clone()));
        }
        if let Some(ref v) = patch.phone_number {
            model.phone_number = Set(Some(v.clone()));
        }
        if let Some(v) = patch.gender {
            model.gender = Set(Some(v.as_str().to_owned()));
        }
        if let Some(v) = patch.age {
            model.age = Set(Some(v));
        }
        if let Some(v) = patch.date_of_birth {
            model.date_of_birth = Set(Some(v));
        }
        if let Some(v) = patch.height_cm {
            model.height_cm = Set(Some(v));
        }
        if let Some(v) = patch.weight_kg {
            model.weight_kg = Set(Some(v));
        }
        if let Some(v) = patch.goal {
            model.goal = Set(Some(v.as_str().to_owned()));
        }
        if let Some(v) = patch.activity_level {
            model.activity_level = Set(Some(v.as_str().to_owned()));
        }
        model.update(&self.db).await.context("update profile")?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid) -> Result<(), AccountsServiceError> {
        users::ActiveModel {
            id: Set(id),
            last_login_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record login")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> UserAccount {
    UserAccount {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        is_verified: model.is_verified,
        first_name: model.first_name,
        last_name: model.last_name,
        phone_number: model.phone_number,
        gender: model.gender.as_deref().and_then(Gender::parse),
        age: model.age,
        date_of_birth: model.date_of_birth,
        height_cm: model.height_cm,
        weight_kg: model.weight_kg,
        goal: model.goal.as_deref().and_then(FitnessGoal::parse),
        activity_level: model
            .activity_level
            .as_deref()
            .and_then(ActivityLevel::parse),
        last_login_at: model.last_login_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── OneTimeCode repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOneTimeCodeRepository {
    pub db: DatabaseConnection,
}

impl OneTimeCodeRepository for DbOneTimeCodeRepository {
    async fn find_latest(
        &self,
        user_id: Uuid,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<Option<OneTimeCode>, AccountsServiceError> {
        let model = one_time_codes::Entity::find()
            .filter(one_time_codes::Column::UserId.eq(user_id))
            .filter(one_time_codes::Column::Code.eq(code))
            .filter(one_time_codes::Column::Purpose.eq(purpose.as_str()))
            .order_by_desc(one_time_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find one-time code")?;
        Ok(model.and_then(code_from_model))
    }

    async fn supersede_and_create(
        &self,
        code: &OneTimeCode,
    ) -> Result<(), AccountsServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    invalidate_active_codes(txn, code.user_id, code.purpose).await?;
                    insert_code(txn, &code).await?;
                    Ok(())
                })
            })
            .await
            .context("supersede and create one-time code")?;
        Ok(())
    }

    async fn consume(&self, id: Uuid) -> Result<bool, AccountsServiceError> {
        // Conditional update, not read-then-write: of two racing consumers
        // exactly one sees rows_affected == 1.
        let result = one_time_codes::Entity::update_many()
            .col_expr(one_time_codes::Column::UsedAt, Expr::value(Some(Utc::now())))
            .filter(one_time_codes::Column::Id.eq(id))
            .filter(one_time_codes::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("consume one-time code")?;
        Ok(result.rows_affected > 0)
    }
}

async fn invalidate_active_codes(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    purpose: CodePurpose,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    one_time_codes::Entity::update_many()
        .col_expr(one_time_codes::Column::UsedAt, Expr::value(Some(now)))
        .filter(one_time_codes::Column::UserId.eq(user_id))
        .filter(one_time_codes::Column::Purpose.eq(purpose.as_str()))
        .filter(one_time_codes::Column::UsedAt.is_null())
        .filter(one_time_codes::Column::ExpiresAt.gt(now))
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_code(
    txn: &DatabaseTransaction,
    code: &OneTimeCode,
) -> Result<(), sea_orm::DbErr> {
    one_time_codes::ActiveModel {
        id: Set(code.id),
        user_id: Set(code.user_id),
        code: Set(code.code.clone()),
        purpose: Set(code.purpose.as_str().to_owned()),
        expires_at: Set(code.expires_at),
        used_at: Set(None),
        created_at: Set(code.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn code_from_model(model: one_time_codes::Model) -> Option<OneTimeCode> {
    Some(OneTimeCode {
        id: model.id,
        user_id: model.user_id,
        code: model.code,
        purpose: CodePurpose::parse(&model.purpose)?,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    })
}

// ── PendingReset repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPendingResetRepository {
    pub db: DatabaseConnection,
}

impl PendingResetRepository for DbPendingResetRepository {
    async fn supersede_and_create(
        &self,
        pending: &PendingPasswordReset,
    ) -> Result<(), AccountsServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let pending = pending.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    pending_password_resets::Entity::update_many()
                        .col_expr(
                            pending_password_resets::Column::ConsumedAt,
                            Expr::value(Some(now)),
                        )
                        .filter(pending_password_resets::Column::UserId.eq(pending.user_id))
                        .filter(pending_password_resets::Column::ConsumedAt.is_null())
                        .exec(txn)
                        .await?;

                    pending_password_resets::ActiveModel {
                        id: Set(pending.id),
                        user_id: Set(pending.user_id),
                        new_password_hash: Set(pending.new_password_hash.clone()),
                        expires_at: Set(pending.expires_at),
                        consumed_at: Set(None),
                        created_at: Set(pending.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("supersede and create pending reset")?;
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PendingPasswordReset>, AccountsServiceError> {
        let now = Utc::now();
        let model = pending_password_resets::Entity::find()
            .filter(pending_password_resets::Column::UserId.eq(user_id))
            .filter(pending_password_resets::Column::ConsumedAt.is_null())
            .filter(pending_password_resets::Column::ExpiresAt.gt(now))
            .order_by_desc(pending_password_resets::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find active pending reset")?;
        Ok(model.map(pending_from_model))
    }

    async fn consume(&self, id: Uuid) -> Result<bool, AccountsServiceError> {
        let result = pending_password_resets::Entity::update_many()
            .col_expr(
                pending_password_resets::Column::ConsumedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(pending_password_resets::Column::Id.eq(id))
            .filter(pending_password_resets::Column::ConsumedAt.is_null())
            .exec(&self.db)
            .await
            .context("consume pending reset")?;
        Ok(result.rows_affected > 0)
    }
}

fn pending_from_model(model: pending_password_resets::Model) -> PendingPasswordReset {
    PendingPasswordReset {
        id: model.id,
        user_id: model.user_id,
        new_password_hash: model.new_password_hash,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        created_at: model.created_at,
    }
}
