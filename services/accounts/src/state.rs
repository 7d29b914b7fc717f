use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOneTimeCodeRepository, DbPendingResetRepository, DbUserRepository};
use crate::infra::mailer::SmtpNotifier;
use crate::infra::password::Argon2Hasher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub notifier: SmtpNotifier,
    pub jwt_secret: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_repo(&self) -> DbOneTimeCodeRepository {
        DbOneTimeCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn pending_repo(&self) -> DbPendingResetRepository {
        DbPendingResetRepository {
            db: self.db.clone(),
        }
    }

    pub fn hasher(&self) -> Argon2Hasher {
        Argon2Hasher
    }

    pub fn notifier(&self) -> SmtpNotifier {
        self.notifier.clone()
    }
}
