use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use fitbase_accounts::domain::repository::{
    CredentialHasher, Notifier, OneTimeCodeRepository, PendingResetRepository, UserRepository,
};
use fitbase_accounts::domain::types::{
    CodePurpose, Mail, OneTimeCode, PendingPasswordReset, ProfilePatch, UserAccount,
};
use fitbase_accounts::error::AccountsServiceError;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    users: Arc<Mutex<Vec<UserAccount>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<UserAccount>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<UserAccount>>> {
        Arc::clone(&self.users)
    }

    pub fn get(&self, id: Uuid) -> Option<UserAccount> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, AccountsServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AccountsServiceError> {
        Ok(self.get(id))
    }

    async fn create(&self, user: &UserAccount) -> Result<(), AccountsServiceError> {
        let mut users = self.users.lock().unwrap();
        // Models the unique email index.
        if users.iter().any(|u| u.email == user.email) {
            return Err(AccountsServiceError::EmailTaken);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn save_credentials(&self, user: &UserAccount) -> Result<(), AccountsServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(stored) = users.iter_mut().find(|u| u.id == user.id) {
            stored.is_verified = user.is_verified;
            stored.password_hash = user.password_hash.clone();
            stored.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), AccountsServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(stored) = users.iter_mut().find(|u| u.id == id) {
            if let Some(ref v) = patch.first_name {
                stored.first_name = Some(v.clone());
            }
            if let Some(ref v) = patch.last_name {
                stored.last_name = Some(v.clone());
            }
            if let Some(ref v) = patch.phone_number {
                stored.phone_number = Some(v.clone());
            }
            if let Some(v) = patch.gender {
                stored.gender = Some(v);
            }
            if let Some(v) = patch.age {
                stored.age = Some(v);
            }
            if let Some(v) = patch.date_of_birth {
                stored.date_of_birth = Some(v);
            }
            if let Some(v) = patch.height_cm {
                stored.height_cm = Some(v);
            }
            if let Some(v) = patch.weight_kg {
                stored.weight_kg = Some(v);
            }
            if let Some(v) = patch.goal {
                stored.goal = Some(v);
            }
            if let Some(v) = patch.activity_level {
                stored.activity_level = Some(v);
            }
            stored.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid) -> Result<(), AccountsServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(stored) = users.iter_mut().find(|u| u.id == id) {
            stored.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockCodeRepo {
    codes: Arc<Mutex<Vec<OneTimeCode>>>,
}

impl MockCodeRepo {
    pub fn new(codes: Vec<OneTimeCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn codes_handle(&self) -> Arc<Mutex<Vec<OneTimeCode>>> {
        Arc::clone(&self.codes)
    }

    /// Newest code string issued to a user, for driving a flow the way a
    /// client reading their inbox would.
    pub fn latest_code_for(&self, user_id: Uuid) -> Option<String> {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .max_by_key(|c| c.created_at)
            .map(|c| c.code.clone())
    }
}

impl OneTimeCodeRepository for MockCodeRepo {
    async fn find_latest(
        &self,
        user_id: Uuid,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<Option<OneTimeCode>, AccountsServiceError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id && c.code == code && c.purpose == purpose)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn supersede_and_create(
        &self,
        code: &OneTimeCode,
    ) -> Result<(), AccountsServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let now = Utc::now();
        for existing in codes
            .iter_mut()
            .filter(|c| c.user_id == code.user_id && c.purpose == code.purpose && c.is_valid())
        {
            existing.used_at = Some(now);
        }
        codes.push(code.clone());
        Ok(())
    }

    async fn consume(&self, id: Uuid) -> Result<bool, AccountsServiceError> {
        // Compare-and-set under one lock, mirroring the conditional UPDATE
        // the real repository issues.
        let mut codes = self.codes.lock().unwrap();
        match codes.iter_mut().find(|c| c.id == id && c.used_at.is_none()) {
            Some(code) => {
                code.used_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockPendingRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockPendingRepo {
    records: Arc<Mutex<Vec<PendingPasswordReset>>>,
}

impl MockPendingRepo {
    pub fn empty() -> Self {
        Self {
            records: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn records_handle(&self) -> Arc<Mutex<Vec<PendingPasswordReset>>> {
        Arc::clone(&self.records)
    }
}

impl PendingResetRepository for MockPendingRepo {
    async fn supersede_and_create(
        &self,
        pending: &PendingPasswordReset,
    ) -> Result<(), AccountsServiceError> {
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        for existing in records
            .iter_mut()
            .filter(|r| r.user_id == pending.user_id && r.consumed_at.is_none())
        {
            existing.consumed_at = Some(now);
        }
        records.push(pending.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PendingPasswordReset>, AccountsServiceError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active())
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn consume(&self, id: Uuid) -> Result<bool, AccountsServiceError> {
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id == id && r.consumed_at.is_none())
        {
            Some(record) => {
                record.consumed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── Notifiers ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Mail>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<Mail>>> {
        Arc::clone(&self.sent)
    }
}

impl Notifier for MockNotifier {
    async fn send(&self, mail: &Mail) -> Result<(), AccountsServiceError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Notifier that always fails, for asserting delivery is best-effort.
#[derive(Clone)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    async fn send(&self, _mail: &Mail) -> Result<(), AccountsServiceError> {
        Err(AccountsServiceError::Internal(anyhow::anyhow!(
            "smtp relay unreachable"
        )))
    }
}

// ── PlainHasher ──────────────────────────────────────────────────────────────

/// Reversible stand-in for argon2 so tests stay fast and can assert on
/// stored values.
#[derive(Clone)]
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, AccountsServiceError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AccountsServiceError> {
        Ok(hash == format!("plain${password}"))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn verified_user(email: &str, password: &str) -> UserAccount {
    let mut user = unverified_user(email, password);
    user.is_verified = true;
    user
}

pub fn unverified_user(email: &str, password: &str) -> UserAccount {
    let now = Utc::now();
    UserAccount {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        password_hash: format!("plain${password}"),
        is_verified: false,
        first_name: None,
        last_name: None,
        phone_number: None,
        gender: None,
        age: None,
        date_of_birth: None,
        height_cm: None,
        weight_kg: None,
        goal: None,
        activity_level: None,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}
