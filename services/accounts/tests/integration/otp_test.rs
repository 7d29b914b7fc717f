use chrono::{Duration, Utc};
use uuid::Uuid;

use fitbase_accounts::domain::repository::OneTimeCodeRepository;
use fitbase_accounts::domain::types::{CodePurpose, OneTimeCode};
use fitbase_accounts::error::AccountsServiceError;
use fitbase_accounts::usecase::otp::{IssueCodeUseCase, VerifyCodeUseCase};

use crate::helpers::{MockCodeRepo, MockNotifier, MockUserRepo, verified_user};

fn seeded_code(user_id: Uuid, code: &str, purpose: CodePurpose) -> OneTimeCode {
    let now = Utc::now();
    OneTimeCode {
        id: Uuid::new_v4(),
        user_id,
        code: code.to_owned(),
        purpose,
        expires_at: now + Duration::minutes(10),
        used_at: None,
        created_at: now,
    }
}

fn verifier(users: &MockUserRepo, codes: &MockCodeRepo) -> VerifyCodeUseCase<MockUserRepo, MockCodeRepo> {
    VerifyCodeUseCase {
        users: users.clone(),
        codes: codes.clone(),
    }
}

#[tokio::test]
async fn should_verify_valid_code_and_apply_effect() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockCodeRepo::new(vec![seeded_code(user.id, "482193", CodePurpose::Signup)]);

    let updated = verifier(&users, &codes)
        .execute("user@example.com", "482193", CodePurpose::Signup, |u| {
            u.password_hash = "plain$changed".to_owned();
        })
        .await
        .unwrap();

    assert_eq!(updated.password_hash, "plain$changed");
    assert_eq!(users.get(user.id).unwrap().password_hash, "plain$changed");
    assert!(codes.codes_handle().lock().unwrap()[0].used_at.is_some());
}

#[tokio::test]
async fn should_reject_unknown_code_as_invalid() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockCodeRepo::new(vec![seeded_code(user.id, "482193", CodePurpose::Signup)]);

    let result = verifier(&users, &codes)
        .execute("user@example.com", "000000", CodePurpose::Signup, |_| {})
        .await;

    assert!(matches!(result, Err(AccountsServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_reject_unknown_email_as_invalid() {
    let users = MockUserRepo::empty();
    let codes = MockCodeRepo::empty();

    let result = verifier(&users, &codes)
        .execute("nobody@example.com", "482193", CodePurpose::Signup, |_| {})
        .await;

    assert!(matches!(result, Err(AccountsServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_reject_code_bound_to_another_purpose() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockCodeRepo::new(vec![seeded_code(
        user.id,
        "482193",
        CodePurpose::PasswordReset,
    )]);

    // Same code string, wrong workflow: not cross-redeemable.
    let result = verifier(&users, &codes)
        .execute("user@example.com", "482193", CodePurpose::Signup, |_| {})
        .await;

    assert!(matches!(result, Err(AccountsServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_reject_expired_code() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let mut code = seeded_code(user.id, "482193", CodePurpose::Signup);
    code.expires_at = Utc::now() - Duration::seconds(1);
    let codes = MockCodeRepo::new(vec![code]);

    let result = verifier(&users, &codes)
        .execute("user@example.com", "482193", CodePurpose::Signup, |_| {})
        .await;

    assert!(matches!(
        result,
        Err(AccountsServiceError::ExpiredOrUsedCode)
    ));
}

#[tokio::test]
async fn code_verifies_at_most_once() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockCodeRepo::new(vec![seeded_code(user.id, "482193", CodePurpose::Signup)]);
    let uc = verifier(&users, &codes);

    uc.execute("user@example.com", "482193", CodePurpose::Signup, |_| {})
        .await
        .unwrap();

    let second = uc
        .execute("user@example.com", "482193", CodePurpose::Signup, |_| {})
        .await;
    assert!(matches!(
        second,
        Err(AccountsServiceError::ExpiredOrUsedCode)
    ));
}

#[tokio::test]
async fn consume_is_compare_and_set() {
    // Two racing verifications both read used_at == NULL; only one conditional
    // update may report a row affected.
    let user_id = Uuid::new_v4();
    let code = seeded_code(user_id, "482193", CodePurpose::Signup);
    let id = code.id;
    let codes = MockCodeRepo::new(vec![code]);

    assert!(codes.consume(id).await.unwrap());
    assert!(!codes.consume(id).await.unwrap(), "loser must see zero rows");
}

#[tokio::test]
async fn issuing_supersedes_prior_active_codes() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockCodeRepo::empty();
    let notifier = MockNotifier::new();

    let issuer = IssueCodeUseCase {
        codes: codes.clone(),
        notifier: notifier.clone(),
    };
    let first = issuer.execute(&user, CodePurpose::Signup).await.unwrap();
    let second = issuer.execute(&user, CodePurpose::Signup).await.unwrap();

    let uc = verifier(&users, &codes);
    if first != second {
        let stale = uc
            .execute("user@example.com", &first, CodePurpose::Signup, |_| {})
            .await;
        assert!(
            matches!(stale, Err(AccountsServiceError::ExpiredOrUsedCode)),
            "superseded code must no longer verify"
        );
    }
    uc.execute("user@example.com", &second, CodePurpose::Signup, |_| {})
        .await
        .unwrap();

    assert_eq!(notifier.sent_handle().lock().unwrap().len(), 2);
}

#[tokio::test]
async fn issuing_does_not_touch_other_purposes() {
    let user = verified_user("user@example.com", "Secret123!");
    let users = MockUserRepo::new(vec![user.clone()]);
    let codes = MockCodeRepo::new(vec![seeded_code(
        user.id,
        "111111",
        CodePurpose::PasswordReset,
    )]);
    let notifier = MockNotifier::new();

    IssueCodeUseCase {
        codes: codes.clone(),
        notifier: notifier.clone(),
    }
    .execute(&user, CodePurpose::Signup)
    .await
    .unwrap();

    // The reset code is still redeemable.
    verifier(&users, &codes)
        .execute("user@example.com", "111111", CodePurpose::PasswordReset, |_| {})
        .await
        .unwrap();
}
