//! OTP-channel sign-in: the code's shape is the whole verification.

mod common;

use common::TestShell;
use identity_shell::dtos::OtpCredentials;
use identity_shell::models::{AuthMethod, Role};
use identity_shell::services::{FlowState, ServiceError, SessionStore};

fn otp(phone: &str, code: &str) -> OtpCredentials {
    OtpCredentials {
        phone: phone.to_string(),
        code: code.to_string(),
    }
}

#[tokio::test]
async fn only_six_digit_codes_verify() {
    let shell = TestShell::spawn();

    for bad in ["", "12345", "1234567", "12a456", "123 56", "❶❷❸❹❺❻"] {
        let err = shell
            .flow
            .login_with_otp(otp("+15551234567", bad), Some(Role::Client))
            .await
            .expect_err("malformed code must fail");
        assert!(
            matches!(err, ServiceError::InvalidCode),
            "code {:?} should be invalid",
            bad
        );
    }
    assert!(shell.store.load().await.is_none());

    let state = shell
        .flow
        .login_with_otp(otp("+15551234567", "123456"), Some(Role::Client))
        .await
        .expect("six digits should verify");
    assert_eq!(state.navigation_target(), "/dashboard/client");
}

#[tokio::test]
async fn empty_phone_is_rejected() {
    let shell = TestShell::spawn();

    let err = shell
        .flow
        .login_with_otp(otp("", "123456"), None)
        .await
        .expect_err("missing phone must fail");
    assert!(matches!(err, ServiceError::InvalidCode));
}

#[tokio::test]
async fn phone_identities_are_masked() {
    let shell = TestShell::spawn();

    let state = shell
        .flow
        .login_with_otp(otp("+15551234567", "654321"), Some(Role::Investor))
        .await
        .expect("login should succeed");

    match state {
        FlowState::RoleAssigned { session, .. } => {
            assert_eq!(session.identity.auth_method, AuthMethod::Phone);
            assert_eq!(session.identity.display_name, "+*********67");
        }
        other => panic!("expected an assigned role, got {:?}", other),
    }
}

#[tokio::test]
async fn dispatch_checks_the_destination_shape() {
    let shell = TestShell::spawn();

    shell
        .flow
        .request_otp("+15551234567")
        .await
        .expect("well-formed destination should dispatch");

    for bad in ["", "15551234567", "+1555", "+1555123456a"] {
        let err = shell
            .flow
            .request_otp(bad)
            .await
            .expect_err("malformed destination must fail");
        assert!(
            matches!(err, ServiceError::InvalidPhone),
            "destination {:?} should be invalid",
            bad
        );
    }
}
