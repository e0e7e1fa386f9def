//! Wallet and SSO sign-ins. Both are local channels: no role hint, no
//! registry involvement.

mod common;

use common::TestShell;
use identity_shell::dtos::{SsoCredentials, WalletCredentials};
use identity_shell::models::{AuthMethod, Role};
use identity_shell::services::{FlowState, ServiceError, SessionStore};

#[tokio::test]
async fn wallet_login_requires_an_address() {
    let shell = TestShell::spawn();

    let err = shell
        .flow
        .login_with_wallet(WalletCredentials {
            address: String::new(),
            signature: "sig".to_string(),
        })
        .await
        .expect_err("missing address must fail");
    assert!(matches!(err, ServiceError::WalletConnectionFailed));
}

#[tokio::test]
async fn wallet_login_elides_the_address_and_awaits_selection() {
    let shell = TestShell::spawn();

    let state = shell
        .flow
        .login_with_wallet(WalletCredentials {
            address: "0xABCDEF0123456789".to_string(),
            signature: "sig".to_string(),
        })
        .await
        .expect("wallet login should succeed");

    match &state {
        FlowState::AwaitingRoleSelection { identity } => {
            assert_eq!(identity.auth_method, AuthMethod::Wallet);
            assert_eq!(identity.id, "0xABCDEF0123456789");
            assert_eq!(identity.display_name, "0xABCD…6789");
        }
        other => panic!("expected role selection, got {:?}", other),
    }

    let state = shell
        .flow
        .select_role(Role::Investor)
        .await
        .expect("selection should succeed");
    assert_eq!(state.navigation_target(), "/dashboard/investor");

    // Wallet identities are not federated; the registry stays untouched.
    assert_eq!(shell.registry.write_count(), 0);
}

#[tokio::test]
async fn sso_login_requires_provider_and_token() {
    let shell = TestShell::spawn();

    let err = shell
        .flow
        .login_with_sso(SsoCredentials {
            provider: "okta".to_string(),
            token: String::new(),
        })
        .await
        .expect_err("missing token must fail");
    assert!(matches!(err, ServiceError::SsoFailed));

    let err = shell
        .flow
        .login_with_sso(SsoCredentials {
            provider: String::new(),
            token: "token".to_string(),
        })
        .await
        .expect_err("missing provider must fail");
    assert!(matches!(err, ServiceError::SsoFailed));
}

#[tokio::test]
async fn sso_login_carries_the_provider_name() {
    let shell = TestShell::spawn();

    let state = shell
        .flow
        .login_with_sso(SsoCredentials {
            provider: "okta".to_string(),
            token: "opaque-token".to_string(),
        })
        .await
        .expect("sso login should succeed");

    match &state {
        FlowState::AwaitingRoleSelection { identity } => {
            assert_eq!(identity.auth_method, AuthMethod::Sso);
            assert_eq!(identity.display_name, "okta");
        }
        other => panic!("expected role selection, got {:?}", other),
    }

    let state = shell
        .flow
        .select_role(Role::Client)
        .await
        .expect("selection should succeed");
    assert_eq!(state.navigation_target(), "/dashboard/client");
    assert!(shell.store.is_authenticated().await);
    assert_eq!(shell.registry.write_count(), 0);
}
