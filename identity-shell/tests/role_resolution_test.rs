//! Resolution precedence and registry authority, exercised on the
//! resolver directly.

mod common;

use common::{TestShell, TEST_PRINCIPAL};
use identity_shell::models::{FederatedProvider, Role, UserIdentity};
use identity_shell::services::{Resolution, ServiceError, SessionStore};

fn federated() -> UserIdentity {
    UserIdentity::new_federated(FederatedProvider::InternetIdentity, TEST_PRINCIPAL)
}

#[tokio::test]
async fn hint_wins_over_persisted_and_registry_roles() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();
    let identity = federated();

    shell.registry.seed(TEST_PRINCIPAL, Role::Client);
    shell
        .store
        .save(&identity, Some(Role::Investor))
        .await
        .expect("seed session");

    let resolution = resolver.resolve(&identity, Some(Role::Sme)).await;
    assert_eq!(resolution, Resolution::Assigned(Role::Sme));
}

#[tokio::test]
async fn persisted_role_wins_over_the_registry() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();
    let identity = federated();

    shell.registry.seed(TEST_PRINCIPAL, Role::Client);
    shell
        .store
        .save(&identity, Some(Role::Investor))
        .await
        .expect("seed session");

    let resolution = resolver.resolve(&identity, None).await;
    assert_eq!(resolution, Resolution::Assigned(Role::Investor));
}

#[tokio::test]
async fn registry_fills_the_gap_for_federated_identities_only() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();

    shell.registry.seed(TEST_PRINCIPAL, Role::Client);

    let resolution = resolver.resolve(&federated(), None).await;
    assert_eq!(resolution, Resolution::Assigned(Role::Client));

    // A local identity never consults the registry, even when the
    // registry would have an answer for someone.
    let local = UserIdentity::new_email("maria@acme.io");
    let resolution = resolver.resolve(&local, None).await;
    assert_eq!(resolution, Resolution::SelectionRequired);
}

#[tokio::test]
async fn with_nothing_to_go_on_selection_is_required() {
    let shell = TestShell::spawn();
    let resolution = shell.resolver().resolve(&federated(), None).await;
    assert_eq!(resolution, Resolution::SelectionRequired);
}

#[tokio::test]
async fn registry_roles_are_never_overwritten() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();
    let identity = federated();

    shell.registry.seed(TEST_PRINCIPAL, Role::Client);

    let assignment = resolver
        .assign_role(&identity, Role::Investor)
        .await
        .expect("assignment should succeed");

    // The requested role is discarded in favor of the registry's.
    assert_eq!(assignment.session.role, Some(Role::Client));
    assert!(assignment.persisted);
    assert_eq!(shell.registry.write_count(), 0);

    // A fresh resolution answers with the registry's role too.
    let resolution = resolver.resolve(&identity, None).await;
    assert_eq!(resolution, Resolution::Assigned(Role::Client));
}

#[tokio::test]
async fn first_assignment_writes_the_registry_exactly_once() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();
    let identity = federated();

    let assignment = resolver
        .assign_role(&identity, Role::Investor)
        .await
        .expect("assignment should succeed");
    assert_eq!(assignment.session.role, Some(Role::Investor));
    assert_eq!(shell.registry.write_count(), 1);

    // Re-assigning the same role is a registry no-op.
    resolver
        .assign_role(&identity, Role::Investor)
        .await
        .expect("re-assignment should succeed");
    assert_eq!(shell.registry.write_count(), 1);
}

#[tokio::test]
async fn registry_failure_aborts_the_assignment() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();

    shell.registry.set_available(false);

    let err = resolver
        .assign_role(&federated(), Role::Investor)
        .await
        .expect_err("assignment must fail while the registry is down");
    assert!(matches!(err, ServiceError::RegistryUnavailable(_)));

    // Nothing was persisted locally either; store and registry stay
    // consistent.
    assert!(shell.store.load().await.is_none());
}

#[tokio::test]
async fn local_identities_never_touch_the_registry() {
    let shell = TestShell::spawn();
    let resolver = shell.resolver();

    // Even an offline registry is irrelevant to a local assignment.
    shell.registry.set_available(false);

    let identity = UserIdentity::new_email("maria@acme.io");
    let assignment = resolver
        .assign_role(&identity, Role::Sme)
        .await
        .expect("local assignment should succeed");

    assert_eq!(assignment.session.role, Some(Role::Sme));
    assert_eq!(shell.registry.write_count(), 0);
    assert!(shell.store.is_authenticated().await);
}
