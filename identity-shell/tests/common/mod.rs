//! Shared helpers for the identity-shell integration suite.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use identity_shell::config::{AuthTimingConfig, Environment, ShellConfig, StorageConfig};
use identity_shell::models::FederatedProvider;
use identity_shell::services::{
    AcquirerSettings, AuthFlow, CredentialAcquirer, FileSessionStore, IdentityProvider,
    InMemoryRoleRegistry, RoleRegistry, RoleResolver, SessionStore, SimulatedIdentityProvider,
};
use shell_core::config as core_config;
use tempfile::TempDir;

/// Principal issued by the test shell's Internet Identity provider.
pub const TEST_PRINCIPAL: &str = "aaaaa-bbbbb-ccccc-ddddd-eeeee-fffff-gg";

/// A fully wired flow over a temp session file, a fresh registry and a
/// single Internet Identity provider with a fixed principal.
pub struct TestShell {
    pub flow: Arc<AuthFlow>,
    pub store: Arc<FileSessionStore>,
    pub registry: Arc<InMemoryRoleRegistry>,
    pub provider: Arc<SimulatedIdentityProvider>,
    _data_dir: TempDir,
}

impl TestShell {
    /// Zero-latency shell; the default for behavioral tests.
    pub fn spawn() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Shell whose local channels take `verify_latency` per attempt, for
    /// exercising in-flight behavior.
    pub fn with_latency(verify_latency: Duration) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(FileSessionStore::new(data_dir.path().join("session.json")));
        let registry = Arc::new(InMemoryRoleRegistry::new());
        let provider = Arc::new(
            SimulatedIdentityProvider::new(FederatedProvider::InternetIdentity)
                .with_principal(TEST_PRINCIPAL),
        );

        let providers: Vec<Arc<dyn IdentityProvider>> = vec![provider.clone()];
        let acquirer = Arc::new(CredentialAcquirer::new(
            providers,
            AcquirerSettings {
                verify_latency,
                latency_jitter: Duration::ZERO,
            },
        ));

        let store_dyn: Arc<dyn SessionStore> = store.clone();
        let registry_dyn: Arc<dyn RoleRegistry> = registry.clone();
        let resolver = RoleResolver::new(store_dyn.clone(), registry_dyn);
        let flow = Arc::new(AuthFlow::new(acquirer, resolver, store_dyn));

        TestShell {
            flow,
            store,
            registry,
            provider,
            _data_dir: data_dir,
        }
    }

    /// Fresh flow over the same session file and registry, the way a page
    /// reload starts from scratch but finds the same storage.
    pub fn reload(&self) -> Arc<AuthFlow> {
        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(self.store.path().to_path_buf()));
        let provider: Arc<dyn IdentityProvider> = self.provider.clone();
        let acquirer = Arc::new(CredentialAcquirer::new(
            vec![provider],
            AcquirerSettings::default(),
        ));
        let registry: Arc<dyn RoleRegistry> = self.registry.clone();
        let resolver = RoleResolver::new(store.clone(), registry);
        Arc::new(AuthFlow::new(acquirer, resolver, store))
    }

    /// Resolver sharing this shell's store and registry, for exercising
    /// resolution rules directly.
    pub fn resolver(&self) -> RoleResolver {
        let store: Arc<dyn SessionStore> = self.store.clone();
        let registry: Arc<dyn RoleRegistry> = self.registry.clone();
        RoleResolver::new(store, registry)
    }

    pub fn session_path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }
}

/// Config pointing into a caller-owned data dir, zero simulated latency.
pub fn create_test_config(data_dir: &Path) -> ShellConfig {
    ShellConfig {
        common: core_config::Config {
            data_dir: data_dir.to_string_lossy().into_owned(),
        },
        environment: Environment::Dev,
        service_name: "identity-shell-test".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "error".to_string(),
        storage: StorageConfig {
            session_file: "session.json".to_string(),
        },
        auth: AuthTimingConfig {
            verify_latency_ms: 0,
            latency_jitter_ms: 0,
            provider_latency_ms: 0,
        },
    }
}
