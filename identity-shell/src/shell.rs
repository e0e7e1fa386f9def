//! Shell lifecycle: dependency wiring, the cache-sync task and teardown.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::ShellConfig;
use crate::models::{FederatedProvider, Session};
use crate::services::acquirer::{AcquirerSettings, CredentialAcquirer};
use crate::services::flow::AuthFlow;
use crate::services::providers::{IdentityProvider, SimulatedIdentityProvider};
use crate::services::registry::{InMemoryRoleRegistry, RoleRegistry};
use crate::services::resolver::RoleResolver;
use crate::services::store::{FileSessionStore, SessionEvents, SessionStore, StoreChange};

/// In-memory copy of the persisted session, refreshed whenever any shell
/// instance sharing the storage area writes it.
///
/// Render code reads this synchronously; only the sync task and explicit
/// `refresh` calls touch the store.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Latest locally known session. May briefly trail a write made by
    /// another instance until the change event lands.
    pub fn current(&self) -> Option<Session> {
        self.current.read().ok().and_then(|slot| slot.clone())
    }

    /// Re-read the store and replace the cached copy.
    pub async fn refresh(&self) -> Option<Session> {
        let session = self.store.load().await;
        if let Ok(mut slot) = self.current.write() {
            *slot = session.clone();
        }
        session
    }
}

/// The wired identity subsystem. Built once at application start; the
/// embedding UI keeps it for its whole lifetime and calls
/// [`Shell::shutdown`] on exit.
pub struct Shell {
    pub config: ShellConfig,
    pub store: Arc<dyn SessionStore>,
    pub registry: Arc<dyn RoleRegistry>,
    pub flow: Arc<AuthFlow>,
    pub cache: SessionCache,
    sync_task: Option<JoinHandle<()>>,
}

impl Shell {
    /// Wire the default stack: file-backed session store, in-memory role
    /// registry and simulated federated providers. Must run inside a
    /// tokio runtime; the cache-sync task is spawned here.
    pub fn init(config: ShellConfig) -> Self {
        tracing::info!(service = %config.service_name, version = %config.service_version, "Initializing identity shell");

        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_path()));
        tracing::info!(path = %config.session_path().display(), "Session store ready");

        let registry: Arc<dyn RoleRegistry> = Arc::new(InMemoryRoleRegistry::new());

        let provider_latency = Duration::from_millis(config.auth.provider_latency_ms);
        let jitter = Duration::from_millis(config.auth.latency_jitter_ms);
        let providers: Vec<Arc<dyn IdentityProvider>> = FederatedProvider::ALL
            .into_iter()
            .map(|kind| {
                let provider =
                    SimulatedIdentityProvider::new(kind).with_latency(provider_latency, jitter);
                Arc::new(provider) as Arc<dyn IdentityProvider>
            })
            .collect();

        let acquirer = Arc::new(CredentialAcquirer::new(
            providers,
            AcquirerSettings {
                verify_latency: Duration::from_millis(config.auth.verify_latency_ms),
                latency_jitter: jitter,
            },
        ));

        let resolver = RoleResolver::new(store.clone(), registry.clone());
        let flow = Arc::new(AuthFlow::new(acquirer, resolver, store.clone()));

        let cache = SessionCache::new(store.clone());
        let sync_task = spawn_cache_sync(cache.clone(), store.subscribe());
        tracing::info!("Identity shell ready");

        Self {
            config,
            store,
            registry,
            flow,
            cache,
            sync_task: Some(sync_task),
        }
    }

    /// Stop the cache-sync task. Subscriptions held elsewhere keep
    /// working; only this shell's background work ends.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.sync_task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::info!("Identity shell shut down");
    }
}

fn spawn_cache_sync(cache: SessionCache, mut events: SessionEvents) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.changed().await {
                StoreChange::Changed(event) => {
                    tracing::trace!(generation = event.generation, "Refreshing session cache");
                    cache.refresh().await;
                }
                StoreChange::Lagged(missed) => {
                    tracing::debug!(missed, "Session events lagged; re-reading store");
                    cache.refresh().await;
                }
                StoreChange::Closed => break,
            }
        }
    })
}
