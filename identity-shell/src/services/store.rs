//! Session persistence.
//!
//! One JSON document per storage area, plus a change feed so that every
//! shell instance sharing that area (tabs, in browser terms) can converge
//! on the same sign-in state. Events carry no session payload: a notified
//! subscriber re-reads the store, so a lost or lagged event can never leave
//! it holding stale data it believes is fresh.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::models::{Role, Session, UserIdentity};
use crate::services::error::ServiceError;

/// Store mutations are rare (one per sign-in, role change or sign-out),
/// so a small buffer is plenty.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Marker published on every store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    /// Monotonic change counter for the emitting storage area.
    pub generation: u64,
}

/// What a waiting subscriber observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// The store was mutated; re-read it.
    Changed(StoreEvent),
    /// The subscriber fell behind and missed this many events. The store
    /// must still be re-read; nothing is lost beyond the markers.
    Lagged(u64),
    /// The store (and every clone of it) was dropped.
    Closed,
}

/// Receiver half of a store subscription. Dropping it unsubscribes.
pub struct SessionEvents {
    rx: broadcast::Receiver<StoreEvent>,
}

impl SessionEvents {
    /// Wait for the next mutation notice.
    pub async fn changed(&mut self) -> StoreChange {
        match self.rx.recv().await {
            Ok(event) => StoreChange::Changed(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => StoreChange::Lagged(missed),
            Err(broadcast::error::RecvError::Closed) => StoreChange::Closed,
        }
    }
}

/// Broadcast side of a storage area, shared by all its clones.
#[derive(Clone)]
struct ChangeFeed {
    tx: broadcast::Sender<StoreEvent>,
    generation: Arc<AtomicU64>,
}

impl ChangeFeed {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn subscribe(&self) -> SessionEvents {
        SessionEvents {
            rx: self.tx.subscribe(),
        }
    }

    fn publish(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // A send error only means nobody is subscribed right now.
        if self.tx.send(StoreEvent { generation }).is_err() {
            tracing::trace!(generation, "Store change had no listeners");
        }
    }
}

/// Persistence seam for the sign-in session.
///
/// `load` and `is_authenticated` never fail: unreadable or corrupt state
/// degrades to "signed out" so the shell can always render the landing
/// page. Writes do report failure, which the flow surfaces as a
/// non-blocking warning.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replace the stored session with a fresh record for `identity`.
    async fn save(&self, identity: &UserIdentity, role: Option<Role>)
        -> Result<Session, ServiceError>;

    /// Current session, or `None` when absent, unreadable or corrupt.
    async fn load(&self) -> Option<Session>;

    /// Remove the stored session. Idempotent.
    async fn clear(&self) -> Result<(), ServiceError>;

    /// True only for a session that already carries a role.
    async fn is_authenticated(&self) -> bool {
        match self.load().await {
            Some(session) => session.is_complete(),
            None => false,
        }
    }

    /// Watch for mutations made through this store or any clone of it.
    fn subscribe(&self) -> SessionEvents;
}

/// File-backed store: one JSON document, the durable analog of the
/// browser's origin-local key-value area.
///
/// Clones share the same path and change feed and model separate shell
/// instances over one storage area. Writes go through a temp file and
/// rename, so readers never observe a half-written document.
#[derive(Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    feed: ChangeFeed,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            feed: ChangeFeed::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_atomic(&self, payload: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(
        &self,
        identity: &UserIdentity,
        role: Option<Role>,
    ) -> Result<Session, ServiceError> {
        let session = Session::new(identity.clone(), role);
        let payload = serde_json::to_vec_pretty(&session)
            .map_err(|e| ServiceError::StorageUnavailable(anyhow::Error::new(e)))?;

        self.write_atomic(&payload).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to persist session");
            ServiceError::StorageUnavailable(anyhow::Error::new(e))
        })?;

        self.feed.publish();
        tracing::debug!(path = %self.path.display(), role = ?session.role, "Session persisted");
        Ok(session)
    }

    async fn load(&self) -> Option<Session> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file unreadable; treating as signed out");
                return None;
            }
        };

        match serde_json::from_slice::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file corrupt; treating as signed out");
                None
            }
        }
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                self.feed.publish();
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            // Clearing an empty store is a no-op, not a change.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::StorageUnavailable(anyhow::Error::new(e))),
        }
    }

    fn subscribe(&self) -> SessionEvents {
        self.feed.subscribe()
    }
}

/// In-memory store for tests and for embedders that explicitly opt out of
/// persistence across restarts.
#[derive(Clone)]
pub struct MemorySessionStore {
    state: Arc<Mutex<Option<Session>>>,
    feed: ChangeFeed,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(None)),
            feed: ChangeFeed::new(),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(
        &self,
        identity: &UserIdentity,
        role: Option<Role>,
    ) -> Result<Session, ServiceError> {
        let session = Session::new(identity.clone(), role);
        {
            let mut state = self.state.lock().map_err(|e| {
                ServiceError::StorageUnavailable(anyhow::anyhow!("session state poisoned: {}", e))
            })?;
            *state = Some(session.clone());
        }
        self.feed.publish();
        Ok(session)
    }

    async fn load(&self) -> Option<Session> {
        self.state.lock().ok().and_then(|state| state.clone())
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        let cleared = {
            let mut state = self.state.lock().map_err(|e| {
                ServiceError::StorageUnavailable(anyhow::anyhow!("session state poisoned: {}", e))
            })?;
            state.take().is_some()
        };
        if cleared {
            self.feed.publish();
        }
        Ok(())
    }

    fn subscribe(&self) -> SessionEvents {
        self.feed.subscribe()
    }
}
