//! Federated identity provider seam.
//!
//! Each provider runs its own handshake (popup or redirect in the browser)
//! and hands back an authenticated actor. The shell only ever reads the
//! actor's principal; everything else about the handshake stays behind
//! this trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use uuid::Uuid;

use crate::models::FederatedProvider;
use crate::services::error::ServiceError;

/// Authenticated handle returned by a provider handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedActor {
    pub provider: FederatedProvider,
    /// Registry key for this user. Stable across sign-ins with the same
    /// provider account.
    pub principal: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn kind(&self) -> FederatedProvider;

    /// Run the handshake and produce an authenticated actor.
    async fn connect(&self) -> Result<FederatedActor, ServiceError>;
}

/// Stand-in for the real provider handshakes.
///
/// Issues the same principal on every connect, the way a provider account
/// does, so repeat sign-ins resolve to the same registry entry. Latency is
/// simulated and the provider can be switched off to exercise outages.
pub struct SimulatedIdentityProvider {
    kind: FederatedProvider,
    principal: String,
    latency: Duration,
    jitter: Duration,
    available: AtomicBool,
}

impl SimulatedIdentityProvider {
    pub fn new(kind: FederatedProvider) -> Self {
        Self {
            kind,
            principal: generate_principal(),
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            available: AtomicBool::new(true),
        }
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = principal.into();
        self
    }

    pub fn with_latency(mut self, latency: Duration, jitter: Duration) -> Self {
        self.latency = latency;
        self.jitter = jitter;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for SimulatedIdentityProvider {
    fn kind(&self) -> FederatedProvider {
        self.kind
    }

    async fn connect(&self) -> Result<FederatedActor, ServiceError> {
        if !self.available.load(Ordering::SeqCst) {
            tracing::warn!(provider = %self.kind, "Provider handshake refused; provider offline");
            return Err(ServiceError::ProviderUnavailable(self.kind));
        }

        let wait = self.latency + jitter_sample(self.jitter);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        tracing::debug!(provider = %self.kind, "Provider handshake complete");
        Ok(FederatedActor {
            provider: self.kind,
            principal: self.principal.clone(),
        })
    }
}

/// Principal-shaped identifier: hex groups joined by dashes, stable only
/// for the provider instance that generated it.
fn generate_principal() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    let chars: Vec<char> = raw.chars().collect();
    chars
        .chunks(5)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

fn jitter_sample(jitter: Duration) -> Duration {
    let bound = jitter.as_millis() as u64;
    if bound == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..=bound))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principals_look_like_dashed_groups() {
        let principal = generate_principal();
        assert_eq!(principal.len(), 32 + 6);
        assert_eq!(principal.matches('-').count(), 6);
    }

    #[tokio::test]
    async fn connect_is_stable_per_instance() {
        let provider = SimulatedIdentityProvider::new(FederatedProvider::Nfid);
        let first = provider.connect().await.unwrap();
        let second = provider.connect().await.unwrap();
        assert_eq!(first.principal, second.principal);
        assert_eq!(first.provider, FederatedProvider::Nfid);
    }
}
