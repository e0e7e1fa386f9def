//! Credential acquisition.
//!
//! Five channels, one rule: a successful check yields a `UserIdentity` and
//! nothing else; roles are someone else's business. Upstream verification
//! is mocked with a configurable delay, except for the federated channel,
//! which delegates to a real provider seam.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use validator::Validate;

use crate::dtos::{OtpCredentials, PasswordCredentials, SsoCredentials, WalletCredentials};
use crate::models::{AuthMethod, FederatedProvider, UserIdentity};
use crate::services::error::ServiceError;
use crate::services::providers::IdentityProvider;
use crate::utils::{is_valid_code, is_valid_dispatch_phone};

/// Timing knobs for the mocked upstream verifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcquirerSettings {
    /// Base simulated round-trip for the local channels.
    pub verify_latency: Duration,
    /// Extra latency, uniformly sampled up to this bound.
    pub latency_jitter: Duration,
}

/// Releases the channel slot when the attempt finishes, whichever way it
/// finishes.
struct ChannelGuard<'a> {
    channel: AuthMethod,
    slots: &'a DashMap<AuthMethod, ()>,
}

impl Drop for ChannelGuard<'_> {
    fn drop(&mut self) {
        self.slots.remove(&self.channel);
    }
}

pub struct CredentialAcquirer {
    providers: HashMap<FederatedProvider, Arc<dyn IdentityProvider>>,
    in_flight: DashMap<AuthMethod, ()>,
    settings: AcquirerSettings,
}

impl CredentialAcquirer {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>, settings: AcquirerSettings) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.kind(), provider))
            .collect();
        Self {
            providers,
            in_flight: DashMap::new(),
            settings,
        }
    }

    /// Claim the channel for one attempt. At most one attempt may be in
    /// flight per channel; overlapping submissions are rejected rather
    /// than queued so a double-click cannot produce two sessions.
    fn begin(&self, channel: AuthMethod) -> Result<ChannelGuard<'_>, ServiceError> {
        match self.in_flight.entry(channel) {
            Entry::Occupied(_) => {
                tracing::warn!(channel = %channel, "Rejected overlapping sign-in attempt");
                Err(ServiceError::AuthInProgress(channel))
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(ChannelGuard {
                    channel,
                    slots: &self.in_flight,
                })
            }
        }
    }

    async fn simulate_upstream_verification(&self) {
        let mut wait = self.settings.verify_latency;
        let bound = self.settings.latency_jitter.as_millis() as u64;
        if bound > 0 {
            let mut rng = rand::thread_rng();
            wait += Duration::from_millis(rng.gen_range(0..=bound));
        }
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Email/password sign-in. The mocked verifier accepts any non-empty
    /// pair.
    #[tracing::instrument(skip(self, creds))]
    pub async fn authenticate_by_password(
        &self,
        creds: &PasswordCredentials,
    ) -> Result<UserIdentity, ServiceError> {
        let _guard = self.begin(AuthMethod::Email)?;

        if let Err(e) = creds.validate() {
            tracing::debug!(error = %e, "Password credentials failed shape check");
            return Err(ServiceError::InvalidCredentials);
        }

        self.simulate_upstream_verification().await;
        let identity = UserIdentity::new_email(&creds.email);
        tracing::info!(identity = %identity.id, channel = %identity.auth_method, "Credentials accepted");
        Ok(identity)
    }

    /// Phone/code sign-in. Success is decided by code shape alone.
    #[tracing::instrument(skip(self, creds))]
    pub async fn authenticate_by_otp(
        &self,
        creds: &OtpCredentials,
    ) -> Result<UserIdentity, ServiceError> {
        let _guard = self.begin(AuthMethod::Phone)?;

        if creds.validate().is_err() || !is_valid_code(&creds.code) {
            // Never log the submitted code.
            tracing::debug!("OTP credentials rejected");
            return Err(ServiceError::InvalidCode);
        }

        self.simulate_upstream_verification().await;
        let identity = UserIdentity::new_phone(&creds.phone);
        tracing::info!(identity = %identity.id, channel = %identity.auth_method, "Credentials accepted");
        Ok(identity)
    }

    /// Dispatch a one-time code to `phone`.
    ///
    /// The transport is mocked: nothing is stored and any well-formed code
    /// will later verify, so this only validates the destination and logs.
    #[tracing::instrument(skip(self))]
    pub async fn request_otp(&self, phone: &str) -> Result<(), ServiceError> {
        if !is_valid_dispatch_phone(phone) {
            return Err(ServiceError::InvalidPhone);
        }
        self.simulate_upstream_verification().await;
        tracing::info!(destination = %phone, "OTP dispatched");
        Ok(())
    }

    /// Wallet sign-in. The signature is opaque to the shell; only the
    /// address is required.
    #[tracing::instrument(skip(self, creds))]
    pub async fn authenticate_by_wallet(
        &self,
        creds: &WalletCredentials,
    ) -> Result<UserIdentity, ServiceError> {
        let _guard = self.begin(AuthMethod::Wallet)?;

        if let Err(e) = creds.validate() {
            tracing::debug!(error = %e, "Wallet credentials failed shape check");
            return Err(ServiceError::WalletConnectionFailed);
        }

        self.simulate_upstream_verification().await;
        let identity = UserIdentity::new_wallet(&creds.address);
        tracing::info!(identity = %identity.id, channel = %identity.auth_method, "Credentials accepted");
        Ok(identity)
    }

    /// Enterprise SSO sign-in with an externally issued token.
    #[tracing::instrument(skip(self, creds))]
    pub async fn authenticate_by_sso(
        &self,
        creds: &SsoCredentials,
    ) -> Result<UserIdentity, ServiceError> {
        let _guard = self.begin(AuthMethod::Sso)?;

        if let Err(e) = creds.validate() {
            tracing::debug!(error = %e, "SSO credentials failed shape check");
            return Err(ServiceError::SsoFailed);
        }

        self.simulate_upstream_verification().await;
        let identity = UserIdentity::new_sso(&creds.provider);
        tracing::info!(identity = %identity.id, channel = %identity.auth_method, "Credentials accepted");
        Ok(identity)
    }

    /// Federated sign-in through a registered provider. The provider's
    /// principal becomes the identity id.
    #[tracing::instrument(skip(self))]
    pub async fn authenticate_by_federated_identity(
        &self,
        provider: FederatedProvider,
    ) -> Result<UserIdentity, ServiceError> {
        let _guard = self.begin(AuthMethod::FederatedIdentity)?;

        let connector = self
            .providers
            .get(&provider)
            .cloned()
            .ok_or(ServiceError::ProviderUnavailable(provider))?;

        let actor = connector.connect().await?;
        let identity = UserIdentity::new_federated(provider, &actor.principal);
        tracing::info!(identity = %identity.id, channel = %identity.auth_method, "Credentials accepted");
        Ok(identity)
    }
}
