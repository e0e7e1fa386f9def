//! Sign-in flow: credential capture, role resolution, persistence and the
//! navigation target the router should honor afterwards.
//!
//! The flow is a small state machine. Every operation returns the state
//! the shell is in afterwards; the embedding UI renders whatever screen
//! that state names and never has to inspect intermediate results.

use std::sync::{Arc, Mutex};

use crate::dtos::{
    AdminCredentials, OtpCredentials, PasswordCredentials, SsoCredentials, WalletCredentials,
};
use crate::models::{FederatedProvider, Role, Session, UserIdentity, ROLE_SELECT_PATH};
use crate::services::acquirer::CredentialAcquirer;
use crate::services::error::ServiceError;
use crate::services::resolver::{Resolution, RoleResolver};
use crate::services::store::SessionStore;
use crate::utils::is_valid_code;

/// Where the shell stands after an identity or role step.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Nobody is signed in; the landing page is next.
    NoSession,
    /// Credentials were accepted but no role could be derived; the
    /// selection screen is next.
    AwaitingRoleSelection { identity: UserIdentity },
    /// Sign-in is complete; the role dashboard is next.
    RoleAssigned {
        session: Session,
        /// False when the session lives in memory only because durable
        /// storage rejected the write. Worth a toast, not an error page.
        persisted: bool,
    },
}

impl FlowState {
    /// Path the router should navigate to for this state.
    pub fn navigation_target(&self) -> String {
        match self {
            FlowState::NoSession | FlowState::AwaitingRoleSelection { .. } => {
                ROLE_SELECT_PATH.to_string()
            }
            FlowState::RoleAssigned { session, .. } => match session.role {
                Some(role) => role.dashboard_path(),
                None => ROLE_SELECT_PATH.to_string(),
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, FlowState::RoleAssigned { .. })
    }
}

pub struct AuthFlow {
    acquirer: Arc<CredentialAcquirer>,
    resolver: RoleResolver,
    store: Arc<dyn SessionStore>,
    /// Identity waiting for a role pick, surviving only as long as this
    /// flow instance. Reloads recover it from the persisted session.
    pending: Mutex<Option<UserIdentity>>,
}

impl AuthFlow {
    pub fn new(
        acquirer: Arc<CredentialAcquirer>,
        resolver: RoleResolver,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            acquirer,
            resolver,
            store,
            pending: Mutex::new(None),
        }
    }

    /// Email/password sign-in. `role_hint` carries the role of the login
    /// page the user was on, if any.
    #[tracing::instrument(skip(self, creds))]
    pub async fn login_with_password(
        &self,
        creds: PasswordCredentials,
        role_hint: Option<Role>,
    ) -> Result<FlowState, ServiceError> {
        let identity = self.acquirer.authenticate_by_password(&creds).await?;
        let resolution = self.resolver.resolve(&identity, role_hint).await;
        self.complete(identity, resolution).await
    }

    /// Phone/code sign-in.
    #[tracing::instrument(skip(self, creds))]
    pub async fn login_with_otp(
        &self,
        creds: OtpCredentials,
        role_hint: Option<Role>,
    ) -> Result<FlowState, ServiceError> {
        let identity = self.acquirer.authenticate_by_otp(&creds).await?;
        let resolution = self.resolver.resolve(&identity, role_hint).await;
        self.complete(identity, resolution).await
    }

    /// Ask for a one-time code before a phone sign-in.
    pub async fn request_otp(&self, phone: &str) -> Result<(), ServiceError> {
        self.acquirer.request_otp(phone).await
    }

    /// Wallet sign-in. Wallet pages are not role-scoped, so there is no
    /// hint; an unknown user falls through to role selection.
    #[tracing::instrument(skip(self, creds))]
    pub async fn login_with_wallet(
        &self,
        creds: WalletCredentials,
    ) -> Result<FlowState, ServiceError> {
        let identity = self.acquirer.authenticate_by_wallet(&creds).await?;
        let resolution = self.resolver.resolve(&identity, None).await;
        self.complete(identity, resolution).await
    }

    /// Enterprise SSO sign-in.
    #[tracing::instrument(skip(self, creds))]
    pub async fn login_with_sso(&self, creds: SsoCredentials) -> Result<FlowState, ServiceError> {
        let identity = self.acquirer.authenticate_by_sso(&creds).await?;
        let resolution = self.resolver.resolve(&identity, None).await;
        self.complete(identity, resolution).await
    }

    /// Federated sign-in. The registry may already know this principal's
    /// role, in which case selection is skipped entirely.
    #[tracing::instrument(skip(self))]
    pub async fn login_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> Result<FlowState, ServiceError> {
        let identity = self
            .acquirer
            .authenticate_by_federated_identity(provider)
            .await?;
        let resolution = self.resolver.resolve(&identity, None).await;
        self.complete(identity, resolution).await
    }

    /// Admin sign-in: password credentials plus a six-digit second factor.
    /// A malformed second factor fails before the password channel runs.
    #[tracing::instrument(skip(self, creds))]
    pub async fn login_admin(&self, creds: AdminCredentials) -> Result<FlowState, ServiceError> {
        if !is_valid_code(&creds.second_factor) {
            // Never log the submitted factor.
            tracing::debug!("Admin second factor rejected");
            return Err(ServiceError::InvalidCode);
        }

        let password = PasswordCredentials {
            email: creds.email,
            password: creds.password,
        };
        let identity = self.acquirer.authenticate_by_password(&password).await?;
        let resolution = self.resolver.resolve(&identity, Some(Role::Admin)).await;
        self.complete(identity, resolution).await
    }

    /// Attach a role to the pending identity, or re-role the persisted
    /// session when nothing is pending (picking a different card while
    /// already signed in).
    #[tracing::instrument(skip(self))]
    pub async fn select_role(&self, role: Role) -> Result<FlowState, ServiceError> {
        let identity = match self.selection_subject().await {
            Some(identity) => identity,
            None => {
                tracing::warn!(requested = %role, "Role selected with nobody to attach it to");
                return Ok(FlowState::NoSession);
            }
        };

        let assignment = self.resolver.assign_role(&identity, role).await?;
        self.set_pending(None);
        Ok(FlowState::RoleAssigned {
            session: assignment.session,
            persisted: assignment.persisted,
        })
    }

    /// Move an already signed-in user to a different dashboard. Registry
    /// authority still applies for federated identities.
    #[tracing::instrument(skip(self))]
    pub async fn switch_role(&self, role: Role) -> Result<FlowState, ServiceError> {
        match self.store.load().await {
            Some(session) => {
                let assignment = self.resolver.assign_role(&session.identity, role).await?;
                Ok(FlowState::RoleAssigned {
                    session: assignment.session,
                    persisted: assignment.persisted,
                })
            }
            None => {
                tracing::warn!(requested = %role, "Role switch without a session");
                Ok(FlowState::NoSession)
            }
        }
    }

    /// Re-derive the flow state on application load.
    pub async fn restore(&self) -> FlowState {
        match self.store.load().await {
            Some(session) => {
                if session.is_complete() {
                    self.set_pending(None);
                    tracing::info!(role = ?session.role, "Session restored");
                    FlowState::RoleAssigned {
                        session,
                        persisted: true,
                    }
                } else {
                    // Signed in before the reload but never picked a role.
                    let identity = session.identity;
                    self.set_pending(Some(identity.clone()));
                    FlowState::AwaitingRoleSelection { identity }
                }
            }
            None => {
                self.set_pending(None);
                FlowState::NoSession
            }
        }
    }

    /// Sign out and destroy the persisted session.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<FlowState, ServiceError> {
        self.store.clear().await?;
        self.set_pending(None);
        tracing::info!("Signed out");
        Ok(FlowState::NoSession)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store.is_authenticated().await
    }

    async fn complete(
        &self,
        identity: UserIdentity,
        resolution: Resolution,
    ) -> Result<FlowState, ServiceError> {
        match resolution {
            Resolution::Assigned(role) => {
                let assignment = self.resolver.assign_role(&identity, role).await?;
                self.set_pending(None);
                Ok(FlowState::RoleAssigned {
                    session: assignment.session,
                    persisted: assignment.persisted,
                })
            }
            Resolution::SelectionRequired => {
                self.set_pending(Some(identity.clone()));
                // Persist the identity now so a reload lands back on the
                // selection screen instead of forgetting the sign-in.
                if let Err(e) = self.store.save(&identity, None).await {
                    tracing::warn!(error = %e, "Pending session not persisted; selection will not survive a reload");
                }
                Ok(FlowState::AwaitingRoleSelection { identity })
            }
        }
    }

    /// Whose role is being picked: the identity mid-sign-in if there is
    /// one, otherwise the persisted session's.
    async fn selection_subject(&self) -> Option<UserIdentity> {
        if let Some(identity) = self.pending_identity() {
            return Some(identity);
        }
        self.store.load().await.map(|session| session.identity)
    }

    fn pending_identity(&self) -> Option<UserIdentity> {
        self.pending.lock().ok().and_then(|slot| slot.clone())
    }

    fn set_pending(&self, identity: Option<UserIdentity>) {
        // A poisoned slot only costs the user a repeated role prompt.
        if let Ok(mut slot) = self.pending.lock() {
            *slot = identity;
        }
    }
}
