//! Role resolution.
//!
//! Maps an authenticated identity to the role that scopes its dashboard.
//! Precedence when resolving: explicit hint from the page the user signed
//! in on, then the locally persisted role, then (for federated identities)
//! the external registry. When none of those produce a role the user picks
//! one, and that pick is what `assign_role` records.

use std::sync::Arc;

use crate::models::{Role, Session, UserIdentity};
use crate::services::error::ServiceError;
use crate::services::registry::RoleRegistry;
use crate::services::store::SessionStore;

/// Outcome of a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A role was derived without asking the user.
    Assigned(Role),
    /// No hint, no persisted role, no registry role: show the selection
    /// screen.
    SelectionRequired,
}

/// Result of persisting a role assignment.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub session: Session,
    /// False when durable storage rejected the write and only the
    /// in-memory session survives until the next reload.
    pub persisted: bool,
}

#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn SessionStore>,
    registry: Arc<dyn RoleRegistry>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn SessionStore>, registry: Arc<dyn RoleRegistry>) -> Self {
        Self { store, registry }
    }

    /// Derive a role for `identity`, or report that the user has to pick.
    ///
    /// Registry outages degrade to explicit selection instead of blocking
    /// the sign-in.
    pub async fn resolve(&self, identity: &UserIdentity, role_hint: Option<Role>) -> Resolution {
        if let Some(role) = role_hint {
            tracing::debug!(role = %role, "Role taken from sign-in context");
            return Resolution::Assigned(role);
        }

        if let Some(session) = self.store.load().await {
            if let Some(role) = session.role {
                tracing::debug!(role = %role, "Role taken from persisted session");
                return Resolution::Assigned(role);
            }
        }

        if identity.is_federated() {
            match self.registry.get_my_role(&identity.id).await {
                Ok(Some(role)) => {
                    tracing::info!(role = %role, principal = %identity.id, "Role taken from registry");
                    return Resolution::Assigned(role);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Registry unreachable; falling back to role selection");
                }
            }
        }

        Resolution::SelectionRequired
    }

    /// Persist `role` for `identity` and return the resulting session.
    ///
    /// For federated identities the registry is consulted first: a role it
    /// already holds wins over the requested one and is never overwritten.
    /// A brand-new federated user writes the registry exactly once. The
    /// local record always ends up holding the effective role, so later
    /// resolutions agree with the registry without another round-trip.
    pub async fn assign_role(
        &self,
        identity: &UserIdentity,
        role: Role,
    ) -> Result<Assignment, ServiceError> {
        let effective = if identity.is_federated() {
            match self.registry.get_my_role(&identity.id).await? {
                Some(existing) => {
                    if existing != role {
                        tracing::warn!(
                            requested = %role,
                            effective = %existing,
                            principal = %identity.id,
                            "Registry already holds a role; requested one discarded"
                        );
                    }
                    existing
                }
                None => {
                    self.registry.set_my_role(&identity.id, role).await?;
                    tracing::info!(role = %role, principal = %identity.id, "Role recorded in registry");
                    role
                }
            }
        } else {
            role
        };

        match self.store.save(identity, Some(effective)).await {
            Ok(session) => Ok(Assignment {
                session,
                persisted: true,
            }),
            Err(ServiceError::StorageUnavailable(e)) => {
                tracing::warn!(error = %e, "Session not persisted; sign-in continues in memory only");
                Ok(Assignment {
                    session: Session::new(identity.clone(), Some(effective)),
                    persisted: false,
                })
            }
            Err(e) => Err(e),
        }
    }
}
